use crate::workflows::leads::pricing::CommissionTiers;
use crate::workflows::leads::settings::{Settings, SettingsPatch};

#[test]
fn defaults_match_the_documented_record() {
    let settings = Settings::default();
    assert_eq!(settings.radius_miles, 30);
    assert_eq!(settings.allowed_regions, "Hereford or Worcester, UK");
    assert_eq!(settings.tiers(), CommissionTiers::default());
    assert!(settings.video_intro_url.is_none());
}

#[test]
fn settings_round_trip_with_persisted_field_names() {
    let raw = serde_json::json!({
        "radiusMiles": 25,
        "allowedRegions": "Hereford or Worcester, UK",
        "flatSmall": 50,
        "smallMax": 300,
        "mediumMax": 900,
        "percentMedium": 0.12,
        "percentLarge": 0.2,
        "videoIntroUrl": "https://videos.example.com/intro",
        "videoFindUrl": null,
        "videoPriceUrl": null,
        "videoUseUrl": null
    });
    let settings: Settings = serde_json::from_value(raw.clone()).expect("settings parse");
    assert_eq!(settings.flat_small, 50);
    assert_eq!(settings.percent_large, 0.2);
    assert_eq!(serde_json::to_value(&settings).expect("serialize"), raw);
}

#[test]
fn region_names_drop_qualifiers() {
    let settings = Settings {
        allowed_regions: "Hereford or Worcester, UK; Ledbury / Malvern".to_string(),
        ..Settings::default()
    };
    assert_eq!(
        settings.region_names(),
        vec!["hereford", "worcester", "ledbury", "malvern"]
    );
    assert!(settings.location_allowed("Great Malvern"));
    assert!(!settings.location_allowed("London, UK"));
}

#[test]
fn validation_accepts_defaults_and_blanks_video_urls() {
    let settings = Settings {
        video_find_url: Some("  ".to_string()),
        video_use_url: Some("https://videos.example.com/use".to_string()),
        ..Settings::default()
    };
    let validated = settings.validated().expect("defaults are valid");
    assert!(validated.video_find_url.is_none());
    assert_eq!(
        validated.video_use_url.as_deref(),
        Some("https://videos.example.com/use")
    );
}

#[test]
fn validation_rejects_inverted_tiers_and_bad_rates() {
    let settings = Settings {
        small_max: 900,
        medium_max: 800,
        percent_medium: 1.5,
        percent_large: f64::NAN,
        radius_miles: 0,
        video_intro_url: Some("not a url".to_string()),
        ..Settings::default()
    };
    let violation = settings.validated().expect_err("invalid settings");
    assert_eq!(violation.problems.len(), 5);
    assert!(violation
        .problems
        .iter()
        .any(|problem| problem.contains("smallMax (900) must not exceed mediumMax (800)")));
}

#[test]
fn validation_rejects_negative_amounts_and_blank_regions() {
    let settings = Settings {
        flat_small: -1,
        allowed_regions: " ".to_string(),
        ..Settings::default()
    };
    let violation = settings.validated().expect_err("invalid settings");
    assert_eq!(violation.problems.len(), 2);
}

#[test]
fn patch_keeps_absent_fields_and_clears_null_video_urls() {
    let current = Settings {
        video_intro_url: Some("https://videos.example.com/intro".to_string()),
        video_find_url: Some("https://videos.example.com/find".to_string()),
        ..Settings::default()
    };
    let patch: SettingsPatch = serde_json::from_value(serde_json::json!({
        "smallMax": 350,
        "videoFindUrl": null
    }))
    .expect("patch parses");

    let merged = patch.apply_to(current);
    assert_eq!(merged.small_max, 350);
    assert_eq!(merged.medium_max, 800);
    assert_eq!(merged.allowed_regions, "Hereford or Worcester, UK");
    assert_eq!(
        merged.video_intro_url.as_deref(),
        Some("https://videos.example.com/intro")
    );
    assert!(merged.video_find_url.is_none());
}
