use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use super::pricing::CommissionTiers;

pub const DEFAULT_ALLOWED_REGIONS: &str = "Hereford or Worcester, UK";

/// The single, global business configuration record.
///
/// Field names and numeric types are the persisted format; they must round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub radius_miles: i64,
    pub allowed_regions: String,
    pub flat_small: i64,
    pub small_max: i64,
    pub medium_max: i64,
    pub percent_medium: f64,
    pub percent_large: f64,
    #[serde(default)]
    pub video_intro_url: Option<String>,
    #[serde(default)]
    pub video_find_url: Option<String>,
    #[serde(default)]
    pub video_price_url: Option<String>,
    #[serde(default)]
    pub video_use_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let tiers = CommissionTiers::default();
        Self {
            radius_miles: 30,
            allowed_regions: DEFAULT_ALLOWED_REGIONS.to_string(),
            flat_small: tiers.flat_small,
            small_max: tiers.small_max,
            medium_max: tiers.medium_max,
            percent_medium: tiers.percent_medium,
            percent_large: tiers.percent_large,
            video_intro_url: None,
            video_find_url: None,
            video_price_url: None,
            video_use_url: None,
        }
    }
}

impl Settings {
    /// Commission tiers as of this settings snapshot.
    pub fn tiers(&self) -> CommissionTiers {
        CommissionTiers {
            flat_small: self.flat_small,
            small_max: self.small_max,
            medium_max: self.medium_max,
            percent_medium: self.percent_medium,
            percent_large: self.percent_large,
        }
    }

    /// Lowercased region names a lead location must mention.
    ///
    /// Names are split on " or ", ";", "/", "|" and newlines. Text after a comma is a
    /// qualifier ("Worcester, UK") and is dropped.
    pub fn region_names(&self) -> Vec<String> {
        let lowered = self.allowed_regions.to_lowercase();
        lowered
            .split(" or ")
            .flat_map(|part| part.split([';', '/', '|', '\n']))
            .filter_map(|name| {
                let name = name.split(',').next().unwrap_or_default().trim();
                (!name.is_empty()).then(|| name.to_string())
            })
            .collect()
    }

    /// True when `location` mentions any allowed region, ignoring case.
    pub fn location_allowed(&self, location: &str) -> bool {
        let location = location.to_lowercase();
        self.region_names()
            .iter()
            .any(|region| location.contains(region.as_str()))
    }

    /// Check a proposed settings record before it replaces the stored one.
    ///
    /// Blank video URLs are normalised to `None`.
    pub fn validated(mut self) -> Result<Self, SettingsViolation> {
        let mut problems = Vec::new();

        if !(1..=100).contains(&self.radius_miles) {
            problems.push(format!(
                "radiusMiles must be between 1 and 100 (found {})",
                self.radius_miles
            ));
        }
        if self.allowed_regions.trim().is_empty() || self.region_names().is_empty() {
            problems.push("allowedRegions must name at least one region".to_string());
        }

        for (field, value) in [
            ("flatSmall", self.flat_small),
            ("smallMax", self.small_max),
            ("mediumMax", self.medium_max),
        ] {
            if value < 0 {
                problems.push(format!("{field} must not be negative (found {value})"));
            }
        }
        if self.small_max > self.medium_max {
            problems.push(format!(
                "smallMax ({}) must not exceed mediumMax ({})",
                self.small_max, self.medium_max
            ));
        }

        for (field, value) in [
            ("percentMedium", self.percent_medium),
            ("percentLarge", self.percent_large),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                problems.push(format!("{field} must be between 0 and 1 (found {value})"));
            }
        }

        for (field, slot) in [
            ("videoIntroUrl", &mut self.video_intro_url),
            ("videoFindUrl", &mut self.video_find_url),
            ("videoPriceUrl", &mut self.video_price_url),
            ("videoUseUrl", &mut self.video_use_url),
        ] {
            if slot.as_deref().is_some_and(|raw| raw.trim().is_empty()) {
                *slot = None;
            } else if let Some(raw) = slot.as_deref() {
                if Url::parse(raw.trim()).is_err() {
                    problems.push(format!("{field} must be a valid URL"));
                }
            }
        }

        if problems.is_empty() {
            Ok(self)
        } else {
            Err(SettingsViolation { problems })
        }
    }
}

/// Partial settings update. Absent fields keep their stored value; a `null` video URL clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub radius_miles: Option<i64>,
    pub allowed_regions: Option<String>,
    pub flat_small: Option<i64>,
    pub small_max: Option<i64>,
    pub medium_max: Option<i64>,
    pub percent_medium: Option<f64>,
    pub percent_large: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub video_intro_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub video_find_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub video_price_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub video_use_url: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SettingsPatch {
    /// Overlay the supplied fields on `current`.
    pub fn apply_to(self, current: Settings) -> Settings {
        Settings {
            radius_miles: self.radius_miles.unwrap_or(current.radius_miles),
            allowed_regions: self.allowed_regions.unwrap_or(current.allowed_regions),
            flat_small: self.flat_small.unwrap_or(current.flat_small),
            small_max: self.small_max.unwrap_or(current.small_max),
            medium_max: self.medium_max.unwrap_or(current.medium_max),
            percent_medium: self.percent_medium.unwrap_or(current.percent_medium),
            percent_large: self.percent_large.unwrap_or(current.percent_large),
            video_intro_url: self.video_intro_url.unwrap_or(current.video_intro_url),
            video_find_url: self.video_find_url.unwrap_or(current.video_find_url),
            video_price_url: self.video_price_url.unwrap_or(current.video_price_url),
            video_use_url: self.video_use_url.unwrap_or(current.video_use_url),
        }
    }
}

/// Rejected settings write, listing every problem found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid settings: {}", .problems.join("; "))]
pub struct SettingsViolation {
    pub problems: Vec<String>,
}
