use serde::{Deserialize, Serialize};

/// Condition flags severe enough to disqualify a vehicle outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorIssue {
    EngineKnock,
    GearboxFailure,
    SevereRust,
    AccidentDamage,
}

impl MajorIssue {
    pub const fn all() -> [Self; 4] {
        [
            Self::EngineKnock,
            Self::GearboxFailure,
            Self::SevereRust,
            Self::AccidentDamage,
        ]
    }

    pub const fn token(self) -> &'static str {
        match self {
            Self::EngineKnock => "engine_knock",
            Self::GearboxFailure => "gearbox_failure",
            Self::SevereRust => "severe_rust",
            Self::AccidentDamage => "accident_damage",
        }
    }

    /// Exact, case-sensitive token match. Unknown tokens are tolerated flags.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::all().into_iter().find(|issue| issue.token() == token)
    }
}

/// Outcome of checking a submission's condition flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionCheck {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub major_issues: Vec<MajorIssue>,
}

impl ConditionCheck {
    fn passed() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            major_issues: Vec::new(),
        }
    }
}

/// Reject flag lists containing major issues, naming them in input order.
pub fn validate_conditions<S: AsRef<str>>(conditions: &[S]) -> ConditionCheck {
    let found: Vec<MajorIssue> = conditions
        .iter()
        .filter_map(|condition| MajorIssue::from_token(condition.as_ref()))
        .collect();

    if found.is_empty() {
        return ConditionCheck::passed();
    }

    let listed = found
        .iter()
        .map(|issue| issue.token())
        .collect::<Vec<_>>()
        .join(", ");

    ConditionCheck {
        valid: false,
        errors: vec![format!(
            "Major issues detected: {listed}. These cannot be accepted."
        )],
        major_issues: found,
    }
}

/// Convenience for optional flag lists; an absent list is always valid.
pub fn validate_optional_conditions(conditions: Option<&[String]>) -> ConditionCheck {
    validate_conditions(conditions.unwrap_or_default())
}
