use serde::{Deserialize, Serialize};

/// Tier boundaries and rates used to turn a profit into a VA commission.
///
/// Values are taken from a single settings snapshot. No ordering between `small_max` and
/// `medium_max` is assumed here; settings writes are where that is checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTiers {
    pub flat_small: i64,
    pub small_max: i64,
    pub medium_max: i64,
    pub percent_medium: f64,
    pub percent_large: f64,
}

impl Default for CommissionTiers {
    fn default() -> Self {
        Self {
            flat_small: 40,
            small_max: 400,
            medium_max: 800,
            percent_medium: 0.10,
            percent_large: 0.15,
        }
    }
}

/// Profit band a deal falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionTier {
    Small,
    Medium,
    Large,
}

impl CommissionTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "small (flat fee)",
            Self::Medium => "medium (percentage)",
            Self::Large => "large (percentage)",
        }
    }
}

impl CommissionTiers {
    /// First match wins: `< small_max` is small, `<= medium_max` is medium, anything else large.
    pub fn tier_for(&self, profit: i64) -> CommissionTier {
        if profit < self.small_max {
            CommissionTier::Small
        } else if profit <= self.medium_max {
            CommissionTier::Medium
        } else {
            CommissionTier::Large
        }
    }
}

/// Commission owed for `profit`, rounded once to a whole currency unit (half away from zero).
pub fn estimate_commission(profit: i64, tiers: &CommissionTiers) -> i64 {
    match tiers.tier_for(profit) {
        CommissionTier::Small => tiers.flat_small,
        CommissionTier::Medium => apply_rate(profit, tiers.percent_medium),
        CommissionTier::Large => apply_rate(profit, tiers.percent_large),
    }
}

fn apply_rate(profit: i64, rate: f64) -> i64 {
    (profit as f64 * rate).round() as i64
}
