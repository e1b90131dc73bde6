mod commission;
mod profit;

pub use commission::{estimate_commission, CommissionTier, CommissionTiers};
pub use profit::calculate_profit;

use serde::{Deserialize, Serialize};

/// Profit and commission derived together from one set of deal figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealQuote {
    pub profit: i64,
    pub commission: i64,
}

impl DealQuote {
    pub fn compute(
        sale_price: i64,
        asking_price: i64,
        expenses: i64,
        tiers: &CommissionTiers,
    ) -> Self {
        let profit = calculate_profit(sale_price, asking_price, expenses);
        Self {
            profit,
            commission: estimate_commission(profit, tiers),
        }
    }
}
