use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Lead, LeadStatus};

/// Dashboard counters across every lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadKpis {
    pub new_this_week: usize,
    pub approved: usize,
    pub bought: usize,
    pub sold: usize,
    pub avg_estimated_profit: i64,
    pub avg_actual_profit: i64,
}

impl LeadKpis {
    pub fn from_leads<'a, I>(leads: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Lead>,
    {
        let week_ago = now - Duration::days(7);
        let mut kpis = LeadKpis::default();
        let mut total = 0usize;
        let mut estimated_sum = 0i64;
        let mut settled = 0usize;
        let mut actual_sum = 0i64;

        for lead in leads {
            total += 1;
            estimated_sum = estimated_sum.saturating_add(lead.deal.estimated_profit);

            if lead.created_at >= week_ago {
                kpis.new_this_week += 1;
            }
            if reached(lead.status, LeadStatus::Approved) {
                kpis.approved += 1;
            }
            if reached(lead.status, LeadStatus::Bought) {
                kpis.bought += 1;
            }
            if reached(lead.status, LeadStatus::Sold) {
                kpis.sold += 1;
            }
            if let Some(settlement) = lead.settlement {
                settled += 1;
                actual_sum = actual_sum.saturating_add(settlement.actual_profit);
            }
        }

        kpis.avg_estimated_profit = rounded_mean(estimated_sum, total);
        kpis.avg_actual_profit = rounded_mean(actual_sum, settled);
        kpis
    }
}

/// Position along the happy path; `REJECTED` is off the path.
fn stage(status: LeadStatus) -> Option<u8> {
    match status {
        LeadStatus::Pending => Some(0),
        LeadStatus::Approved => Some(1),
        LeadStatus::Contacted => Some(2),
        LeadStatus::Bought => Some(3),
        LeadStatus::Sold => Some(4),
        LeadStatus::Paid => Some(5),
        LeadStatus::Rejected => None,
    }
}

fn reached(status: LeadStatus, milestone: LeadStatus) -> bool {
    match (stage(status), stage(milestone)) {
        (Some(current), Some(target)) => current >= target,
        _ => false,
    }
}

fn rounded_mean(sum: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i64
}
