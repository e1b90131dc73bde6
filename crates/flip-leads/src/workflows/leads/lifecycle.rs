//! Lead pipeline state machine.
//!
//! ```text
//! PENDING -> APPROVED -> CONTACTED -> BOUGHT -> SOLD -> PAID
//!    |           |            |
//!    +-----------+------------+--> REJECTED
//! ```
//!
//! Only the move into `SOLD` carries figures: it settles the deal using the lead's original
//! asking price and the current commission tiers. Every other move is a relabel.

use serde::Serialize;

use super::domain::{Lead, LeadStatus, SaleSettlement, StatusChangeRequest};
use super::pricing::{CommissionTiers, DealQuote};

const TRANSITIONS: &[(LeadStatus, &[LeadStatus])] = &[
    (
        LeadStatus::Pending,
        &[LeadStatus::Approved, LeadStatus::Rejected],
    ),
    (
        LeadStatus::Approved,
        &[LeadStatus::Contacted, LeadStatus::Rejected],
    ),
    (
        LeadStatus::Contacted,
        &[LeadStatus::Bought, LeadStatus::Rejected],
    ),
    (LeadStatus::Bought, &[LeadStatus::Sold]),
    (LeadStatus::Sold, &[LeadStatus::Paid]),
    (LeadStatus::Rejected, &[]),
    (LeadStatus::Paid, &[]),
];

impl LeadStatus {
    /// Statuses reachable in one step.
    pub fn next_statuses(self) -> &'static [LeadStatus] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, next)| *next)
            .unwrap_or(&[])
    }

    pub fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }

    /// Whether a status update from `self` to `next` is legal.
    ///
    /// `SOLD -> SOLD` is accepted so a sale can be re-settled with corrected figures.
    pub fn can_transition_to(self, next: LeadStatus) -> bool {
        (self == LeadStatus::Sold && next == LeadStatus::Sold)
            || self.next_statuses().contains(&next)
    }
}

/// Rejected status update. Raised before any calculation or write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("actual sale price is required when marking as sold")]
    MissingActualSalePrice,
    #[error("actual sale figures can only be recorded when marking as sold (requested {requested})")]
    UnexpectedSettlement { requested: LeadStatus },
    #[error("cannot move lead from {from} to {to}")]
    NotAllowed { from: LeadStatus, to: LeadStatus },
    #[error("{field} must not be negative")]
    NegativeFigure { field: &'static str },
}

/// A planned, fully-computed status update ready to be applied atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Status the plan was computed against; the write is refused if it no longer matches.
    pub from: LeadStatus,
    pub to: LeadStatus,
    pub settlement: Option<SaleSettlement>,
}

/// Checks on the request alone, before the lead is even loaded.
pub fn precheck(request: &StatusChangeRequest) -> Result<(), TransitionError> {
    if request.status == LeadStatus::Sold {
        let sale_price = request
            .actual_sale_price
            .ok_or(TransitionError::MissingActualSalePrice)?;
        if sale_price < 0 {
            return Err(TransitionError::NegativeFigure {
                field: "actualSalePrice",
            });
        }
        // A zero sale price counts as not supplied.
        if sale_price == 0 {
            return Err(TransitionError::MissingActualSalePrice);
        }
        if request.actual_expenses.is_some_and(|expenses| expenses < 0) {
            return Err(TransitionError::NegativeFigure {
                field: "actualExpenses",
            });
        }
    } else if request.actual_sale_price.is_some() || request.actual_expenses.is_some() {
        return Err(TransitionError::UnexpectedSettlement {
            requested: request.status,
        });
    }

    Ok(())
}

/// Validate `request` against the lead's current status and compute any settlement.
pub fn plan_transition(
    lead: &Lead,
    request: &StatusChangeRequest,
    tiers: &CommissionTiers,
) -> Result<StatusChange, TransitionError> {
    precheck(request)?;

    let from = lead.status;
    let to = request.status;
    if !from.can_transition_to(to) {
        return Err(TransitionError::NotAllowed { from, to });
    }

    let settlement = match (to, request.actual_sale_price) {
        (LeadStatus::Sold, Some(actual_sale_price)) => {
            let actual_expenses = request.actual_expenses.unwrap_or(0);
            let quote = DealQuote::compute(
                actual_sale_price,
                lead.deal.asking_price,
                actual_expenses,
                tiers,
            );
            Some(SaleSettlement {
                actual_sale_price,
                actual_expenses,
                actual_profit: quote.profit,
                actual_commission: quote.commission,
            })
        }
        _ => lead.settlement,
    };

    Ok(StatusChange {
        from,
        to,
        settlement,
    })
}

impl StatusChange {
    /// Apply to a stored lead. Callers must have checked `from` against the stored status.
    pub fn apply_to(&self, lead: &mut Lead) {
        lead.status = self.to;
        lead.settlement = self.settlement;
    }
}
