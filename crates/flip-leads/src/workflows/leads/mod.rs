//! Lead intake, commission math and the sale pipeline.
//!
//! Pricing, condition checks and transition planning are pure functions over explicitly
//! passed settings; the service threads a single settings snapshot through each call and
//! leaves persistence to a [`LeadRepository`] implementation.

pub mod conditions;
pub mod domain;
pub mod intake;
pub mod lifecycle;
pub mod pricing;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod settings;

#[cfg(test)]
mod tests;

pub use conditions::{validate_conditions, ConditionCheck, MajorIssue};
pub use domain::{
    EstimatedDeal, Lead, LeadFilter, LeadId, LeadStatus, LeadSubmission, LeadView, LeadWithVa,
    ListingDetails, SaleSettlement, StatusChangeRequest, Va, VaId, VehicleFacts,
};
pub use intake::{FieldError, IntakeGuard, IntakePolicy, IntakeViolation};
pub use lifecycle::{StatusChange, TransitionError};
pub use pricing::{calculate_profit, estimate_commission, CommissionTiers, DealQuote};
pub use report::LeadKpis;
pub use repository::{LeadRepository, RepositoryError};
pub use router::lead_router;
pub use service::{LeadService, LeadServiceError, SubmissionReceipt, SubmissionView};
pub use settings::{Settings, SettingsPatch, SettingsViolation};
