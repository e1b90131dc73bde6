use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    EstimatedDeal, Lead, LeadFilter, LeadId, LeadStatus, LeadSubmission, LeadWithVa, LeadView,
    StatusChangeRequest, Va,
};
use super::intake::{IntakeGuard, IntakePolicy, IntakeViolation, LeadDraft, VaChoice};
use super::lifecycle::{self, TransitionError};
use super::pricing::DealQuote;
use super::report::LeadKpis;
use super::repository::{LeadRepository, RepositoryError};
use super::settings::{Settings, SettingsPatch, SettingsViolation};

/// Service composing intake validation, pricing, the status machine and the repository.
pub struct LeadService<R> {
    guard: Arc<IntakeGuard>,
    repository: Arc<R>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub record: LeadWithVa,
    pub estimated_profit: i64,
    pub estimated_commission: i64,
}

impl SubmissionReceipt {
    pub fn view(&self) -> SubmissionView {
        SubmissionView {
            lead: self.record.view(),
            estimated_profit: self.estimated_profit,
            estimated_commission: self.estimated_commission,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub lead: LeadView,
    pub estimated_profit: i64,
    pub estimated_commission: i64,
}

impl<R> LeadService<R>
where
    R: LeadRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: IntakePolicy) -> Self {
        Self::with_guard(IntakeGuard::with_policy(policy), repository)
    }

    pub(crate) fn with_guard(guard: IntakeGuard, repository: Arc<R>) -> Self {
        Self {
            guard: Arc::new(guard),
            repository,
        }
    }

    /// Validate a submission, price it against the current settings and store it as PENDING.
    pub fn submit(
        &self,
        submission: LeadSubmission,
    ) -> Result<SubmissionReceipt, LeadServiceError> {
        let settings = self.repository.get_settings()?;

        let draft = self
            .guard
            .draft_from_submission(&submission, &settings)
            .inspect_err(|violation| warn!(%violation, "lead submission rejected"))?;

        let va = self.resolve_va(&draft.va)?;
        let quote = DealQuote::compute(
            draft.estimated_sale_price,
            draft.asking_price,
            draft.estimated_expenses,
            &settings.tiers(),
        );

        let lead = build_lead(draft, &va, quote, Utc::now());
        let record = self.repository.create_lead(lead)?;

        info!(
            lead_id = %record.lead.id,
            va = %record.va.name,
            estimated_profit = quote.profit,
            estimated_commission = quote.commission,
            "lead submitted"
        );

        Ok(SubmissionReceipt {
            record,
            estimated_profit: quote.profit,
            estimated_commission: quote.commission,
        })
    }

    fn resolve_va(&self, choice: &VaChoice) -> Result<Va, LeadServiceError> {
        match choice {
            VaChoice::Existing(name) => self
                .repository
                .get_va_by_name(name)?
                .ok_or_else(|| LeadServiceError::VaNotFound(name.clone())),
            VaChoice::New(name) => match self.repository.get_va_by_name(name)? {
                Some(existing) => Ok(existing),
                None => match self.repository.create_va(name) {
                    Ok(va) => {
                        info!(va = %va.name, "registered VA from submission");
                        Ok(va)
                    }
                    // Registered concurrently since the lookup; use that record.
                    Err(RepositoryError::Conflict) => self
                        .repository
                        .get_va_by_name(name)?
                        .ok_or(LeadServiceError::Repository(RepositoryError::Conflict)),
                    Err(error) => Err(error.into()),
                },
            },
        }
    }

    /// Move a lead along the pipeline, settling the sale when the target is SOLD.
    pub fn update_status(
        &self,
        lead_id: &LeadId,
        request: StatusChangeRequest,
    ) -> Result<LeadWithVa, LeadServiceError> {
        lifecycle::precheck(&request)
            .inspect_err(|error| warn!(%lead_id, %error, "status update rejected"))?;

        let current = self
            .repository
            .get_lead_by_id(lead_id)?
            .ok_or_else(|| LeadServiceError::LeadNotFound(lead_id.clone()))?;

        let settings = self.repository.get_settings()?;
        let change = lifecycle::plan_transition(&current.lead, &request, &settings.tiers())
            .inspect_err(|error| warn!(%lead_id, %error, "status update rejected"))?;

        let updated = self.repository.update_lead_status(lead_id, &change)?;

        match change.settlement.filter(|_| change.to == LeadStatus::Sold) {
            Some(settlement) => info!(
                %lead_id,
                from = %change.from,
                to = %change.to,
                actual_profit = settlement.actual_profit,
                actual_commission = settlement.actual_commission,
                "lead settled"
            ),
            None => info!(%lead_id, from = %change.from, to = %change.to, "lead status updated"),
        }

        Ok(updated)
    }

    /// Fetch a lead with its VA for API responses.
    pub fn get(&self, lead_id: &LeadId) -> Result<LeadWithVa, LeadServiceError> {
        self.repository
            .get_lead_by_id(lead_id)?
            .ok_or_else(|| LeadServiceError::LeadNotFound(lead_id.clone()))
    }

    pub fn list(&self, filter: &LeadFilter) -> Result<Vec<LeadWithVa>, LeadServiceError> {
        Ok(self.repository.list_leads(filter)?)
    }

    pub fn vas(&self) -> Result<Vec<Va>, LeadServiceError> {
        Ok(self.repository.list_vas()?)
    }

    /// Register a VA by name. Duplicate names surface as a repository conflict.
    pub fn register_va(&self, name: &str) -> Result<Va, LeadServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeadServiceError::MissingVaName);
        }
        if self.repository.get_va_by_name(name)?.is_some() {
            return Err(RepositoryError::Conflict.into());
        }

        let va = self.repository.create_va(name)?;
        info!(va = %va.name, "registered VA");
        Ok(va)
    }

    pub fn settings(&self) -> Result<Settings, LeadServiceError> {
        Ok(self.repository.get_settings()?)
    }

    /// Replace the settings record after write-time validation.
    pub fn update_settings(&self, proposed: Settings) -> Result<Settings, LeadServiceError> {
        let validated = proposed
            .validated()
            .inspect_err(|violation| warn!(%violation, "settings update rejected"))?;
        let stored = self.repository.update_settings(validated)?;
        info!(
            small_max = stored.small_max,
            medium_max = stored.medium_max,
            "settings updated"
        );
        Ok(stored)
    }

    /// Merge a partial update into the stored settings, then validate and store the result.
    pub fn patch_settings(&self, patch: SettingsPatch) -> Result<Settings, LeadServiceError> {
        let current = self.repository.get_settings()?;
        self.update_settings(patch.apply_to(current))
    }

    pub fn kpis(&self, now: DateTime<Utc>) -> Result<LeadKpis, LeadServiceError> {
        let records = self.repository.list_leads(&LeadFilter::default())?;
        Ok(LeadKpis::from_leads(
            records.iter().map(|record| &record.lead),
            now,
        ))
    }
}

fn build_lead(draft: LeadDraft, va: &Va, quote: DealQuote, created_at: DateTime<Utc>) -> Lead {
    Lead {
        id: LeadId::generate(),
        created_at,
        va_id: va.id.clone(),
        vehicle: draft.vehicle,
        deal: EstimatedDeal {
            asking_price: draft.asking_price,
            estimated_sale_price: draft.estimated_sale_price,
            estimated_expenses: draft.estimated_expenses,
            estimated_profit: quote.profit,
            estimated_commission: quote.commission,
        },
        listing: draft.listing,
        status: LeadStatus::Pending,
        settlement: None,
    }
}

/// Error raised by the lead service.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Settings(#[from] SettingsViolation),
    #[error("selected VA not found: {0}")]
    VaNotFound(String),
    #[error("VA name is required")]
    MissingVaName,
    #[error("lead not found: {0}")]
    LeadNotFound(LeadId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
