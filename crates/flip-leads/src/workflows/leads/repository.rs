use super::domain::{Lead, LeadFilter, LeadId, LeadStatus, LeadWithVa, Va};
use super::lifecycle::StatusChange;
use super::settings::Settings;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `update_lead_status` must be atomic per lead: it compares `change.from` with the stored
/// status and writes the status and settlement together, or not at all.
pub trait LeadRepository: Send + Sync {
    /// Current settings snapshot, creating the default record if none exists.
    fn get_settings(&self) -> Result<Settings, RepositoryError>;
    fn update_settings(&self, settings: Settings) -> Result<Settings, RepositoryError>;

    fn get_lead_by_id(&self, id: &LeadId) -> Result<Option<LeadWithVa>, RepositoryError>;
    /// Matching leads, newest first.
    fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<LeadWithVa>, RepositoryError>;
    fn create_lead(&self, lead: Lead) -> Result<LeadWithVa, RepositoryError>;
    fn update_lead_status(
        &self,
        id: &LeadId,
        change: &StatusChange,
    ) -> Result<LeadWithVa, RepositoryError>;

    fn get_va_by_name(&self, name: &str) -> Result<Option<Va>, RepositoryError>;
    fn create_va(&self, name: &str) -> Result<Va, RepositoryError>;
    /// All VAs ordered by name.
    fn list_vas(&self) -> Result<Vec<Va>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("lead status changed concurrently (expected {expected}, found {found})")]
    StaleStatus {
        expected: LeadStatus,
        found: LeadStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
