use chrono::Utc;
use flip_leads::workflows::leads::{
    Lead, LeadFilter, LeadId, LeadRepository, LeadWithVa, RepositoryError, Settings,
    StatusChange, Va,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Store {
    settings: Option<Settings>,
    leads: HashMap<LeadId, Lead>,
    vas: Vec<Va>,
}

impl Store {
    fn with_va(&self, lead: &Lead) -> Result<LeadWithVa, RepositoryError> {
        let va = self
            .vas
            .iter()
            .find(|va| va.id == lead.va_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        Ok(LeadWithVa {
            lead: lead.clone(),
            va,
        })
    }
}

/// Process-local lead store. One mutex guards leads, VAs and settings so status
/// updates compare and write under a single lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryLeadRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead store lock poisoned".to_string()))
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn get_settings(&self) -> Result<Settings, RepositoryError> {
        let mut store = self.lock()?;
        Ok(store.settings.get_or_insert_with(Settings::default).clone())
    }

    fn update_settings(&self, settings: Settings) -> Result<Settings, RepositoryError> {
        let mut store = self.lock()?;
        store.settings = Some(settings.clone());
        Ok(settings)
    }

    fn get_lead_by_id(&self, id: &LeadId) -> Result<Option<LeadWithVa>, RepositoryError> {
        let store = self.lock()?;
        store
            .leads
            .get(id)
            .map(|lead| store.with_va(lead))
            .transpose()
    }

    fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<LeadWithVa>, RepositoryError> {
        let store = self.lock()?;
        let mut records = Vec::new();
        for lead in store.leads.values() {
            let record = store.with_va(lead)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        records.sort_by(|a, b| b.lead.created_at.cmp(&a.lead.created_at));
        Ok(records)
    }

    fn create_lead(&self, lead: Lead) -> Result<LeadWithVa, RepositoryError> {
        let mut store = self.lock()?;
        if store.leads.contains_key(&lead.id) {
            return Err(RepositoryError::Conflict);
        }
        let record = store.with_va(&lead)?;
        store.leads.insert(lead.id.clone(), lead);
        Ok(record)
    }

    fn update_lead_status(
        &self,
        id: &LeadId,
        change: &StatusChange,
    ) -> Result<LeadWithVa, RepositoryError> {
        let mut store = self.lock()?;
        let lead = store.leads.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if lead.status != change.from {
            return Err(RepositoryError::StaleStatus {
                expected: change.from,
                found: lead.status,
            });
        }
        change.apply_to(lead);
        let updated = lead.clone();
        store.with_va(&updated)
    }

    fn get_va_by_name(&self, name: &str) -> Result<Option<Va>, RepositoryError> {
        let store = self.lock()?;
        Ok(store.vas.iter().find(|va| va.name == name).cloned())
    }

    fn create_va(&self, name: &str) -> Result<Va, RepositoryError> {
        let mut store = self.lock()?;
        if store.vas.iter().any(|va| va.name == name) {
            return Err(RepositoryError::Conflict);
        }
        let va = Va::new(name, Utc::now());
        store.vas.push(va.clone());
        Ok(va)
    }

    fn list_vas(&self) -> Result<Vec<Va>, RepositoryError> {
        let store = self.lock()?;
        let mut vas = store.vas.clone();
        vas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vas)
    }
}
