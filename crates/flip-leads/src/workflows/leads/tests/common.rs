use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::leads::domain::{
    EstimatedDeal, Lead, LeadFilter, LeadId, LeadStatus, LeadSubmission, LeadWithVa,
    ListingDetails, Va, VehicleFacts,
};
use crate::workflows::leads::intake::{IntakeGuard, IntakePolicy};
use crate::workflows::leads::lifecycle::StatusChange;
use crate::workflows::leads::pricing::{CommissionTiers, DealQuote};
use crate::workflows::leads::repository::{LeadRepository, RepositoryError};
use crate::workflows::leads::settings::Settings;
use crate::workflows::leads::{lead_router, LeadService};

pub(super) fn tiers() -> CommissionTiers {
    CommissionTiers {
        flat_small: 40,
        small_max: 400,
        medium_max: 800,
        percent_medium: 0.10,
        percent_large: 0.15,
    }
}

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn submission() -> LeadSubmission {
    LeadSubmission {
        va_name: Some("_new".to_string()),
        new_va_name: Some("Maria".to_string()),
        make: "Ford".to_string(),
        model: "Fiesta".to_string(),
        year: 2014,
        mileage: 92_000,
        asking_price: 1500,
        estimated_sale_price: 2200,
        estimated_expenses: Some(100),
        seller_name: "J. Price".to_string(),
        location: "Leominster, near Hereford".to_string(),
        listing_url: "https://www.facebook.com/marketplace/item/123456".to_string(),
        condition_notes: "Two owners, full service history, MOT until March".to_string(),
        good_deal_reason: "Priced well under comparable Fiestas locally".to_string(),
        conditions: Some(vec!["dead_battery".to_string(), "small_dents".to_string()]),
        honeypot: None,
    }
}

pub(super) fn va(name: &str) -> Va {
    Va::new(name, fixed_now())
}

/// A stored lead in `status`, priced from `asking_price` with the default tiers.
pub(super) fn lead_in(status: LeadStatus, asking_price: i64, owner: &Va) -> Lead {
    let quote = DealQuote::compute(2200, asking_price, 100, &tiers());
    Lead {
        id: LeadId::generate(),
        created_at: fixed_now(),
        va_id: owner.id.clone(),
        vehicle: VehicleFacts {
            make: "Vauxhall".to_string(),
            model: "Corsa".to_string(),
            year: 2013,
            mileage: 81_000,
        },
        deal: EstimatedDeal {
            asking_price,
            estimated_sale_price: 2200,
            estimated_expenses: 100,
            estimated_profit: quote.profit,
            estimated_commission: quote.commission,
        },
        listing: ListingDetails {
            seller_name: "A. Seller".to_string(),
            location: "Worcester".to_string(),
            listing_url: "https://example.com/listing/1".to_string(),
            condition_notes: "Tidy".to_string(),
            good_deal_reason: "Cheap".to_string(),
            conditions: Vec::new(),
        },
        status,
        settlement: None,
    }
}

#[derive(Default)]
struct MemoryState {
    settings: Option<Settings>,
    leads: HashMap<LeadId, Lead>,
    vas: Vec<Va>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub(super) fn with_settings(settings: Settings) -> Self {
        let repository = Self::default();
        repository
            .state
            .lock()
            .expect("repository mutex poisoned")
            .settings = Some(settings);
        repository
    }

    /// Store a VA and lead directly, bypassing intake.
    pub(super) fn seed(&self, va: Va, lead: Lead) {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if !state.vas.iter().any(|existing| existing.id == va.id) {
            state.vas.push(va);
        }
        state.leads.insert(lead.id.clone(), lead);
    }

    pub(super) fn lead_count(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .leads
            .len()
    }

    pub(super) fn va_count(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .vas
            .len()
    }
}

fn join(state: &MemoryState, lead: &Lead) -> Result<LeadWithVa, RepositoryError> {
    let va = state
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

impl LeadRepository for MemoryRepository {
    fn get_settings(&self) -> Result<Settings, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.settings.get_or_insert_with(Settings::default).clone())
    }

    fn update_settings(&self, settings: Settings) -> Result<Settings, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state.settings = Some(settings.clone());
        Ok(settings)
    }

    fn get_lead_by_id(&self, id: &LeadId) -> Result<Option<LeadWithVa>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        state
            .leads
            .get(id)
            .map(|lead| join(&state, lead))
            .transpose()
    }

    fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<LeadWithVa>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        let mut records = state
            .leads
            .values()
            .map(|lead| join(&state, lead))
            .collect::<Result<Vec<_>, _>>()?;
        records.retain(|record| filter.matches(record));
        records.sort_by(|a, b| b.lead.created_at.cmp(&a.lead.created_at));
        Ok(records)
    }

    fn create_lead(&self, lead: Lead) -> Result<LeadWithVa, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if state.leads.contains_key(&lead.id) {
            return Err(RepositoryError::Conflict);
        }
        let record = join(&state, &lead)?;
        state.leads.insert(lead.id.clone(), lead);
        Ok(record)
    }

    fn update_lead_status(
        &self,
        id: &LeadId,
        change: &StatusChange,
    ) -> Result<LeadWithVa, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let lead = state.leads.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if lead.status != change.from {
            return Err(RepositoryError::StaleStatus {
                expected: change.from,
                found: lead.status,
            });
        }
        change.apply_to(lead);
        let lead = lead.clone();
        join(&state, &lead)
    }

    fn get_va_by_name(&self, name: &str) -> Result<Option<Va>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.vas.iter().find(|va| va.name == name).cloned())
    }

    fn create_va(&self, name: &str) -> Result<Va, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        if state.vas.iter().any(|va| va.name == name) {
            return Err(RepositoryError::Conflict);
        }
        let va = Va::new(name, Utc::now());
        state.vas.push(va.clone());
        Ok(va)
    }

    fn list_vas(&self) -> Result<Vec<Va>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        let mut vas = state.vas.clone();
        vas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vas)
    }
}

pub(super) struct UnavailableRepository;

impl LeadRepository for UnavailableRepository {
    fn get_settings(&self) -> Result<Settings, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_settings(&self, _settings: Settings) -> Result<Settings, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn get_lead_by_id(&self, _id: &LeadId) -> Result<Option<LeadWithVa>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_leads(&self, _filter: &LeadFilter) -> Result<Vec<LeadWithVa>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn create_lead(&self, _lead: Lead) -> Result<LeadWithVa, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_lead_status(
        &self,
        _id: &LeadId,
        _change: &StatusChange,
    ) -> Result<LeadWithVa, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn get_va_by_name(&self, _name: &str) -> Result<Option<Va>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn create_va(&self, _name: &str) -> Result<Va, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_vas(&self) -> Result<Vec<Va>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (LeadService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LeadService::with_guard(
        IntakeGuard::with_policy(IntakePolicy::default()),
        repository.clone(),
    );
    (service, repository)
}

pub(super) fn lead_router_with_service(service: LeadService<MemoryRepository>) -> axum::Router {
    lead_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
