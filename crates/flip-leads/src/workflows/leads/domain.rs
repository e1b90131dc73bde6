use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for submitted leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for virtual assistants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaId(pub String);

impl VaId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// A named submitter. Names are unique and matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Va {
    pub id: VaId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Va {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: VaId::generate(),
            name: name.into(),
            created_at,
        }
    }
}

/// Pipeline position of a lead, from submission to commission payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    Pending,
    Approved,
    Rejected,
    Contacted,
    Bought,
    Sold,
    Paid,
}

impl LeadStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Pending,
            Self::Approved,
            Self::Rejected,
            Self::Contacted,
            Self::Bought,
            Self::Sold,
            Self::Paid,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Contacted => "CONTACTED",
            Self::Bought => "BOUGHT",
            Self::Sold => "SOLD",
            Self::Paid => "PAID",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Make, model and condition facts about the vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFacts {
    pub make: String,
    pub model: String,
    pub year: i64,
    pub mileage: i64,
}

/// Estimated figures captured at submission. Profit and commission are always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedDeal {
    pub asking_price: i64,
    pub estimated_sale_price: i64,
    pub estimated_expenses: i64,
    pub estimated_profit: i64,
    pub estimated_commission: i64,
}

/// Actual figures recorded by the transition into SOLD. The four values only exist together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSettlement {
    pub actual_sale_price: i64,
    pub actual_expenses: i64,
    pub actual_profit: i64,
    pub actual_commission: i64,
}

/// Free-text notes supplied by the VA alongside the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    pub seller_name: String,
    pub location: String,
    pub listing_url: String,
    pub condition_notes: String,
    pub good_deal_reason: String,
    pub conditions: Vec<String>,
}

/// A submitted vehicle opportunity.
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub id: LeadId,
    pub created_at: DateTime<Utc>,
    pub va_id: VaId,
    pub vehicle: VehicleFacts,
    pub deal: EstimatedDeal,
    pub listing: ListingDetails,
    pub status: LeadStatus,
    pub settlement: Option<SaleSettlement>,
}

/// Lead joined with its owning VA, as returned by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadWithVa {
    pub lead: Lead,
    pub va: Va,
}

impl LeadWithVa {
    pub fn view(&self) -> LeadView {
        let lead = &self.lead;
        let settlement = lead.settlement;
        LeadView {
            id: lead.id.clone(),
            created_at: lead.created_at,
            va_id: lead.va_id.clone(),
            make: lead.vehicle.make.clone(),
            model: lead.vehicle.model.clone(),
            year: lead.vehicle.year,
            mileage: lead.vehicle.mileage,
            asking_price: lead.deal.asking_price,
            estimated_sale_price: lead.deal.estimated_sale_price,
            estimated_expenses: lead.deal.estimated_expenses,
            estimated_profit: lead.deal.estimated_profit,
            estimated_commission: lead.deal.estimated_commission,
            seller_name: lead.listing.seller_name.clone(),
            location: lead.listing.location.clone(),
            listing_url: lead.listing.listing_url.clone(),
            condition_notes: lead.listing.condition_notes.clone(),
            good_deal_reason: lead.listing.good_deal_reason.clone(),
            conditions: lead.listing.conditions.clone(),
            status: lead.status,
            actual_sale_price: settlement.map(|s| s.actual_sale_price),
            actual_expenses: settlement.map(|s| s.actual_expenses),
            actual_profit: settlement.map(|s| s.actual_profit),
            actual_commission: settlement.map(|s| s.actual_commission),
            va: self.va.clone(),
        }
    }
}

/// Flat wire representation of a lead with its VA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub id: LeadId,
    pub created_at: DateTime<Utc>,
    pub va_id: VaId,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub mileage: i64,
    pub asking_price: i64,
    pub estimated_sale_price: i64,
    pub estimated_expenses: i64,
    pub estimated_profit: i64,
    pub estimated_commission: i64,
    pub seller_name: String,
    pub location: String,
    pub listing_url: String,
    pub condition_notes: String,
    pub good_deal_reason: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub status: LeadStatus,
    pub actual_sale_price: Option<i64>,
    pub actual_expenses: Option<i64>,
    pub actual_profit: Option<i64>,
    pub actual_commission: Option<i64>,
    pub va: Va,
}

/// Sentinel `vaName` value meaning "use `newVaName`".
pub const NEW_VA_SENTINEL: &str = "_new";

/// Inbound lead submission as posted by the public form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[serde(default)]
    pub va_name: Option<String>,
    #[serde(default)]
    pub new_va_name: Option<String>,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    pub year: i64,
    pub mileage: i64,
    pub asking_price: i64,
    pub estimated_sale_price: i64,
    #[serde(default)]
    pub estimated_expenses: Option<i64>,
    #[serde(default)]
    pub seller_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub listing_url: String,
    #[serde(default)]
    pub condition_notes: String,
    #[serde(default)]
    pub good_deal_reason: String,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default)]
    pub honeypot: Option<String>,
}

impl LeadSubmission {
    /// The form's hidden field is only ever filled in by bots.
    pub fn is_spam(&self) -> bool {
        self.honeypot
            .as_deref()
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Admin request to move a lead along the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub status: LeadStatus,
    #[serde(default)]
    pub actual_sale_price: Option<i64>,
    #[serde(default)]
    pub actual_expenses: Option<i64>,
}

impl StatusChangeRequest {
    pub fn to(status: LeadStatus) -> Self {
        Self {
            status,
            actual_sale_price: None,
            actual_expenses: None,
        }
    }

    pub fn sold(actual_sale_price: i64, actual_expenses: Option<i64>) -> Self {
        Self {
            status: LeadStatus::Sold,
            actual_sale_price: Some(actual_sale_price),
            actual_expenses,
        }
    }
}

/// Listing filters. Every field narrows the result; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub va_name: Option<String>,
    pub search: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl LeadFilter {
    pub fn matches(&self, record: &LeadWithVa) -> bool {
        let lead = &record.lead;

        if let Some(status) = self.status {
            if lead.status != status {
                return false;
            }
        }

        if let Some(va_name) = self.va_name.as_deref() {
            if !record.va.name.contains(va_name) {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            let haystacks = [
                &lead.vehicle.make,
                &lead.vehicle.model,
                &lead.listing.seller_name,
                &lead.listing.location,
            ];
            if !haystacks
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if self.start.is_some_and(|start| lead.created_at < start) {
            return false;
        }

        if self.end.is_some_and(|end| lead.created_at > end) {
            return false;
        }

        true
    }
}
