use std::fmt;

use serde::Serialize;
use url::Url;

use super::conditions::{validate_optional_conditions, MajorIssue};
use super::domain::{ListingDetails, LeadSubmission, VehicleFacts, NEW_VA_SENTINEL};
use super::settings::Settings;

/// Validation errors raised while turning a submission into a lead draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("validation failed: {}", join_fields(.0))]
    InvalidFields(Vec<FieldError>),
    #[error("lead rejected due to major issues: {}", .errors.join(" "))]
    MajorIssues {
        issues: Vec<MajorIssue>,
        errors: Vec<String>,
    },
}

impl IntakeViolation {
    /// Messages suitable for an API `errors` array.
    pub fn messages(&self) -> Vec<String> {
        match self {
            IntakeViolation::InvalidFields(fields) => {
                fields.iter().map(ToString::to_string).collect()
            }
            IntakeViolation::MajorIssues { errors, .. } => errors.clone(),
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single rejected submission field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Numeric limits applied to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakePolicy {
    pub min_year: i64,
    pub max_asking_price: i64,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            min_year: 2010,
            max_asking_price: 3000,
        }
    }
}

/// How the submitting VA is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaChoice {
    /// A VA picked from the existing list; must already exist.
    Existing(String),
    /// A VA typed in by name; reused if present, created otherwise.
    New(String),
}

/// Submission that passed condition and field checks but has no derived figures yet.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadDraft {
    pub va: VaChoice,
    pub vehicle: VehicleFacts,
    pub asking_price: i64,
    pub estimated_sale_price: i64,
    pub estimated_expenses: i64,
    pub listing: ListingDetails,
}

/// Guard responsible for producing `LeadDraft` instances.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    policy: IntakePolicy,
}

impl IntakeGuard {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Gate a submission on its condition flags, then validate every field.
    ///
    /// Condition problems are reported alone; field problems are collected and reported together.
    pub fn draft_from_submission(
        &self,
        submission: &LeadSubmission,
        settings: &Settings,
    ) -> Result<LeadDraft, IntakeViolation> {
        let check = validate_optional_conditions(submission.conditions.as_deref());
        if !check.valid {
            return Err(IntakeViolation::MajorIssues {
                issues: check.major_issues,
                errors: check.errors,
            });
        }

        let mut errors = Vec::new();

        for (field, value) in [
            ("make", &submission.make),
            ("model", &submission.model),
            ("sellerName", &submission.seller_name),
            ("conditionNotes", &submission.condition_notes),
            ("goodDealReason", &submission.good_deal_reason),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, "is required"));
            }
        }

        if submission.year < self.policy.min_year {
            errors.push(FieldError::new(
                "year",
                format!("must be {} or newer", self.policy.min_year),
            ));
        }
        if submission.mileage < 0 {
            errors.push(FieldError::new("mileage", "must not be negative"));
        }
        if submission.asking_price < 1 {
            errors.push(FieldError::new("askingPrice", "is required"));
        } else if submission.asking_price > self.policy.max_asking_price {
            errors.push(FieldError::new(
                "askingPrice",
                format!("must be {} or less", self.policy.max_asking_price),
            ));
        }
        if submission.estimated_sale_price < 1 {
            errors.push(FieldError::new("estimatedSalePrice", "must be at least 1"));
        }
        let estimated_expenses = submission.estimated_expenses.unwrap_or(0);
        if estimated_expenses < 0 {
            errors.push(FieldError::new("estimatedExpenses", "must not be negative"));
        }

        if submission.location.trim().is_empty() {
            errors.push(FieldError::new("location", "is required"));
        } else if !settings.location_allowed(&submission.location) {
            errors.push(FieldError::new(
                "location",
                format!("must include {}", settings.allowed_regions),
            ));
        }

        if !is_listing_url(&submission.listing_url) {
            errors.push(FieldError::new("listingUrl", "must be a valid URL"));
        }

        let va = match va_choice(submission) {
            Some(choice) => Some(choice),
            None => {
                errors.push(FieldError::new("vaName", "VA name is required"));
                None
            }
        };

        match va {
            Some(va) if errors.is_empty() => Ok(LeadDraft {
                va,
                vehicle: VehicleFacts {
                    make: submission.make.trim().to_string(),
                    model: submission.model.trim().to_string(),
                    year: submission.year,
                    mileage: submission.mileage,
                },
                asking_price: submission.asking_price,
                estimated_sale_price: submission.estimated_sale_price,
                estimated_expenses,
                listing: ListingDetails {
                    seller_name: submission.seller_name.trim().to_string(),
                    location: submission.location.trim().to_string(),
                    listing_url: submission.listing_url.trim().to_string(),
                    condition_notes: submission.condition_notes.clone(),
                    good_deal_reason: submission.good_deal_reason.clone(),
                    conditions: submission.conditions.clone().unwrap_or_default(),
                },
            }),
            _ => Err(IntakeViolation::InvalidFields(errors)),
        }
    }
}

fn va_choice(submission: &LeadSubmission) -> Option<VaChoice> {
    if let Some(name) = submission.va_name.as_deref() {
        if !name.trim().is_empty() && name != NEW_VA_SENTINEL {
            return Some(VaChoice::Existing(name.to_string()));
        }
    }

    submission
        .new_va_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| VaChoice::New(name.to_string()))
}

fn is_listing_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|url| url.has_host())
        .unwrap_or(false)
}
