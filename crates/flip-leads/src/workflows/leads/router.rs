use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{LeadFilter, LeadId, LeadStatus, LeadSubmission, LeadView, StatusChangeRequest};
use super::intake::IntakeViolation;
use super::lifecycle::TransitionError;
use super::repository::{LeadRepository, RepositoryError};
use super::service::{LeadService, LeadServiceError};
use super::settings::SettingsPatch;

/// Router builder exposing the lead intake, pipeline and settings endpoints.
pub fn lead_router<R>(service: Arc<LeadService<R>>) -> Router
where
    R: LeadRepository + 'static,
{
    Router::new()
        .route(
            "/api/leads",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/leads/:lead_id", get(lead_handler::<R>))
        .route("/api/leads/:lead_id/status", patch(status_handler::<R>))
        .route("/api/vas", get(list_vas_handler::<R>).post(create_va_handler::<R>))
        .route(
            "/api/settings",
            get(settings_handler::<R>).patch(update_settings_handler::<R>),
        )
        .route("/api/kpis", get(kpis_handler::<R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    Json(submission): Json<LeadSubmission>,
) -> Response
where
    R: LeadRepository + 'static,
{
    if submission.is_spam() {
        return error_body(StatusCode::BAD_REQUEST, "Spam detected", Vec::new());
    }

    match service.submit(submission) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt.view())).into_response(),
        Err(error) => error_response(error),
    }
}

/// Query string accepted by the lead listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeadQuery {
    pub(crate) status: Option<String>,
    pub(crate) va_name: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
}

impl LeadQuery {
    fn into_filter(self) -> Result<LeadFilter, String> {
        let status = match non_blank(self.status) {
            Some(raw) => {
                Some(LeadStatus::parse(&raw).ok_or_else(|| format!("unknown status '{raw}'"))?)
            }
            None => None,
        };
        let start = non_blank(self.start_date)
            .map(|raw| parse_bound(&raw, NaiveTime::MIN))
            .transpose()?;
        let end = non_blank(self.end_date)
            .map(|raw| parse_bound(&raw, end_of_day()))
            .transpose()?;

        Ok(LeadFilter {
            status,
            va_name: non_blank(self.va_name),
            search: non_blank(self.search),
            start,
            end,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (pinned to `time_of_day`, UTC).
fn parse_bound(raw: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc())
        .map_err(|err| format!("failed to parse '{raw}' as a date ({err})"))
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    Query(query): Query<LeadQuery>,
) -> Response
where
    R: LeadRepository + 'static,
{
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(message) => return error_body(StatusCode::BAD_REQUEST, &message, Vec::new()),
    };

    match service.list(&filter) {
        Ok(records) => {
            let views: Vec<LeadView> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn lead_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.get(&LeadId(lead_id)) {
        Ok(record) => (StatusCode::OK, Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    Path(lead_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.update_status(&LeadId(lead_id), request) {
        Ok(record) => (StatusCode::OK, Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_vas_handler<R>(State(service): State<Arc<LeadService<R>>>) -> Response
where
    R: LeadRepository + 'static,
{
    match service.vas() {
        Ok(vas) => (StatusCode::OK, Json(vas)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewVaRequest {
    #[serde(default)]
    pub(crate) name: String,
}

pub(crate) async fn create_va_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    Json(request): Json<NewVaRequest>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.register_va(&request.name) {
        Ok(va) => (StatusCode::CREATED, Json(va)).into_response(),
        Err(LeadServiceError::Repository(RepositoryError::Conflict)) => error_body(
            StatusCode::CONFLICT,
            "VA with this name already exists",
            Vec::new(),
        ),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn settings_handler<R>(State(service): State<Arc<LeadService<R>>>) -> Response
where
    R: LeadRepository + 'static,
{
    match service.settings() {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_settings_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    Json(changes): Json<SettingsPatch>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.patch_settings(changes) {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn kpis_handler<R>(State(service): State<Arc<LeadService<R>>>) -> Response
where
    R: LeadRepository + 'static,
{
    match service.kpis(Utc::now()) {
        Ok(kpis) => (StatusCode::OK, Json(kpis)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Map service failures onto HTTP status codes.
pub(crate) fn error_response(error: LeadServiceError) -> Response {
    match error {
        LeadServiceError::Intake(violation @ IntakeViolation::InvalidFields(_)) => error_body(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            violation.messages(),
        ),
        LeadServiceError::Intake(violation @ IntakeViolation::MajorIssues { .. }) => error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Lead rejected due to major issues",
            violation.messages(),
        ),
        LeadServiceError::Transition(error @ TransitionError::NotAllowed { .. }) => {
            error_body(StatusCode::CONFLICT, &error.to_string(), Vec::new())
        }
        LeadServiceError::Transition(error) => {
            error_body(StatusCode::BAD_REQUEST, &error.to_string(), Vec::new())
        }
        LeadServiceError::Settings(violation) => error_body(
            StatusCode::BAD_REQUEST,
            "Invalid settings",
            violation.problems,
        ),
        LeadServiceError::MissingVaName => {
            error_body(StatusCode::BAD_REQUEST, "VA name is required", Vec::new())
        }
        error @ (LeadServiceError::VaNotFound(_) | LeadServiceError::LeadNotFound(_)) => {
            error_body(StatusCode::NOT_FOUND, &error.to_string(), Vec::new())
        }
        LeadServiceError::Repository(RepositoryError::NotFound) => {
            error_body(StatusCode::NOT_FOUND, "Lead not found", Vec::new())
        }
        LeadServiceError::Repository(
            error @ (RepositoryError::Conflict | RepositoryError::StaleStatus { .. }),
        ) => error_body(StatusCode::CONFLICT, &error.to_string(), Vec::new()),
        LeadServiceError::Repository(error @ RepositoryError::Unavailable(_)) => error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            &error.to_string(),
            Vec::new(),
        ),
    }
}

fn error_body(status: StatusCode, message: &str, errors: Vec<String>) -> Response {
    let payload = if errors.is_empty() {
        json!({ "error": message })
    } else {
        json!({ "error": message, "errors": errors })
    };
    (status, Json(payload)).into_response()
}
