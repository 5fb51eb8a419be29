//! Fault reporting endpoints.
//!
//! Submission and tracking are public. Everything else needs a staff token.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use portal_common::{AppError, AppResult, input::double_option};
use portal_core::{FaultStats, SubmitFaultInput, TrackedFault, UpdateFaultInput};
use portal_db::{
    entities::{
        fault_report::{self, FaultStatus},
        fault_status_history,
    },
    repositories::FaultFilter,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Page, clamp_limit},
};

/// Parse a status at the HTTP boundary.
fn parse_status(value: &str) -> AppResult<FaultStatus> {
    value.trim().parse().map_err(AppError::BadRequest)
}

/// Staff view of a fault report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultResponse {
    pub id: String,
    pub reference_id: String,
    pub reporter_name: String,
    pub reporter_email: String,
    pub reporter_phone: Option<String>,
    pub location: String,
    pub category_id: String,
    pub description: String,
    pub attachment_url: Option<String>,
    pub status: FaultStatus,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub assigned_to: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<fault_report::Model> for FaultResponse {
    fn from(fault: fault_report::Model) -> Self {
        Self {
            id: fault.id,
            reference_id: fault.reference_id,
            reporter_name: fault.reporter_name,
            reporter_email: fault.reporter_email,
            reporter_phone: fault.reporter_phone,
            location: fault.location,
            category_id: fault.category_id,
            description: fault.description,
            attachment_url: fault.attachment_url,
            status: fault.status,
            status_label: fault.status.label(),
            status_color: fault.status.color(),
            assigned_to: fault.assigned_to,
            admin_notes: fault.admin_notes,
            created_at: fault.created_at,
            updated_at: fault.updated_at,
        }
    }
}

/// Staff view of a history entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    pub id: i64,
    pub status: FaultStatus,
    pub status_label: &'static str,
    pub note: Option<String>,
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<fault_status_history::Model> for HistoryEntryResponse {
    fn from(entry: fault_status_history::Model) -> Self {
        Self {
            id: entry.id,
            status: entry.status,
            status_label: entry.status.label(),
            note: entry.note,
            changed_by: entry.changed_by,
            created_at: entry.created_at,
        }
    }
}

/// Fault report with its history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultDetailResponse {
    #[serde(flatten)]
    pub fault: FaultResponse,
    pub history: Vec<HistoryEntryResponse>,
}

/// Confirmation returned to the reporter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponse {
    pub reference_id: String,
    pub status: FaultStatus,
    pub status_label: &'static str,
    pub created_at: DateTime<Utc>,
}

// ==================== Public ====================

async fn submit_fault(
    State(state): State<AppState>,
    Json(input): Json<SubmitFaultInput>,
) -> AppResult<ApiResponse<SubmittedResponse>> {
    let fault = state.fault_service.submit(input).await?;

    Ok(ApiResponse::created(SubmittedResponse {
        reference_id: fault.reference_id,
        status: fault.status,
        status_label: fault.status.label(),
        created_at: fault.created_at,
    }))
}

async fn track_fault(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> AppResult<ApiResponse<TrackedFault>> {
    let tracked = state.fault_service.track(&reference_id).await?;

    Ok(ApiResponse::ok(tracked))
}

// ==================== Staff ====================

/// List faults query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFaultsQuery {
    pub status: Option<String>,
    pub category_id: Option<String>,
    pub assigned_to: Option<String>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

async fn list_faults(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListFaultsQuery>,
) -> AppResult<ApiResponse<Page<FaultResponse>>> {
    user.require_staff()?;

    let filter = FaultFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        category_id: query.category_id,
        assigned_to: query.assigned_to,
    };
    let limit = clamp_limit(query.limit);

    let faults = state.fault_service.list(&filter, limit, query.offset).await?;
    let total = state.fault_service.count(&filter).await?;

    Ok(ApiResponse::ok(Page {
        items: faults.into_iter().map(FaultResponse::from).collect(),
        total,
        limit,
        offset: query.offset,
    }))
}

async fn fault_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<FaultStats>> {
    user.require_staff()?;

    Ok(ApiResponse::ok(state.fault_service.stats().await?))
}

async fn get_fault(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FaultDetailResponse>> {
    user.require_staff()?;

    let fault = state.fault_service.get(&id).await?;
    let history = state.fault_service.list_transitions(&id).await?;

    Ok(ApiResponse::ok(FaultDetailResponse {
        fault: fault.into(),
        history: history.into_iter().map(HistoryEntryResponse::from).collect(),
    }))
}

/// Update fault request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFaultRequest {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub admin_notes: Option<Option<String>>,
    pub note: Option<String>,
}

async fn update_fault(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFaultRequest>,
) -> AppResult<ApiResponse<FaultResponse>> {
    user.require_staff()?;

    let input = UpdateFaultInput {
        status: req.status.as_deref().map(parse_status).transpose()?,
        assigned_to: req.assigned_to,
        admin_notes: req.admin_notes,
        note: req.note,
    };

    let fault = state.fault_service.update(&id, input, &user.0.id).await?;

    Ok(ApiResponse::ok(fault.into()))
}

/// Status change request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub status: String,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

async fn change_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChangeStatusRequest>,
) -> AppResult<ApiResponse<HistoryEntryResponse>> {
    user.require_staff()?;
    req.validate()?;

    let status = parse_status(&req.status)?;

    let entry = state
        .fault_service
        .record_transition(&id, status, req.note, Some(&user.0.id))
        .await?;

    Ok(ApiResponse::created(entry.into()))
}

async fn fault_history(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<HistoryEntryResponse>>> {
    user.require_staff()?;

    let history = state.fault_service.list_transitions(&id).await?;

    Ok(ApiResponse::ok(
        history.into_iter().map(HistoryEntryResponse::from).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_fault).get(list_faults))
        .route("/track/{reference_id}", get(track_fault))
        .route("/stats", get(fault_stats))
        .route("/{id}", get(get_fault).patch(update_fault))
        .route("/{id}/status", post(change_status))
        .route("/{id}/history", get(fault_history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("IN_PROGRESS").ok(), Some(FaultStatus::InProgress));
        assert_eq!(parse_status(" CLOSED ").ok(), Some(FaultStatus::Closed));
        assert!(matches!(
            parse_status("FIXED"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_status("open"),
            Err(AppError::BadRequest(_))
        ));
    }
}
