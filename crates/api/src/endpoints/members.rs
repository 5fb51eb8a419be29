//! Membership endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use portal_common::AppResult;
use portal_core::{DuplicateCheck, RegisterMemberInput};
use portal_db::entities::member::{self, MemberStatus};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Page, clamp_limit},
};

/// Member response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: String,
    pub matric_number: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub department: String,
    pub level: String,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<member::Model> for MemberResponse {
    fn from(member: member::Model) -> Self {
        Self {
            id: member.id,
            matric_number: member.matric_number,
            email: member.email,
            first_name: member.first_name,
            last_name: member.last_name,
            phone: member.phone,
            department: member.department,
            level: member.level,
            status: member.status,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterMemberInput>,
) -> AppResult<ApiResponse<MemberResponse>> {
    let member = state.member_service.register(input).await?;

    Ok(ApiResponse::created(member.into()))
}

/// Duplicate check request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDuplicateRequest {
    pub matric_number: Option<String>,
    pub email: Option<String>,
}

async fn check_duplicate(
    State(state): State<AppState>,
    Json(req): Json<CheckDuplicateRequest>,
) -> AppResult<ApiResponse<DuplicateCheck>> {
    let check = state
        .member_service
        .check_duplicate(req.matric_number.as_deref(), req.email.as_deref())
        .await?;

    Ok(ApiResponse::ok(check))
}

/// List members query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersQuery {
    pub status: Option<MemberStatus>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

async fn list_members(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListMembersQuery>,
) -> AppResult<ApiResponse<Page<MemberResponse>>> {
    user.require_admin()?;

    let limit = clamp_limit(query.limit);
    let members = state
        .member_service
        .list(query.status, limit, query.offset)
        .await?;
    let total = state.member_service.count(query.status).await?;

    Ok(ApiResponse::ok(Page {
        items: members.into_iter().map(MemberResponse::from).collect(),
        total,
        limit,
        offset: query.offset,
    }))
}

async fn get_member(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MemberResponse>> {
    user.require_admin()?;

    let member = state.member_service.get(&id).await?;

    Ok(ApiResponse::ok(member.into()))
}

/// Status update request.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberStatusRequest {
    pub status: MemberStatus,
}

async fn update_member_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMemberStatusRequest>,
) -> AppResult<ApiResponse<MemberResponse>> {
    user.require_admin()?;

    let member = state.member_service.update_status(&id, req.status).await?;

    Ok(ApiResponse::ok(member.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register).get(list_members))
        .route("/check-duplicate", post(check_duplicate))
        .route("/{id}", get(get_member))
        .route("/{id}/status", patch(update_member_status))
}
