//! Back-office user management endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use portal_common::AppResult;
use portal_core::{CreateUserInput, UpdateUserInput};
use portal_db::entities::user::{self, UserRole};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Page, clamp_limit},
};

/// User response. Never carries the password hash or token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// List users query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Page<UserResponse>>> {
    user.require_admin()?;

    let limit = clamp_limit(query.limit);
    let users = state.user_service.list(limit, query.offset).await?;
    let total = state.user_service.count().await?;

    Ok(ApiResponse::ok(Page {
        items: users.into_iter().map(UserResponse::from).collect(),
        total,
        limit,
        offset: query.offset,
    }))
}

async fn create_user(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    user.require_admin()?;

    let created = state.user_service.create(input).await?;

    Ok(ApiResponse::created(created.into()))
}

async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    user.require_admin()?;

    let updated = state.user_service.update(&user.0.id, &id, input).await?;

    Ok(ApiResponse::ok(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", patch(update_user))
}
