//! Fault category endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use portal_common::AppResult;
use portal_core::{CreateCategoryInput, UpdateCategoryInput};
use portal_db::entities::fault_category;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Category response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<fault_category::Model> for CategoryResponse {
    fn from(category: fault_category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            is_active: category.is_active,
            display_order: category.display_order,
            created_at: category.created_at,
        }
    }
}

/// List categories query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    /// Honored for administrators only.
    #[serde(default)]
    pub include_inactive: bool,
}

async fn list_categories(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let is_admin = user.as_ref().is_some_and(portal_db::entities::user::Model::is_admin);

    let categories = state
        .fault_category_service
        .list(is_admin && query.include_inactive)
        .await?;

    Ok(ApiResponse::ok(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

async fn create_category(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    user.require_admin()?;

    let category = state.fault_category_service.create(input).await?;

    Ok(ApiResponse::created(category.into()))
}

async fn update_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    user.require_admin()?;

    let category = state.fault_category_service.update(&id, input).await?;

    Ok(ApiResponse::ok(category.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", patch(update_category))
}
