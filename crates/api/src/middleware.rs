//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use portal_core::{FaultCategoryService, FaultService, MemberService, UserService};
use portal_db::repositories::{
    FaultCategoryRepository, FaultReportRepository, MemberRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub fault_category_service: FaultCategoryService,
    pub fault_service: FaultService,
    pub member_service: MemberService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let category_repo = FaultCategoryRepository::new(Arc::clone(&db));
        let fault_repo = FaultReportRepository::new(Arc::clone(&db));
        let member_repo = MemberRepository::new(db);

        Self {
            user_service: UserService::new(user_repo.clone()),
            fault_category_service: FaultCategoryService::new(category_repo.clone()),
            fault_service: FaultService::new(fault_repo, category_repo, user_repo),
            member_service: MemberService::new(member_repo),
        }
    }
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stores it in the request
/// extensions. Requests without a valid token pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::warn!(error = %e, "Token lookup failed");
            }
            Err(_) => {}
        }
    }

    next.run(req).await
}
