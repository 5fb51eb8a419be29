//! API endpoints.

mod auth;
mod fault_categories;
mod faults;
mod health;
mod members;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/health", health::router())
        .nest("/auth", auth::router())
        .nest("/fault-categories", fault_categories::router())
        .nest("/faults", faults::router())
        .nest("/members", members::router())
        .nest("/users", users::router())
}
