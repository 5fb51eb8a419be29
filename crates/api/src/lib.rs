//! HTTP API layer for the student portal.
//!
//! - **Endpoints**: fault reporting, membership, categories and back-office users
//! - **Extractors**: bearer-token authentication and role checks
//! - **Middleware**: application state and token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack. Every success body is
//! wrapped as `{ "data": ... }`; errors render as `{ "error": { code, message } }`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
