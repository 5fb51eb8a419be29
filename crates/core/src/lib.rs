//! Core business logic for the student portal.
//!
//! Services sit between the HTTP layer and the repositories. They validate
//! input, enforce role and state rules, and decide which writes belong in
//! one transaction.

pub mod services;

pub use services::*;
