//! Common utilities and shared types for the student portal.
//!
//! This crate provides foundational components used across all portal crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based row identifiers via [`IdGenerator`]
//! - **Reference IDs**: Public fault tracking codes via [`ReferenceId`]
//! - **Input**: Trimming, blank checks and patch-field deserialization in [`input`]
//!
//! # Example
//!
//! ```no_run
//! use portal_common::{AppResult, Config, IdGenerator, ReferenceId};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("Row ID: {}", id_gen.generate());
//!     println!("Tracking code: {}", ReferenceId::generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod input;
pub mod reference_id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use reference_id::ReferenceId;
