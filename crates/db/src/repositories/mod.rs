//! Repositories for database access.

pub mod fault_category;
pub mod fault_report;
pub mod member;
pub mod user;

pub use fault_category::FaultCategoryRepository;
pub use fault_report::{
    AppliedChanges, FaultChanges, FaultFilter, FaultReportRepository, NewTransition, StatusChange,
};
pub use member::MemberRepository;
pub use user::UserRepository;
