//! Database entities.

pub mod fault_category;
pub mod fault_report;
pub mod fault_status_history;
pub mod member;
pub mod user;

pub use fault_category::Entity as FaultCategory;
pub use fault_report::Entity as FaultReport;
pub use fault_status_history::Entity as FaultStatusHistory;
pub use member::Entity as Member;
pub use user::Entity as User;
