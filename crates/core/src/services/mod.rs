//! Business logic services.

#![allow(missing_docs)]

pub mod fault;
pub mod fault_category;
pub mod member;
pub mod user;

pub use fault::{
    FaultService, FaultStats, SubmitFaultInput, TimelineEntry, TrackedFault, UpdateFaultInput,
};
pub use fault_category::{CreateCategoryInput, FaultCategoryService, UpdateCategoryInput};
pub use member::{DuplicateCheck, MemberService, RegisterMemberInput};
pub use user::{CreateUserInput, UpdateUserInput, UserService};
