//! User entity.
//!
//! Back-office accounts: administrators and maintenance staff. Members of
//! the association are a separate entity and never sign in here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Back-office role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "STAFF")]
    #[default]
    Staff,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Sign-in email, stored lower-cased
    #[sea_orm(unique)]
    pub email: String,

    pub name: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,

    /// Bearer token, rotated on sign-in and sign-out
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this user can manage every part of the back office.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_active && matches!(self.role, UserRole::Admin)
    }

    /// Whether this user can work on, and be assigned to, fault reports.
    ///
    /// Every active back-office account qualifies, whatever its role.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        self.is_active
    }
}
