//! Fault report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a fault report.
///
/// Declaration order is the nominal progression. Nothing forbids moving
/// backwards; `Resolved` and `Closed` are terminal only by convention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultStatus {
    #[sea_orm(string_value = "OPEN")]
    #[default]
    Open,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

impl FaultStatus {
    /// Every status, in progression order.
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    /// Wire value (`OPEN`, `IN_PROGRESS`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Display colour used by the front end badges.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Open => "red",
            Self::InProgress => "yellow",
            Self::Resolved => "green",
            Self::Closed => "gray",
        }
    }

    /// Whether work on the fault is considered finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl std::fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FaultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown fault status: {s}"))
    }
}

/// Fault report model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fault_report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Public tracking code (`FRMS-YYYY-XXXXXX`), never updated.
    #[sea_orm(unique)]
    pub reference_id: String,
    pub reporter_name: String,
    pub reporter_email: String,
    #[sea_orm(nullable)]
    pub reporter_phone: Option<String>,
    pub location: String,
    pub category_id: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(nullable)]
    pub attachment_url: Option<String>,
    /// Mirrors the status of the latest history entry.
    pub status: FaultStatus,
    /// Staff member responsible for the fix.
    #[sea_orm(nullable)]
    pub assigned_to: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,
    pub created_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fault_category::Entity",
        from = "Column::CategoryId",
        to = "super::fault_category::Column::Id"
    )]
    FaultCategory,
    #[sea_orm(has_many = "super::fault_status_history::Entity")]
    FaultStatusHistory,
}

impl Related<super::fault_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaultCategory.def()
    }
}

impl Related<super::fault_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaultStatusHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
