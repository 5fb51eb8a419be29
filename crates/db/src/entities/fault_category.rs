//! Fault category entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fault category model.
///
/// The primary key is a short lower-case code (`electrical`, `plumbing`, ...)
/// so seeded categories have stable identifiers across deployments.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fault_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Inactive categories stay attached to old reports but accept no new ones.
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fault_report::Entity")]
    FaultReport,
}

impl Related<super::fault_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaultReport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
