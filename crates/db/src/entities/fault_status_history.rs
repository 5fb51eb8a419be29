//! Fault status history entity.
//!
//! Rows are append-only. The auto-increment key records insertion order and
//! breaks ties between entries written within the same instant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::fault_report::FaultStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fault_status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub fault_id: String,
    pub status: FaultStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    /// Staff user who made the change; `None` for the submission entry.
    #[sea_orm(nullable)]
    pub changed_by: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fault_report::Entity",
        from = "Column::FaultId",
        to = "super::fault_report::Column::Id",
        on_delete = "Cascade"
    )]
    FaultReport,
}

impl Related<super::fault_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaultReport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
