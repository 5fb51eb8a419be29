//! Fault report repository.
//!
//! Owns both the `fault_report` rows and their `fault_status_history`
//! timeline. Every write that touches the timeline also updates the
//! denormalized `fault_report.status` inside the same transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use portal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    FaultReport, FaultStatusHistory,
    fault_report::{self, FaultStatus},
    fault_status_history,
};
use crate::map_write_err;

/// Filter for listing fault reports.
#[derive(Debug, Clone, Default)]
pub struct FaultFilter {
    pub status: Option<FaultStatus>,
    pub category_id: Option<String>,
    pub assigned_to: Option<String>,
}

impl FaultFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = self.status {
            condition = condition.add(fault_report::Column::Status.eq(status));
        }
        if let Some(ref category_id) = self.category_id {
            condition = condition.add(fault_report::Column::CategoryId.eq(category_id.as_str()));
        }
        if let Some(ref assigned_to) = self.assigned_to {
            condition = condition.add(fault_report::Column::AssignedTo.eq(assigned_to.as_str()));
        }
        condition
    }
}

/// A status transition to append to a fault's timeline.
#[derive(Debug, Clone)]
pub struct NewTransition {
    pub status: FaultStatus,
    pub note: Option<String>,
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewTransition {
    fn into_active_model(self, fault_id: &str) -> fault_status_history::ActiveModel {
        fault_status_history::ActiveModel {
            fault_id: Set(fault_id.to_string()),
            status: Set(self.status),
            note: Set(self.note),
            changed_by: Set(self.changed_by),
            created_at: Set(self.created_at),
            ..Default::default()
        }
    }
}

/// A status change requested by back-office staff.
///
/// Carries no timestamp: the entry is stamped once the fault row is locked,
/// so timeline order always matches commit order.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: FaultStatus,
    pub note: String,
    pub changed_by: Option<String>,
    /// Append an entry even when the fault already has `status`.
    pub always_record: bool,
}

/// Non-status edits to a fault report.
///
/// The outer `Option` means "leave unchanged"; `Some(None)` clears the field.
#[derive(Debug, Clone, Default)]
pub struct FaultChanges {
    pub assigned_to: Option<Option<String>>,
    pub admin_notes: Option<Option<String>>,
}

impl FaultChanges {
    /// Whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assigned_to.is_none() && self.admin_notes.is_none()
    }
}

/// Result of [`FaultReportRepository::apply_changes`].
#[derive(Debug, Clone)]
pub struct AppliedChanges {
    pub fault: fault_report::Model,
    /// Status the fault had when its row was locked.
    pub previous_status: FaultStatus,
    /// Entry appended to the timeline, if any.
    pub entry: Option<fault_status_history::Model>,
}

/// Repository for fault reports and their status history.
#[derive(Clone)]
pub struct FaultReportRepository {
    db: Arc<DatabaseConnection>,
}

impl FaultReportRepository {
    /// Create a new fault report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Fault Reports ==========

    /// Insert a fault report together with its first timeline entry.
    ///
    /// A reference ID collision surfaces as [`AppError::Conflict`] and
    /// leaves nothing behind.
    pub async fn create_with_initial_entry(
        &self,
        model: fault_report::ActiveModel,
        initial: NewTransition,
    ) -> AppResult<(fault_report::Model, fault_status_history::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let fault = model
            .insert(&txn)
            .await
            .map_err(|e| map_write_err(e, "Reference ID already in use"))?;

        let entry = initial
            .into_active_model(&fault.id)
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((fault, entry))
    }

    /// Find a fault report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<fault_report::Model>> {
        FaultReport::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a fault report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<fault_report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::FaultNotFound(id.to_string()))
    }

    /// Find a fault report by its public reference ID.
    pub async fn find_by_reference_id(
        &self,
        reference_id: &str,
    ) -> AppResult<Option<fault_report::Model>> {
        FaultReport::find()
            .filter(fault_report::Column::ReferenceId.eq(reference_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List fault reports, newest first.
    pub async fn list(
        &self,
        filter: &FaultFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<fault_report::Model>> {
        FaultReport::find()
            .filter(filter.condition())
            .order_by(fault_report::Column::CreatedAt, Order::Desc)
            .order_by(fault_report::Column::Id, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count fault reports matching a filter.
    pub async fn count(&self, filter: &FaultFilter) -> AppResult<u64> {
        FaultReport::find()
            .filter(filter.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count fault reports in a given status.
    pub async fn count_by_status(&self, status: FaultStatus) -> AppResult<u64> {
        FaultReport::find()
            .filter(fault_report::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply field edits and an optional status change atomically.
    ///
    /// The fault row is locked for the whole transaction, so concurrent
    /// changes to the same fault are serialized. A status change equal to
    /// the locked row's status is skipped unless `always_record` is set;
    /// otherwise its entry is appended and the fault's status set to match.
    pub async fn apply_changes(
        &self,
        fault_id: &str,
        changes: FaultChanges,
        status_change: Option<StatusChange>,
    ) -> AppResult<AppliedChanges> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let fault = FaultReport::find_by_id(fault_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::FaultNotFound(fault_id.to_string()))?;

        let previous_status = fault.status;
        let status_change =
            status_change.filter(|c| c.always_record || c.status != previous_status);

        if changes.is_empty() && status_change.is_none() {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(AppliedChanges {
                fault,
                previous_status,
                entry: None,
            });
        }

        // Stamped under the row lock
        let now = Utc::now();
        let mut model: fault_report::ActiveModel = fault.into();

        if let Some(assigned_to) = changes.assigned_to {
            model.assigned_to = Set(assigned_to);
        }
        if let Some(admin_notes) = changes.admin_notes {
            model.admin_notes = Set(admin_notes);
        }

        let entry = match status_change {
            Some(change) => {
                model.status = Set(change.status);
                let entry = NewTransition {
                    status: change.status,
                    note: Some(change.note),
                    changed_by: change.changed_by,
                    created_at: now,
                }
                .into_active_model(fault_id)
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
                Some(entry)
            }
            None => None,
        };

        model.updated_at = Set(Some(now));
        let fault = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(AppliedChanges {
            fault,
            previous_status,
            entry,
        })
    }

    // ========== Status History ==========

    /// List the timeline of a fault, earliest first.
    ///
    /// Entries written within the same instant keep insertion order.
    pub async fn list_history(
        &self,
        fault_id: &str,
    ) -> AppResult<Vec<fault_status_history::Model>> {
        FaultStatusHistory::find()
            .filter(fault_status_history::Column::FaultId.eq(fault_id))
            .order_by(fault_status_history::Column::CreatedAt, Order::Asc)
            .order_by(fault_status_history::Column::Id, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
