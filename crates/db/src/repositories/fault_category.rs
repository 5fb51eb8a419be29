//! Fault category repository.

use std::sync::Arc;

use crate::entities::{FaultCategory, fault_category};
use crate::map_write_err;
use portal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
};

/// Repository for fault categories.
#[derive(Clone)]
pub struct FaultCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl FaultCategoryRepository {
    /// Create a new fault category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by code.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<fault_category::Model>> {
        FaultCategory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by code, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<fault_category::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fault category {id} not found")))
    }

    /// List categories in display order.
    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<fault_category::Model>> {
        let mut query = FaultCategory::find();

        if !include_inactive {
            query = query.filter(fault_category::Column::IsActive.eq(true));
        }

        query
            .order_by(fault_category::Column::DisplayOrder, Order::Asc)
            .order_by(fault_category::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a category.
    pub async fn create(
        &self,
        model: fault_category::ActiveModel,
    ) -> AppResult<fault_category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Category code already exists"))
    }

    /// Update a category.
    pub async fn update(
        &self,
        model: fault_category::ActiveModel,
    ) -> AppResult<fault_category::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
