//! Member repository.

use std::sync::Arc;

use crate::entities::{
    Member,
    member::{self, MemberStatus},
};
use crate::map_write_err;
use portal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Message returned when a registration hits a unique index.
pub const DUPLICATE_MEMBER: &str = "A member with this matric number or email is already registered";

/// Member repository for database operations.
#[derive(Clone)]
pub struct MemberRepository {
    db: Arc<DatabaseConnection>,
}

impl MemberRepository {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a member.
    ///
    /// Duplicates are rejected by the unique indexes and reported as
    /// [`AppError::Conflict`].
    pub async fn create(&self, model: member::ActiveModel) -> AppResult<member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, DUPLICATE_MEMBER))
    }

    /// Find a member by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<member::Model>> {
        Member::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a member by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<member::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {id} not found")))
    }

    /// Find a member by normalised matric number.
    pub async fn find_by_matric_number(&self, matric: &str) -> AppResult<Option<member::Model>> {
        Member::find()
            .filter(member::Column::MatricNumber.eq(matric))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a member by normalised email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<member::Model>> {
        Member::find()
            .filter(member::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List members with optional status filter, newest first.
    pub async fn list(
        &self,
        status: Option<MemberStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<member::Model>> {
        let mut query = Member::find().order_by_desc(member::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(member::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count members with optional status filter.
    pub async fn count(&self, status: Option<MemberStatus>) -> AppResult<u64> {
        let mut query = Member::find();

        if let Some(s) = status {
            query = query.filter(member::Column::Status.eq(s));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a member.
    pub async fn update(&self, model: member::ActiveModel) -> AppResult<member::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, IntoActiveModel, MockDatabase};

    fn create_test_member(id: &str, matric: &str) -> member::Model {
        member::Model {
            id: id.to_string(),
            matric_number: matric.to_string(),
            email: format!("{}@example.edu", matric.to_lowercase()),
            first_name: "Chidi".to_string(),
            last_name: "Okafor".to_string(),
            phone: "+2348000000000".to_string(),
            department: "Computer Science".to_string(),
            level: "300".to_string(),
            status: MemberStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_matric_number() {
        let member = create_test_member("m1", "CSC/2021/001");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member.clone()]])
                .into_connection(),
        );

        let repo = MemberRepository::new(db);
        let result = repo.find_by_matric_number("CSC/2021/001").await.unwrap();

        assert_eq!(result, Some(member));
    }

    #[tokio::test]
    async fn test_create_surfaces_database_errors() {
        let member = create_test_member("m1", "CSC/2021/001");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection lost".to_string())])
                .into_connection(),
        );

        let repo = MemberRepository::new(db);
        let result = repo.create(member.into_active_model()).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_with_status() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_member("m1", "CSC/2021/001"),
                    create_test_member("m2", "CSC/2021/002"),
                ]])
                .into_connection(),
        );

        let repo = MemberRepository::new(db);
        let result = repo.list(Some(MemberStatus::Pending), 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
