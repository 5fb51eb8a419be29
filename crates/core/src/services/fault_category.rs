//! Fault category service.

use std::sync::LazyLock;

use chrono::Utc;
use portal_common::{
    AppError, AppResult,
    input::{double_option, non_empty, not_blank},
};
use portal_db::{entities::fault_category, repositories::FaultCategoryRepository};
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

static CATEGORY_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]{1,31}$").expect("category code pattern is a valid regex")
});

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    /// Short stable code, e.g. `electrical`.
    pub id: String,

    #[validate(length(min = 1, max = 64), custom(function = "not_blank"))]
    pub name: String,

    #[validate(length(max = 512))]
    pub description: Option<String>,

    #[serde(default)]
    pub display_order: i32,
}

/// Input for updating a category.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 64), custom(function = "not_blank"))]
    pub name: Option<String>,

    /// `null` or an empty string clears the description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub is_active: Option<bool>,

    pub display_order: Option<i32>,
}

/// Service managing the fault taxonomy.
#[derive(Clone)]
pub struct FaultCategoryService {
    category_repo: FaultCategoryRepository,
}

impl FaultCategoryService {
    /// Create a new fault category service.
    #[must_use]
    pub const fn new(category_repo: FaultCategoryRepository) -> Self {
        Self { category_repo }
    }

    /// List categories in display order.
    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<fault_category::Model>> {
        self.category_repo.list(include_inactive).await
    }

    /// Resolve a category that accepts new reports.
    pub async fn get_active(&self, id: &str) -> AppResult<fault_category::Model> {
        match self.category_repo.find_by_id(id).await? {
            Some(category) if category.is_active => Ok(category),
            Some(_) => Err(AppError::BadRequest(format!(
                "Fault category {id} is no longer accepting reports"
            ))),
            None => Err(AppError::BadRequest(format!("Unknown fault category: {id}"))),
        }
    }

    /// Create a category.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<fault_category::Model> {
        input.validate()?;

        let code = input.id.trim().to_lowercase();
        if !CATEGORY_CODE.is_match(&code) {
            return Err(AppError::Validation(format!(
                "Invalid category code: {code}"
            )));
        }

        let model = fault_category::ActiveModel {
            id: Set(code),
            name: Set(input.name.trim().to_string()),
            description: Set(non_empty(input.description)),
            is_active: Set(true),
            display_order: Set(input.display_order),
            created_at: Set(Utc::now()),
        };

        let category = self.category_repo.create(model).await?;
        tracing::info!(category_id = %category.id, "Created fault category");

        Ok(category)
    }

    /// Update a category.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateCategoryInput,
    ) -> AppResult<fault_category::Model> {
        input.validate()?;

        let category = self.category_repo.get_by_id(id).await?;
        let mut active: fault_category::ActiveModel = category.into();

        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(non_empty(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(display_order) = input.display_order {
            active.display_order = Set(display_order);
        }

        self.category_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_category(id: &str, is_active: bool) -> fault_category::Model {
        fault_category::Model {
            id: id.to_string(),
            name: "Electrical".to_string(),
            description: None,
            is_active,
            display_order: 1,
            created_at: Utc::now(),
        }
    }

    fn service_with(results: Vec<Vec<fault_category::Model>>) -> FaultCategoryService {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(results)
            .into_connection();
        FaultCategoryService::new(FaultCategoryRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_get_active_accepts_active() {
        let service = service_with(vec![vec![create_test_category("electrical", true)]]);
        let category = service.get_active("electrical").await.unwrap();
        assert_eq!(category.id, "electrical");
    }

    #[tokio::test]
    async fn test_get_active_rejects_inactive_and_unknown() {
        let service = service_with(vec![vec![create_test_category("electrical", false)]]);
        assert!(matches!(
            service.get_active("electrical").await,
            Err(AppError::BadRequest(_))
        ));

        let service = service_with(vec![vec![]]);
        assert!(matches!(
            service.get_active("nope").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_code() {
        let service = service_with(vec![]);

        for code in ["", "x", "Has Space", "-leading", "emoji🔥"] {
            let result = service
                .create(CreateCategoryInput {
                    id: code.to_string(),
                    name: "Name".to_string(),
                    description: None,
                    display_order: 0,
                })
                .await;
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "accepted {code:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_create_lowercases_code() {
        let service = service_with(vec![vec![create_test_category("hvac", true)]]);

        let category = service
            .create(CreateCategoryInput {
                id: " HVAC ".to_string(),
                name: "Heating & cooling".to_string(),
                description: Some("  ".to_string()),
                display_order: 8,
            })
            .await
            .unwrap();

        assert_eq!(category.id, "hvac");
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let mut existing = create_test_category("electrical", true);
        existing.description = Some("Sockets and lighting".to_string());
        let patched = fault_category::Model {
            name: "Electrical works".to_string(),
            description: None,
            is_active: false,
            ..existing.clone()
        };

        let service = service_with(vec![vec![existing], vec![patched]]);

        let input: UpdateCategoryInput = serde_json::from_str(
            r#"{"name": " Electrical works ", "description": null, "isActive": false}"#,
        )
        .unwrap();
        assert_eq!(input.description, Some(None));

        let category = service.update("electrical", input).await.unwrap();
        assert_eq!(category.name, "Electrical works");
        assert_eq!(category.description, None);
        assert!(!category.is_active);
    }

    #[tokio::test]
    async fn test_update_unknown_category() {
        let service = service_with(vec![vec![]]);

        let result = service
            .update("nope", UpdateCategoryInput::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let service = service_with(vec![]);

        let result = service
            .update(
                "electrical",
                UpdateCategoryInput {
                    name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
