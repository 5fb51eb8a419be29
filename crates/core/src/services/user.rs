//! User service.
//!
//! Back-office accounts only. Sign-in issues an opaque bearer token that is
//! stored on the user row and rotated on every sign-in and sign-out.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use portal_common::{AppError, AppResult, Config, IdGenerator, input::not_blank};
use portal_db::{
    entities::user::{self, UserRole},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a back-office user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128), custom(function = "not_blank"))]
    pub name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    pub role: UserRole,
}

/// Input for updating a back-office user.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 128), custom(function = "not_blank"))]
    pub name: Option<String>,

    pub role: Option<UserRole>,

    pub is_active: Option<bool>,

    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a back-office user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email.trim().to_lowercase()),
            name: Set(input.name.trim().to_string()),
            password_hash: Set(password_hash),
            role: Set(input.role),
            token: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, role = ?user.role, "Created back-office user");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List users, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(limit, offset).await
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        self.user_repo.count().await
    }

    /// Sign in with email and password.
    ///
    /// Returns the user together with a freshly issued token. Any previous
    /// token stops working.
    pub async fn signin(&self, email: &str, password: &str) -> AppResult<(user::Model, String)> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(Utc::now()));

        let user = self.user_repo.update(active).await?;
        tracing::info!(user_id = %user.id, "User signed in");

        Ok((user, token))
    }

    /// Sign out by rotating the user's token.
    pub async fn signout(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(Utc::now()));

        self.user_repo.update(active).await?;
        tracing::info!(user_id = %user_id, "User signed out");

        Ok(())
    }

    /// Authenticate a user by token.
    ///
    /// Disabled accounts are treated as unknown.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AppError::Unauthorized)
    }

    /// Update a user on behalf of an administrator.
    ///
    /// Administrators cannot disable or demote themselves.
    pub async fn update(
        &self,
        actor_id: &str,
        id: &str,
        input: UpdateUserInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        if actor_id == id
            && (input.is_active == Some(false)
                || input.role.is_some_and(|role| role != UserRole::Admin))
        {
            return Err(AppError::BadRequest(
                "You cannot disable or demote your own account".to_string(),
            ));
        }

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
            if !is_active {
                active.token = Set(None);
            }
        }
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
            active.token = Set(None);
        }

        active.updated_at = Set(Some(Utc::now()));

        self.user_repo.update(active).await
    }

    /// Create the configured administrator when no user exists yet.
    ///
    /// Returns the new account, or `None` when nothing was created.
    pub async fn ensure_bootstrap_admin(&self, config: &Config) -> AppResult<Option<user::Model>> {
        let Some(admin) = config.admin.as_ref() else {
            return Ok(None);
        };

        if self.user_repo.count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .create(CreateUserInput {
                email: admin.email.clone(),
                name: admin.name.clone(),
                password: admin.password.clone(),
                role: UserRole::Admin,
            })
            .await?;

        tracing::info!(email = %user.email, "Bootstrapped administrator account");

        Ok(Some(user))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use portal_common::config::{AdminConfig, DatabaseConfig, ServerConfig};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_config(admin: Option<AdminConfig>) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "https://sa.example.edu".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            admin,
        }
    }

    fn create_test_user(id: &str, password_hash: &str, is_active: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: "staff@example.edu".to_string(),
            name: "Works Staff".to_string(),
            password_hash: password_hash.to_string(),
            role: UserRole::Staff,
            token: Some("old_token".to_string()),
            is_active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn create_test_service(db: DatabaseConnection) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db)))
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[tokio::test]
    async fn test_signin_rotates_token() {
        let hash = hash_password("correct-horse").unwrap();
        let user = create_test_user("user1", &hash, true);
        let mut signed_in = user.clone();
        signed_in.token = Some("new_token".to_string());

        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[signed_in]])
                .into_connection(),
        );

        let (user, token) = service
            .signin("Staff@Example.edu", "correct-horse")
            .await
            .unwrap();

        assert_eq!(user.id, "user1");
        assert_eq!(token.len(), 32);
        assert_ne!(token, "old_token");
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let hash = hash_password("correct-horse").unwrap();

        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", &hash, true)]])
                .into_connection(),
        );

        let result = service.signin("staff@example.edu", "battery-staple").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_signin_disabled_account() {
        let hash = hash_password("correct-horse").unwrap();

        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", &hash, false)]])
                .into_connection(),
        );

        let result = service.signin("staff@example.edu", "correct-horse").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_rejects_disabled() {
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", "x", false)]])
                .into_connection(),
        );

        let result = service.authenticate_by_token("old_token").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_refuses_self_demotion() {
        let service =
            create_test_service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .update(
                "admin1",
                "admin1",
                UpdateUserInput {
                    role: Some(UserRole::Staff),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_skipped_without_config() {
        let service =
            create_test_service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .ensure_bootstrap_admin(&create_test_config(None))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_skipped_when_users_exist() {
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let config = create_test_config(Some(AdminConfig {
            email: "admin@example.edu".to_string(),
            password: "change-me-please".to_string(),
            name: "Administrator".to_string(),
        }));

        assert!(service.ensure_bootstrap_admin(&config).await.unwrap().is_none());
    }

    #[test]
    fn test_create_user_input_validation() {
        let input = CreateUserInput {
            email: "not-an-email".to_string(),
            name: "Staff".to_string(),
            password: "password123".to_string(),
            role: UserRole::Staff,
        };
        assert!(input.validate().is_err());

        let input = CreateUserInput {
            email: "staff@example.edu".to_string(),
            name: "Staff".to_string(),
            password: "short".to_string(),
            role: UserRole::Staff,
        };
        assert!(input.validate().is_err());

        let input = CreateUserInput {
            email: "staff@example.edu".to_string(),
            name: "Staff".to_string(),
            password: "password123".to_string(),
            role: UserRole::Admin,
        };
        assert!(input.validate().is_ok());
    }
}
