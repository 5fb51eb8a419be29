//! Membership registration service.

use chrono::Utc;
use portal_common::{AppResult, IdGenerator, input::not_blank};
use portal_db::{
    entities::member::{self, MemberStatus},
    repositories::MemberRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for registering a member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberInput {
    #[validate(length(min = 3, max = 32), custom(function = "not_blank"))]
    pub matric_number: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 64), custom(function = "not_blank"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 64), custom(function = "not_blank"))]
    pub last_name: String,

    #[validate(length(min = 7, max = 20), custom(function = "not_blank"))]
    pub phone: String,

    #[validate(length(min = 2, max = 128), custom(function = "not_blank"))]
    pub department: String,

    #[validate(length(min = 1, max = 16), custom(function = "not_blank"))]
    pub level: String,
}

/// Which registration keys are already in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheck {
    pub matric_number_taken: bool,
    pub email_taken: bool,
}

impl DuplicateCheck {
    /// Whether either key is taken.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.matric_number_taken || self.email_taken
    }
}

/// Member service.
#[derive(Clone)]
pub struct MemberService {
    member_repo: MemberRepository,
    id_gen: IdGenerator,
}

impl MemberService {
    /// Create a new member service.
    #[must_use]
    pub const fn new(member_repo: MemberRepository) -> Self {
        Self {
            member_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new member in `PENDING` state.
    ///
    /// Duplicates are caught by the unique indexes on matric number and
    /// email, so two concurrent registrations cannot both succeed.
    pub async fn register(&self, input: RegisterMemberInput) -> AppResult<member::Model> {
        input.validate()?;

        let model = member::ActiveModel {
            id: Set(self.id_gen.generate()),
            matric_number: Set(normalize_matric(&input.matric_number)),
            email: Set(normalize_email(&input.email)),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            phone: Set(input.phone.trim().to_string()),
            department: Set(input.department.trim().to_string()),
            level: Set(input.level.trim().to_string()),
            status: Set(MemberStatus::Pending),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let member = self.member_repo.create(model).await?;
        tracing::info!(member_id = %member.id, "Member registered");

        Ok(member)
    }

    /// Advisory duplicate lookup for the registration form.
    ///
    /// Only a hint: [`Self::register`] remains the authority.
    pub async fn check_duplicate(
        &self,
        matric_number: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<DuplicateCheck> {
        let mut check = DuplicateCheck::default();

        if let Some(matric) = matric_number.map(normalize_matric).filter(|m| !m.is_empty()) {
            check.matric_number_taken = self
                .member_repo
                .find_by_matric_number(&matric)
                .await?
                .is_some();
        }
        if let Some(email) = email.map(normalize_email).filter(|e| !e.is_empty()) {
            check.email_taken = self.member_repo.find_by_email(&email).await?.is_some();
        }

        Ok(check)
    }

    /// Get a member by ID.
    pub async fn get(&self, id: &str) -> AppResult<member::Model> {
        self.member_repo.get_by_id(id).await
    }

    /// List members, newest first.
    pub async fn list(
        &self,
        status: Option<MemberStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<member::Model>> {
        self.member_repo.list(status, limit, offset).await
    }

    /// Count members.
    pub async fn count(&self, status: Option<MemberStatus>) -> AppResult<u64> {
        self.member_repo.count(status).await
    }

    /// Change a member's status.
    pub async fn update_status(&self, id: &str, status: MemberStatus) -> AppResult<member::Model> {
        let member = self.member_repo.get_by_id(id).await?;
        let previous = member.status;

        let mut active: member::ActiveModel = member.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now()));

        let member = self.member_repo.update(active).await?;
        tracing::info!(member_id = %member.id, from = ?previous, to = ?status, "Member status changed");

        Ok(member)
    }
}

fn normalize_matric(value: &str) -> String {
    value.trim().to_uppercase()
}

fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
