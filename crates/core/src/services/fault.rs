//! Fault reporting service.
//!
//! Reports are submitted anonymously, tracked publicly by their reference
//! ID and worked on by staff. Every status change is appended to the
//! report's history in the same transaction that updates its current
//! status, so the two can never disagree.

use chrono::{DateTime, Utc};
use portal_common::{
    AppError, AppResult, IdGenerator, ReferenceId,
    input::{double_option, non_empty, not_blank},
};
use portal_db::{
    entities::{
        fault_report::{self, FaultStatus},
        fault_status_history,
    },
    repositories::{
        AppliedChanges, FaultCategoryRepository, FaultChanges, FaultFilter, FaultReportRepository,
        NewTransition, StatusChange, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Attempts at finding an unused reference ID before giving up.
pub const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// Longest accepted admin note.
pub const MAX_ADMIN_NOTES: usize = 5000;

/// Note recorded with the entry written at submission.
pub const SUBMITTED_NOTE: &str = "Fault report submitted";

/// Input for submitting a fault report.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFaultInput {
    #[validate(length(min = 2, max = 128), custom(function = "not_blank"))]
    pub reporter_name: String,

    #[validate(email)]
    pub reporter_email: String,

    #[validate(length(min = 7, max = 32))]
    pub reporter_phone: Option<String>,

    #[validate(length(min = 2, max = 256), custom(function = "not_blank"))]
    pub location: String,

    #[validate(length(min = 1, max = 32), custom(function = "not_blank"))]
    pub category_id: String,

    #[validate(length(min = 10, max = 5000), custom(function = "not_blank"))]
    pub description: String,

    #[validate(url)]
    pub attachment_url: Option<String>,
}

/// Staff edits to a fault report.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFaultInput {
    pub status: Option<FaultStatus>,

    /// `null` or an empty string unassigns.
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,

    /// `null` or an empty string clears the notes.
    #[serde(default, deserialize_with = "double_option")]
    pub admin_notes: Option<Option<String>>,

    /// History note used when the status changes.
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// One step of a publicly visible timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub status: FaultStatus,
    pub status_label: &'static str,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<fault_status_history::Model> for TimelineEntry {
    fn from(entry: fault_status_history::Model) -> Self {
        Self {
            status: entry.status,
            status_label: entry.status.label(),
            note: entry.note,
            created_at: entry.created_at,
        }
    }
}

/// Public view of a fault report, looked up by reference ID.
///
/// Carries no reporter contact details and no staff attribution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFault {
    pub reference_id: String,
    pub status: FaultStatus,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub category: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub timeline: Vec<TimelineEntry>,
}

/// Number of reports per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultStats {
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
    pub total: u64,
}

/// Fault reporting service.
#[derive(Clone)]
pub struct FaultService {
    fault_repo: FaultReportRepository,
    category_repo: FaultCategoryRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FaultService {
    /// Create a new fault service.
    #[must_use]
    pub const fn new(
        fault_repo: FaultReportRepository,
        category_repo: FaultCategoryRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            fault_repo,
            category_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Submission & Tracking ==========

    /// Submit a new fault report.
    ///
    /// The report starts `OPEN` with a single history entry. A reference ID
    /// that is already taken is replaced by a fresh one.
    pub async fn submit(&self, input: SubmitFaultInput) -> AppResult<fault_report::Model> {
        input.validate()?;

        let category = match self.category_repo.find_by_id(input.category_id.trim()).await? {
            Some(category) if category.is_active => category,
            _ => {
                return Err(AppError::BadRequest(format!(
                    "Unknown fault category: {}",
                    input.category_id
                )));
            }
        };

        let id = self.id_gen.generate();
        let repo = &self.fault_repo;
        let input = &input;
        let (id, category_id) = (id.as_str(), category.id.as_str());

        let fault = retry_on_conflict(MAX_REFERENCE_ATTEMPTS, move |_| {
            let now = Utc::now();

            let model = fault_report::ActiveModel {
                id: Set(id.to_string()),
                reference_id: Set(ReferenceId::generate_at(now).into_inner()),
                reporter_name: Set(input.reporter_name.trim().to_string()),
                reporter_email: Set(input.reporter_email.trim().to_lowercase()),
                reporter_phone: Set(non_empty(input.reporter_phone.clone())),
                location: Set(input.location.trim().to_string()),
                category_id: Set(category_id.to_string()),
                description: Set(input.description.trim().to_string()),
                attachment_url: Set(non_empty(input.attachment_url.clone())),
                status: Set(FaultStatus::Open),
                assigned_to: Set(None),
                admin_notes: Set(None),
                created_at: Set(now),
                updated_at: Set(None),
            };

            let initial = NewTransition {
                status: FaultStatus::Open,
                note: Some(SUBMITTED_NOTE.to_string()),
                changed_by: None,
                created_at: now,
            };

            repo.create_with_initial_entry(model, initial)
        })
        .await?
        .0;

        tracing::info!(
            fault_id = %fault.id,
            reference_id = %fault.reference_id,
            category = %fault.category_id,
            "Fault report submitted"
        );

        Ok(fault)
    }

    /// Public lookup by reference ID.
    ///
    /// Values that are not shaped like a reference ID are reported as not
    /// found without touching the database.
    pub async fn track(&self, reference_id: &str) -> AppResult<TrackedFault> {
        let reference = ReferenceId::parse(reference_id.trim())
            .map_err(|_| AppError::FaultNotFound(reference_id.to_string()))?;

        let fault = self
            .fault_repo
            .find_by_reference_id(reference.as_str())
            .await?
            .ok_or_else(|| AppError::FaultNotFound(reference.to_string()))?;

        let category = self
            .category_repo
            .find_by_id(&fault.category_id)
            .await?
            .map_or_else(|| fault.category_id.clone(), |c| c.name);

        let timeline = self
            .fault_repo
            .list_history(&fault.id)
            .await?
            .into_iter()
            .map(TimelineEntry::from)
            .collect();

        Ok(TrackedFault {
            reference_id: fault.reference_id,
            status: fault.status,
            status_label: fault.status.label(),
            status_color: fault.status.color(),
            category,
            location: fault.location,
            created_at: fault.created_at,
            updated_at: fault.updated_at,
            timeline,
        })
    }

    // ========== Staff ==========

    /// Get a fault report by ID.
    pub async fn get(&self, id: &str) -> AppResult<fault_report::Model> {
        self.fault_repo.get_by_id(id).await
    }

    /// List fault reports, newest first.
    pub async fn list(
        &self,
        filter: &FaultFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<fault_report::Model>> {
        self.fault_repo.list(filter, limit, offset).await
    }

    /// Count fault reports matching a filter.
    pub async fn count(&self, filter: &FaultFilter) -> AppResult<u64> {
        self.fault_repo.count(filter).await
    }

    /// Count reports per status.
    pub async fn stats(&self) -> AppResult<FaultStats> {
        let mut stats = FaultStats::default();

        for status in FaultStatus::ALL {
            let count = self.fault_repo.count_by_status(status).await?;
            match status {
                FaultStatus::Open => stats.open = count,
                FaultStatus::InProgress => stats.in_progress = count,
                FaultStatus::Resolved => stats.resolved = count,
                FaultStatus::Closed => stats.closed = count,
            }
            stats.total += count;
        }

        Ok(stats)
    }

    /// Record a status change.
    ///
    /// Always appends a history entry, even when the status is unchanged.
    /// A blank note is replaced by `Status changed to <Label>`.
    pub async fn record_transition(
        &self,
        fault_id: &str,
        status: FaultStatus,
        note: Option<String>,
        changed_by: Option<&str>,
    ) -> AppResult<fault_status_history::Model> {
        let change = StatusChange {
            status,
            note: note_or_default(note, status),
            changed_by: changed_by.map(str::to_string),
            always_record: true,
        };

        let AppliedChanges {
            fault,
            previous_status,
            entry,
        } = self
            .fault_repo
            .apply_changes(fault_id, FaultChanges::default(), Some(change))
            .await?;

        tracing::info!(
            fault_id = %fault.id,
            from = %previous_status,
            to = %fault.status,
            changed_by = ?changed_by,
            "Fault status changed"
        );

        entry.ok_or_else(|| AppError::Internal("Status history entry was not written".to_string()))
    }

    /// List a fault's status history, earliest first.
    pub async fn list_transitions(
        &self,
        fault_id: &str,
    ) -> AppResult<Vec<fault_status_history::Model>> {
        self.fault_repo.get_by_id(fault_id).await?;
        self.fault_repo.list_history(fault_id).await
    }

    /// Apply staff edits.
    ///
    /// A history entry is appended only when the status actually changes.
    /// Assignees must be active back-office users.
    pub async fn update(
        &self,
        fault_id: &str,
        input: UpdateFaultInput,
        actor_id: &str,
    ) -> AppResult<fault_report::Model> {
        input.validate()?;
        if matches!(&input.admin_notes, Some(Some(notes)) if notes.chars().count() > MAX_ADMIN_NOTES)
        {
            return Err(AppError::Validation(format!(
                "Admin notes exceed {MAX_ADMIN_NOTES} characters"
            )));
        }

        let assigned_to = match input.assigned_to {
            Some(assignee) => match non_empty(assignee) {
                Some(user_id) => {
                    let user = self.user_repo.find_by_id(&user_id).await?;
                    if !user.is_some_and(|u| u.is_assignable()) {
                        return Err(AppError::BadRequest(format!(
                            "Cannot assign to {user_id}: not an active staff user"
                        )));
                    }
                    Some(Some(user_id))
                }
                None => Some(None),
            },
            None => None,
        };

        let changes = FaultChanges {
            assigned_to,
            admin_notes: input.admin_notes.map(non_empty),
        };

        // Compared against the locked row, not a read taken before it
        let status_change = input.status.map(|status| StatusChange {
            status,
            note: note_or_default(input.note, status),
            changed_by: Some(actor_id.to_string()),
            always_record: false,
        });

        let AppliedChanges {
            fault,
            previous_status,
            entry,
        } = self
            .fault_repo
            .apply_changes(fault_id, changes, status_change)
            .await?;

        if entry.is_some() {
            tracing::info!(
                fault_id = %fault.id,
                from = %previous_status,
                to = %fault.status,
                actor_id = %actor_id,
                "Fault status changed"
            );
        }

        Ok(fault)
    }
}

/// Run `op` until it stops reporting a unique-key conflict.
async fn retry_on_conflict<T, F, Fut>(attempts: usize, mut op: F) -> AppResult<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    for attempt in 1..=attempts {
        match op(attempt).await {
            Err(AppError::Conflict(reason)) => {
                tracing::warn!(attempt, reason = %reason, "Reference ID collision, regenerating");
            }
            result => return result,
        }
    }

    Err(AppError::Internal(
        "Could not allocate a unique reference ID".to_string(),
    ))
}

fn note_or_default(note: Option<String>, status: FaultStatus) -> String {
    non_empty(note).unwrap_or_else(|| format!("Status changed to {}", status.label()))
}
