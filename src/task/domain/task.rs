//! Task aggregate root and the validation contract shared by create and
//! update.

use super::{OwnerId, TaskDomainError, TaskId, TaskStatus};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Unvalidated candidate record as received from a caller.
///
/// Nothing in a candidate has been checked yet; [`TaskCandidate::validate`]
/// is the only way to turn it into [`TaskFields`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCandidate {
    /// Requested title.
    pub title: Option<String>,
    /// Requested description.
    pub description: Option<String>,
    /// Requested status as raw text.
    pub status: Option<String>,
    /// Requested due date as raw `YYYY-MM-DD` text.
    pub due_date: Option<String>,
}

impl TaskCandidate {
    /// Creates a candidate carrying only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the raw status text.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the raw due date text.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Validates the candidate.
    ///
    /// The title must be present and non-blank; the status, when present,
    /// must be a member of [`TaskStatus`] and defaults to
    /// [`TaskStatus::Pending`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskDomainError`] found.
    pub fn validate(self) -> Result<TaskFields, TaskDomainError> {
        let raw_title = self.title.ok_or(TaskDomainError::MissingTitle)?;
        let title = raw_title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }

        let status = self
            .status
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()?
            .unwrap_or_default();
        let due_date = self.due_date.as_deref().map(parse_due_date).transpose()?;
        let description = self
            .description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());

        Ok(TaskFields {
            title: title.to_owned(),
            description,
            status,
            due_date,
        })
    }
}

fn parse_due_date(value: &str) -> Result<NaiveDate, TaskDomainError> {
    NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT)
        .map_err(|_| TaskDomainError::InvalidDueDate(value.to_owned()))
}

/// Validated, owner-independent task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    title: String,
    description: Option<String>,
    status: TaskStatus,
    due_date: Option<NaiveDate>,
}

impl TaskFields {
    /// Returns the trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the status, defaulted when the candidate omitted it.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }
}

/// Partial change-set for an existing task.
///
/// `None` leaves a field untouched and `Some(None)` is an explicit null.
/// A null clears `description` and `due_date`; a null `title` or `status`
/// fails validation like any other invalid value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// Replacement title.
    pub title: Option<Option<String>>,
    /// Replacement or cleared description.
    pub description: Option<Option<String>>,
    /// Replacement status as raw text.
    pub status: Option<Option<String>>,
    /// Replacement or cleared due date as raw text.
    pub due_date: Option<Option<String>>,
}

impl TaskChanges {
    /// Creates a change-set that only moves the task to `status`.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(Some(status.as_str().to_owned())),
            ..Self::default()
        }
    }

    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: OwnerId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner identity.
    pub owner: OwnerId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task bound to `owner`.
    #[must_use]
    pub fn new(owner: OwnerId, fields: TaskFields, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let TaskFields {
            title,
            description,
            status,
            due_date,
        } = fields;

        Self {
            id: TaskId::new(),
            owner,
            title,
            description,
            status,
            due_date,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            title: data.title,
            description: data.description,
            status: data.status,
            due_date: data.due_date,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning identity.
    #[must_use]
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns `true` when `requester` owns this task.
    #[must_use]
    pub fn is_owned_by(&self, requester: &OwnerId) -> bool {
        self.owner == *requester
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the board status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial change-set.
    ///
    /// The changes are merged over the current values and the merged record
    /// goes through [`TaskCandidate::validate`], the same check a create
    /// runs. The task is left untouched when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the merged record is invalid.
    pub fn apply_changes(
        &mut self,
        changes: TaskChanges,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let current = self.to_candidate();
        let status = match changes.status {
            Some(None) => return Err(TaskDomainError::InvalidStatus("null".to_owned())),
            Some(replacement) => replacement,
            None => current.status,
        };
        let merged = TaskCandidate {
            title: changes.title.unwrap_or(current.title),
            description: changes.description.unwrap_or(current.description),
            status,
            due_date: changes.due_date.unwrap_or(current.due_date),
        };
        let fields = merged.validate()?;

        self.title = fields.title;
        self.description = fields.description;
        self.status = fields.status;
        self.due_date = fields.due_date;
        self.touch(clock);
        Ok(())
    }

    fn to_candidate(&self) -> TaskCandidate {
        TaskCandidate {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            status: Some(self.status.as_str().to_owned()),
            due_date: self
                .due_date
                .map(|date| date.format(DUE_DATE_FORMAT).to_string()),
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
