//! Service layer enforcing that a task is only read, changed, or removed by
//! its owner.

use crate::task::{
    domain::{
        OwnerId, Task, TaskCandidate, TaskChanges, TaskDomainError, TaskId, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for task access operations.
#[derive(Debug, Error)]
pub enum TaskAccessError {
    /// A field is malformed or outside the status enumeration.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),
    /// No task with the identifier exists.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// The task exists but belongs to another owner.
    #[error("not authorized to access task {0}")]
    Unauthorized(TaskId),
    /// Storage failed; not the caller's fault.
    #[error(transparent)]
    Transient(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskAccessError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            // A record removed between load and write reads as absent.
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            other => Self::Transient(other),
        }
    }
}

/// Result type for task access service operations.
pub type TaskAccessResult<T> = Result<T, TaskAccessError>;

/// Status narrowing requested by a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status.
    #[default]
    Any,
    /// Exactly one status.
    Only(TaskStatus),
    /// A value outside the enumeration. No stored task can match it.
    Unmatched(String),
}

impl StatusFilter {
    /// Interprets a raw `status` query value. Absent and blank values mean
    /// no filter.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Any,
            Some(raw) => TaskStatus::try_from(raw)
                .map_or_else(|_| Self::Unmatched(raw.to_owned()), Self::Only),
        }
    }
}

/// Write applied to a task after its ownership has been confirmed.
enum OwnedMutation {
    Apply(TaskChanges),
    Delete,
}

/// Owner-scoped task access service.
#[derive(Clone)]
pub struct TaskAccessService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskAccessService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task access service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a task owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskAccessError::Validation`] when the candidate is invalid
    /// and [`TaskAccessError::Transient`] when storage fails.
    pub async fn create(
        &self,
        owner: &OwnerId,
        candidate: TaskCandidate,
    ) -> TaskAccessResult<Task> {
        let fields = candidate.validate()?;
        let task = Task::new(owner.clone(), fields, &*self.clock);
        self.repository.store(&task).await?;
        tracing::info!(
            task_id = %task.id(),
            owner = %owner,
            status = %task.status(),
            "task created"
        );
        Ok(task)
    }

    /// Lists the tasks owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskAccessError::Transient`] when storage fails.
    pub async fn list(
        &self,
        owner: &OwnerId,
        filter: &StatusFilter,
    ) -> TaskAccessResult<Vec<Task>> {
        let status = match filter {
            StatusFilter::Any => None,
            StatusFilter::Only(status) => Some(*status),
            StatusFilter::Unmatched(raw) => {
                tracing::debug!(owner = %owner, filter = %raw, "status filter matches nothing");
                return Ok(Vec::new());
            }
        };
        Ok(self.repository.list_for_owner(owner, status).await?)
    }

    /// Returns one task owned by `owner`.
    ///
    /// Existence is checked before ownership, so a non-owner can tell an
    /// existing id (`Unauthorized`) from a missing one (`NotFound`).
    ///
    /// # Errors
    ///
    /// Returns [`TaskAccessError::NotFound`], [`TaskAccessError::Unauthorized`],
    /// or [`TaskAccessError::Transient`].
    pub async fn get(&self, owner: &OwnerId, id: TaskId) -> TaskAccessResult<Task> {
        self.load_owned(owner, id).await
    }

    /// Applies a partial change-set to a task owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskAccessError::NotFound`] or [`TaskAccessError::Unauthorized`]
    /// before any validation, then [`TaskAccessError::Validation`] when the
    /// merged record is invalid.
    pub async fn update(
        &self,
        owner: &OwnerId,
        id: TaskId,
        changes: TaskChanges,
    ) -> TaskAccessResult<Task> {
        let updated = self
            .mutate_owned(owner, id, OwnedMutation::Apply(changes))
            .await?;
        updated.ok_or(TaskAccessError::NotFound(id))
    }

    /// Permanently removes a task owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskAccessError::NotFound`] when the task does not exist,
    /// including when it was already deleted.
    pub async fn delete(&self, owner: &OwnerId, id: TaskId) -> TaskAccessResult<()> {
        self.mutate_owned(owner, id, OwnedMutation::Delete).await?;
        Ok(())
    }

    /// Loads a task and confirms `owner` owns it, then performs `mutation`.
    ///
    /// Every write goes through here. No lock spans the load and the write,
    /// so concurrent writers are last-write-wins.
    async fn mutate_owned(
        &self,
        owner: &OwnerId,
        id: TaskId,
        mutation: OwnedMutation,
    ) -> TaskAccessResult<Option<Task>> {
        let mut task = self.load_owned(owner, id).await?;
        match mutation {
            OwnedMutation::Apply(changes) => {
                let previous_status = task.status();
                task.apply_changes(changes, &*self.clock)?;
                self.repository.update(&task).await?;
                tracing::info!(
                    task_id = %id,
                    from = %previous_status,
                    to = %task.status(),
                    "task updated"
                );
                Ok(Some(task))
            }
            OwnedMutation::Delete => {
                self.repository.delete(id).await?;
                tracing::info!(task_id = %id, "task deleted");
                Ok(None)
            }
        }
    }

    async fn load_owned(&self, owner: &OwnerId, id: TaskId) -> TaskAccessResult<Task> {
        let task = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TaskAccessError::NotFound(id))?;
        if !task.is_owned_by(owner) {
            tracing::warn!(task_id = %id, requester = %owner, "rejected access by non-owner");
            return Err(TaskAccessError::Unauthorized(id));
        }
        Ok(task)
    }
}
