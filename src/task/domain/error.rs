//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while validating task records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The candidate record carries no title at all.
    #[error("task title is required")]
    MissingTitle,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The status is not a member of the closed status enumeration.
    #[error("invalid task status '{0}', expected one of pending, in-progress, completed")]
    InvalidStatus(String),

    /// The due date is not a calendar date.
    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),

    /// The owner identity is empty after trimming.
    #[error("task owner must not be empty")]
    EmptyOwner,
}

/// Error returned while parsing task statuses from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

impl From<ParseTaskStatusError> for TaskDomainError {
    fn from(err: ParseTaskStatusError) -> Self {
        Self::InvalidStatus(err.0)
    }
}
