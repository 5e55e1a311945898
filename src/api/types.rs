//! JSON request and response bodies shared by the server routes and the
//! board's HTTP client.

use crate::task::domain::{Task, TaskCandidate, TaskChanges};
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/tasks`.
///
/// Every field is optional on the wire so that a missing title surfaces as a
/// validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskBody {
    /// Task title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Task description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw status text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Raw `YYYY-MM-DD` due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl From<CreateTaskBody> for TaskCandidate {
    fn from(body: CreateTaskBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.status,
            due_date: body.due_date,
        }
    }
}

impl From<&TaskCandidate> for CreateTaskBody {
    fn from(candidate: &TaskCandidate) -> Self {
        Self {
            title: candidate.title.clone(),
            description: candidate.description.clone(),
            status: candidate.status.clone(),
            due_date: candidate.due_date.clone(),
        }
    }
}

/// Body of `PUT /api/tasks/:id`.
///
/// An absent key leaves the field untouched; an explicit `null` is kept
/// apart from absence so nullable fields can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskBody {
    /// Replacement title.
    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    /// Replacement or cleared description.
    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    /// Replacement status.
    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<String>>,
    /// Replacement or cleared due date.
    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
}

/// Marks a key that was present in the JSON object, even when `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskBody> for TaskChanges {
    fn from(body: UpdateTaskBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.status,
            due_date: body.due_date,
        }
    }
}

impl From<&TaskChanges> for UpdateTaskBody {
    fn from(changes: &TaskChanges) -> Self {
        Self {
            title: changes.title.clone(),
            description: changes.description.clone(),
            status: changes.status.clone(),
            due_date: changes.due_date.clone(),
        }
    }
}

/// Query string of `GET /api/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Optional status filter.
    pub status: Option<String>,
}

/// Success envelope carrying one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    /// Always `true` for this envelope.
    pub success: bool,
    /// The record.
    pub data: T,
}

impl<T> DataEnvelope<T> {
    /// Wraps a successful payload.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success envelope for task listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListEnvelope {
    /// Always `true` for this envelope.
    pub success: bool,
    /// Number of tasks in `data`.
    pub count: usize,
    /// Tasks, newest first.
    pub data: Vec<Task>,
}

impl From<Vec<Task>> for TaskListEnvelope {
    fn from(data: Vec<Task>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Envelope carrying only a message: delete acknowledgements and errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}
