//! Port and HTTP adapter the board uses to reach the task server.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::types::{
    CreateTaskBody, DataEnvelope, MessageEnvelope, TaskListEnvelope, UpdateTaskBody,
};
use crate::config::ClientConfig;
use crate::task::domain::{Task, TaskCandidate, TaskChanges, TaskId, TaskStatus};

/// Errors returned by [`TaskApi`] implementations.
///
/// The first three variants mirror the server's error taxonomy; anything
/// else is transient.
#[derive(Debug, Error)]
pub enum TaskApiError {
    /// The server rejected a field value.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The task does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The requester may not touch the task, or has no valid identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The server failed with an unexpected status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, if any.
        message: String,
    },
    /// The request never produced a response: connection failure, timeout,
    /// or an undecodable body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The configured base URL cannot address task routes.
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

impl TaskApiError {
    /// Returns `true` when the failure is not the caller's fault.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Transport(_))
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::Validation(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

/// Result type for task API calls.
pub type TaskApiResult<T> = Result<T, TaskApiError>;

/// Task operations available to the board, always on behalf of the
/// signed-in user.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetches the user's tasks, newest first, optionally by status.
    async fn list(&self, status: Option<TaskStatus>) -> TaskApiResult<Vec<Task>>;

    /// Creates a task.
    async fn create(&self, candidate: &TaskCandidate) -> TaskApiResult<Task>;

    /// Applies a partial update.
    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskApiResult<Task>;

    /// Deletes a task.
    async fn delete(&self, id: TaskId) -> TaskApiResult<()>;
}

/// [`TaskApi`] over the REST surface in [`crate::api`].
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    tasks_url: Url,
    token: String,
}

impl HttpTaskApi {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskApiError::Transport`] when the HTTP client cannot be
    /// built and [`TaskApiError::InvalidUrl`] when the base URL cannot be
    /// joined with the task path.
    pub fn new(config: &ClientConfig) -> TaskApiResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let tasks_url = config
            .base_url
            .join("api/tasks")
            .map_err(|err| TaskApiError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            client,
            tasks_url,
            token: config.token.clone(),
        })
    }

    fn task_url(&self, id: TaskId) -> TaskApiResult<Url> {
        let mut url = self.tasks_url.clone();
        url.path_segments_mut()
            .map_err(|()| TaskApiError::InvalidUrl(self.tasks_url.to_string()))?
            .push(&id.to_string());
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> TaskApiResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<MessageEnvelope>()
        .await
        .map(|envelope| envelope.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_owned());
    tracing::debug!(status = status.as_u16(), %message, "task request rejected");
    Err(TaskApiError::from_status(status, message))
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self, status: Option<TaskStatus>) -> TaskApiResult<Vec<Task>> {
        let mut request = self
            .client
            .get(self.tasks_url.clone())
            .bearer_auth(&self.token);
        if let Some(wanted) = status {
            request = request.query(&[("status", wanted.as_str())]);
        }
        let envelope: TaskListEnvelope = decode(request.send().await?).await?;
        Ok(envelope.data)
    }

    async fn create(&self, candidate: &TaskCandidate) -> TaskApiResult<Task> {
        let response = self
            .client
            .post(self.tasks_url.clone())
            .bearer_auth(&self.token)
            .json(&CreateTaskBody::from(candidate))
            .send()
            .await?;
        let envelope: DataEnvelope<Task> = decode(response).await?;
        Ok(envelope.data)
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskApiResult<Task> {
        let response = self
            .client
            .put(self.task_url(id)?)
            .bearer_auth(&self.token)
            .json(&UpdateTaskBody::from(changes))
            .send()
            .await?;
        let envelope: DataEnvelope<Task> = decode(response).await?;
        Ok(envelope.data)
    }

    async fn delete(&self, id: TaskId) -> TaskApiResult<()> {
        let response = self
            .client
            .delete(self.task_url(id)?)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let _: MessageEnvelope = decode(response).await?;
        Ok(())
    }
}
