//! Board view-model.
//!
//! The controller holds the only client-side copy of the user's tasks. Every
//! successful mutation is followed by a full refetch; the list is never
//! patched locally. When several refetches are in flight the one that
//! resolves last replaces the list, whatever order they were sent in.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;

use super::client::{TaskApi, TaskApiError};
use super::drag::{DragEffect, DragEvent, DragInterpreter, DragState, StatusIntent};
use crate::task::domain::{Task, TaskCandidate, TaskChanges, TaskId, TaskStatus};

/// User action that can fail visibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    /// Fetching the list.
    Load,
    /// Creating a task.
    Create,
    /// Editing a task.
    Update,
    /// Deleting a task.
    Delete,
    /// Moving a task between columns.
    ChangeStatus,
}

impl BoardAction {
    /// Returns the message shown to the user when the action fails.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Load => "Failed to load tasks",
            Self::Create => "Failed to create task",
            Self::Update => "Failed to update task",
            Self::Delete => "Failed to delete task",
            Self::ChangeStatus => "Failed to update task status",
        }
    }
}

/// A failed board action.
#[derive(Debug, Error)]
#[error("{}", .action.message())]
pub struct BoardError {
    /// The action that failed.
    pub action: BoardAction,
    /// The underlying API failure.
    #[source]
    pub source: TaskApiError,
}

/// Result type for board actions.
pub type BoardResult<T> = Result<T, BoardError>;

/// One rendered column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    /// Status collected by the column.
    pub status: TaskStatus,
    /// Column heading.
    pub title: &'static str,
    /// Tasks in board list order.
    pub tasks: Vec<Task>,
}

impl BoardColumn {
    /// Number of cards in the column.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }
}

/// Tasks of `tasks` whose status is `status`, in list order.
#[must_use]
pub fn column_tasks(tasks: &[Task], status: TaskStatus) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.status() == status)
        .cloned()
        .collect()
}

/// All columns in board order.
#[must_use]
pub fn columns(tasks: &[Task]) -> Vec<BoardColumn> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| BoardColumn {
            status,
            title: status.title(),
            tasks: column_tasks(tasks, status),
        })
        .collect()
}

#[derive(Debug, Default)]
struct BoardView {
    tasks: Vec<Task>,
    error: Option<String>,
    loading: bool,
}

/// Client-side board state.
pub struct BoardController<A: TaskApi> {
    api: Arc<A>,
    view: RwLock<BoardView>,
    drag: Mutex<DragInterpreter>,
}

impl<A: TaskApi> BoardController<A> {
    /// Creates an empty board backed by `api`.
    #[must_use]
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            view: RwLock::new(BoardView::default()),
            drag: Mutex::new(DragInterpreter::new()),
        }
    }

    /// Performs the initial load, raising the loading flag while it runs.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the list cannot be fetched.
    pub async fn mount(&self) -> BoardResult<()> {
        self.write_view().loading = true;
        let result = self.load().await;
        self.write_view().loading = false;
        result
    }

    /// Replaces the list with a fresh fetch from the server.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] and keeps the previous list when the fetch
    /// fails.
    pub async fn load(&self) -> BoardResult<()> {
        let tasks = self
            .api
            .list(None)
            .await
            .map_err(|err| self.fail(BoardAction::Load, err))?;

        let mut view = self.write_view();
        tracing::debug!(count = tasks.len(), "board list refreshed");
        view.tasks = tasks;
        view.error = None;
        Ok(())
    }

    /// Creates a task, then refetches.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the create or the refetch fails.
    pub async fn create(&self, candidate: TaskCandidate) -> BoardResult<()> {
        self.api
            .create(&candidate)
            .await
            .map_err(|err| self.fail(BoardAction::Create, err))?;
        self.load().await
    }

    /// Edits a task, then refetches.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the update or the refetch fails.
    pub async fn update(&self, id: TaskId, changes: TaskChanges) -> BoardResult<()> {
        self.api
            .update(id, &changes)
            .await
            .map_err(|err| self.fail(BoardAction::Update, err))?;
        self.load().await
    }

    /// Deletes a task, then refetches.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the delete or the refetch fails.
    pub async fn delete(&self, id: TaskId) -> BoardResult<()> {
        self.api
            .delete(id)
            .await
            .map_err(|err| self.fail(BoardAction::Delete, err))?;
        self.load().await
    }

    /// Sends a status-only update for `intent`, then refetches.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the update or the refetch fails.
    pub async fn change_status(&self, intent: StatusIntent) -> BoardResult<()> {
        self.api
            .update(intent.task_id, &TaskChanges::status(intent.status))
            .await
            .map_err(|err| self.fail(BoardAction::ChangeStatus, err))?;
        self.load().await
    }

    /// Feeds a drag event through the interpreter and dispatches any
    /// resulting intent.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when a dispatched status change fails.
    pub async fn drag(&self, event: DragEvent) -> BoardResult<DragEffect> {
        let effect = {
            let view = self.read_view();
            let mut interpreter = self.drag.lock().unwrap_or_else(PoisonError::into_inner);
            interpreter.handle(event, &view.tasks)
        };
        if let DragEffect::Intent(intent) = effect {
            self.change_status(intent).await?;
        }
        Ok(effect)
    }

    /// Snapshot of the board list.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.read_view().tasks.clone()
    }

    /// Tasks currently in the `status` column.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Vec<Task> {
        column_tasks(&self.read_view().tasks, status)
    }

    /// All columns in board order.
    #[must_use]
    pub fn columns(&self) -> Vec<BoardColumn> {
        columns(&self.read_view().tasks)
    }

    /// The message of the most recent failure, until the next good load.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.read_view().error.clone()
    }

    /// `true` while the initial load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_view().loading
    }

    /// Current drag state.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Detached copy of the card being dragged.
    #[must_use]
    pub fn drag_overlay(&self) -> Option<Task> {
        let view = self.read_view();
        self.drag
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .overlay(&view.tasks)
    }

    fn fail(&self, action: BoardAction, source: TaskApiError) -> BoardError {
        tracing::warn!(?action, error = %source, "board action failed");
        self.write_view().error = Some(action.message().to_owned());
        BoardError { action, source }
    }

    fn read_view(&self) -> std::sync::RwLockReadGuard<'_, BoardView> {
        self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_view(&self) -> std::sync::RwLockWriteGuard<'_, BoardView> {
        self.view.write().unwrap_or_else(PoisonError::into_inner)
    }
}
