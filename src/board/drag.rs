//! Drag-gesture interpretation.
//!
//! The interpreter turns pick-up, hover, release and cancel events into at
//! most one status-change intent per hover. An intent is emitted as soon as
//! the dragged card hovers a column whose status differs from the card's
//! status in the current list, so one drag that crosses two columns emits
//! two intents. Releasing the card emits nothing further.

use crate::task::domain::{Task, TaskId, TaskStatus};

/// Something a dragged card can hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A column, identified by the status it collects.
    Column(TaskStatus),
    /// Another card. Cards never trigger a status change.
    Card(TaskId),
}

/// Raw pointer events fed to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    /// A card was picked up.
    PickUp(TaskId),
    /// The dragged card moved over `Some(target)`, or off every target.
    Hover(Option<DropTarget>),
    /// The card was dropped.
    Release,
    /// The gesture was aborted.
    Cancel,
}

/// Interpreter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A card is being dragged.
    Dragging {
        /// The dragged task.
        task_id: TaskId,
        /// The target currently hovered, if any.
        over: Option<DropTarget>,
    },
}

/// Request to move a task to another column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIntent {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination status.
    pub status: TaskStatus,
}

/// Summary of a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    /// The task that was dragged.
    pub task_id: TaskId,
    /// The target hovered when the gesture ended.
    pub over: Option<DropTarget>,
    /// `true` when the gesture was cancelled rather than released.
    pub cancelled: bool,
}

/// What the interpreter did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    /// The event did not apply in the current state.
    Ignored,
    /// A gesture started.
    Started(TaskId),
    /// The hover target changed without a status change.
    Moved,
    /// The hover requires a status change.
    Intent(StatusIntent),
    /// The gesture finished.
    Ended(DragEnd),
}

/// Drag state machine for one board.
#[derive(Debug, Clone, Default)]
pub struct DragInterpreter {
    state: DragState,
}

impl DragInterpreter {
    /// Creates an idle interpreter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    /// Returns the dragged task id, if a gesture is in progress.
    #[must_use]
    pub const fn active_task(&self) -> Option<TaskId> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { task_id, .. } => Some(task_id),
        }
    }

    /// Feeds one event; `tasks` is the board's current list.
    pub fn handle(&mut self, event: DragEvent, tasks: &[Task]) -> DragEffect {
        match event {
            DragEvent::PickUp(task_id) => self.pick_up(task_id, tasks),
            DragEvent::Hover(target) => self.hover(target, tasks),
            DragEvent::Release => self.finish(false),
            DragEvent::Cancel => self.finish(true),
        }
    }

    /// Returns a detached copy of the dragged task for rendering under the
    /// pointer.
    #[must_use]
    pub fn overlay(&self, tasks: &[Task]) -> Option<Task> {
        let task_id = self.active_task()?;
        find(tasks, task_id).cloned()
    }

    fn pick_up(&mut self, task_id: TaskId, tasks: &[Task]) -> DragEffect {
        if self.state != DragState::Idle || find(tasks, task_id).is_none() {
            return DragEffect::Ignored;
        }
        self.state = DragState::Dragging {
            task_id,
            over: None,
        };
        DragEffect::Started(task_id)
    }

    fn hover(&mut self, target: Option<DropTarget>, tasks: &[Task]) -> DragEffect {
        let DragState::Dragging { task_id, .. } = self.state else {
            return DragEffect::Ignored;
        };
        self.state = DragState::Dragging {
            task_id,
            over: target,
        };

        let Some(DropTarget::Column(status)) = target else {
            return DragEffect::Moved;
        };
        match find(tasks, task_id) {
            Some(task) if task.status() != status => {
                tracing::debug!(%task_id, %status, "drag crossed into another column");
                DragEffect::Intent(StatusIntent { task_id, status })
            }
            _ => DragEffect::Moved,
        }
    }

    fn finish(&mut self, cancelled: bool) -> DragEffect {
        let DragState::Dragging { task_id, over } = std::mem::take(&mut self.state) else {
            return DragEffect::Ignored;
        };
        DragEffect::Ended(DragEnd {
            task_id,
            over,
            cancelled,
        })
    }
}

fn find(tasks: &[Task], task_id: TaskId) -> Option<&Task> {
    tasks.iter().find(|task| task.id() == task_id)
}
