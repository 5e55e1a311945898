//! Domain model for board tasks.
//!
//! The task domain owns the canonical record shape and the validation rules
//! shared by create and update. All infrastructure concerns stay outside the
//! domain boundary.

mod error;
mod ids;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{OwnerId, TaskId};
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Task, TaskCandidate, TaskChanges, TaskFields};
