//! Client-side board: the task list view-model, drag interpretation and the
//! HTTP port used to reach the server.

pub mod client;
pub mod controller;
pub mod drag;

pub use client::{HttpTaskApi, TaskApi, TaskApiError, TaskApiResult};
pub use controller::{BoardAction, BoardColumn, BoardController, BoardError, BoardResult};
pub use drag::{
    DragEffect, DragEnd, DragEvent, DragInterpreter, DragState, DropTarget, StatusIntent,
};

#[cfg(test)]
mod tests;
