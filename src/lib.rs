//! Taskboard: a personal Kanban task tracker.
//!
//! Tasks belong to exactly one user and sit in one of three status columns.
//! The crate covers both ends of a status change: the owner-scoped server
//! that validates and persists it, and the board client that turns drag
//! gestures into requests and keeps its view in step with the server.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, etc.)
//!
//! # Modules
//!
//! - [`task`]: Task model, validation and owner-scoped access
//! - [`api`]: REST surface over the access layer
//! - [`board`]: Client-side board state and drag interpretation
//! - [`config`]: Environment-driven settings

pub mod api;
pub mod board;
pub mod config;
pub mod task;
