//! REST surface for board tasks.
//!
//! - `POST   /api/tasks` creates a task owned by the requester
//! - `GET    /api/tasks?status=` lists the requester's tasks
//! - `GET    /api/tasks/:id` fetches one task
//! - `PUT    /api/tasks/:id` applies a partial update
//! - `DELETE /api/tasks/:id` removes a task
//!
//! Every task route requires an identity attached by [`auth`].

pub mod auth;
pub mod error;
pub mod routes;
pub mod types;

pub use auth::{AuthenticatedUser, Authenticator, StaticTokenAuthenticator};
pub use error::ApiError;
pub use routes::{AppState, router};
