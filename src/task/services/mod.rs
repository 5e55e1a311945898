//! Application services for owner-scoped task access.

mod access;

pub use access::{StatusFilter, TaskAccessError, TaskAccessResult, TaskAccessService};
