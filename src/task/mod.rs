//! Owner-scoped board task management.
//!
//! This module holds the server side of the status transition pipeline:
//! the canonical task record, the validation shared by create and update,
//! and the access service that checks ownership before every read and
//! write. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
