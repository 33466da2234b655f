//! Project records and their lifecycle for projecthub.
//!
//! This module owns project creation, ownership-gated reads and updates,
//! completion, and soft deletion. Completion and deletion are mirrored to the
//! remote task service so that project tasks follow their project. The module
//! follows hexagonal architecture:
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
