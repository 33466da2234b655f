//! Port contracts for project lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by the project
//! service: the project store, the caller identity oracle, and the remote
//! task service.

mod identity;
mod repository;
mod task_service;

pub use identity::{IdentityError, IdentityOracle, IdentityResult};
pub use repository::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult};
pub use task_service::{
    TaskServiceClient, TaskServiceError, TaskServiceResponse, TaskServiceResult,
};
