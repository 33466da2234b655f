//! In-memory adapters for project lifecycle tests and local runs.

mod project;
mod task_service;

pub use project::InMemoryProjectRepository;
pub use task_service::{InMemoryTaskService, TaskOperation};
