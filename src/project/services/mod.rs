//! Application services for project lifecycle orchestration.

mod lifecycle;
mod requests;

pub use lifecycle::{ProjectService, ProjectServiceError, ProjectServiceResult};
pub use requests::{CreateProjectRequest, UpdateProjectRequest};
