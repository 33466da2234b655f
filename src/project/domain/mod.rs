//! Domain model for project lifecycle management.
//!
//! The project domain models project identity, descriptive details, the
//! `open` to `completed` status machine, soft deletion, and the ownership
//! access policy. Persistence, identity resolution, and task accounting stay
//! outside this boundary.

mod access;
mod error;
mod ids;
mod project;
mod view;

pub use access::{AccessDecision, AccessDenial, CallerRoles, Role, check_access};
pub use error::{ParseProjectStatusError, ParseRoleError, ProjectDomainError};
pub use ids::{ProjectCode, ProjectId};
pub use project::{NewProject, PersistedProjectData, Project, ProjectDetails, ProjectStatus};
pub use view::{ProjectView, TaskCounts};
