//! Repository port for project persistence and lookup.

use crate::project::domain::{NewProject, Project, ProjectCode, ProjectId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project repository operations.
pub type ProjectRepositoryResult<T> = Result<T, ProjectRepositoryError>;

/// Project persistence contract.
///
/// Every lookup only sees live projects; soft-deleted records stay stored
/// but are invisible to reads and to code uniqueness.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project and assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::DuplicateCode`] when a live project
    /// already uses the code.
    async fn insert(&self, project: &NewProject) -> ProjectRepositoryResult<Project>;

    /// Persists changes to an existing project, including soft deletion.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] when the project does not
    /// exist or [`ProjectRepositoryError::DuplicateCode`] when a changed code
    /// clashes with another live project.
    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Finds a live project by code.
    async fn find_by_code(&self, code: &ProjectCode) -> ProjectRepositoryResult<Option<Project>>;

    /// Returns all live projects ordered by identifier.
    async fn find_all(&self) -> ProjectRepositoryResult<Vec<Project>>;

    /// Returns the live projects assigned to `manager`, ordered by identifier.
    async fn find_all_by_manager(&self, manager: &str) -> ProjectRepositoryResult<Vec<Project>>;

    /// Counts the live projects assigned to `manager` that are not completed.
    async fn count_non_completed_by_manager(&self, manager: &str) -> ProjectRepositoryResult<u64>;
}

/// Errors returned by project repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectRepositoryError {
    /// A live project already uses the code.
    #[error("duplicate project code: {0}")]
    DuplicateCode(ProjectCode),

    /// The project was not found.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted project data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
