//! In-memory repository for project records.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::project::{
    domain::{NewProject, Project, ProjectCode, ProjectId},
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};

/// Thread-safe in-memory project repository.
///
/// Identifiers are assigned from a counter starting at 1. Soft-deleted
/// projects are kept but dropped from the live code index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<InMemoryProjectState>>,
}

#[derive(Debug, Default)]
struct InMemoryProjectState {
    projects: BTreeMap<ProjectId, Project>,
    live_code_index: HashMap<ProjectCode, ProjectId>,
    last_id: i64,
}

impl InMemoryProjectRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a stored project by identifier, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn stored(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        let state = self.state.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.projects.get(&id).cloned())
    }
}

fn live_projects(state: &InMemoryProjectState) -> impl Iterator<Item = &Project> {
    state
        .projects
        .values()
        .filter(|project| !project.is_deleted())
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn insert(&self, project: &NewProject) -> ProjectRepositoryResult<Project> {
        let mut state = self.state.write().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;

        if state.live_code_index.contains_key(project.code()) {
            return Err(ProjectRepositoryError::DuplicateCode(project.code().clone()));
        }

        state.last_id += 1;
        let saved = project.clone().into_project(ProjectId::new(state.last_id));
        state
            .live_code_index
            .insert(saved.code().clone(), saved.id());
        state.projects.insert(saved.id(), saved.clone());
        Ok(saved)
    }

    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;

        let stored_code = state
            .projects
            .get(&project.id())
            .ok_or(ProjectRepositoryError::NotFound(project.id()))?
            .code()
            .clone();

        if !project.is_deleted()
            && let Some(&indexed_id) = state.live_code_index.get(project.code())
            && indexed_id != project.id()
        {
            return Err(ProjectRepositoryError::DuplicateCode(project.code().clone()));
        }

        if state.live_code_index.get(&stored_code) == Some(&project.id()) {
            state.live_code_index.remove(&stored_code);
        }
        if !project.is_deleted() {
            state
                .live_code_index
                .insert(project.code().clone(), project.id());
        }

        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &ProjectCode) -> ProjectRepositoryResult<Option<Project>> {
        let state = self.state.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let project = state
            .live_code_index
            .get(code)
            .and_then(|id| state.projects.get(id))
            .cloned();
        Ok(project)
    }

    async fn find_all(&self) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self.state.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(live_projects(&state).cloned().collect())
    }

    async fn find_all_by_manager(&self, manager: &str) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self.state.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(live_projects(&state)
            .filter(|project| project.assigned_manager() == manager)
            .cloned()
            .collect())
    }

    async fn count_non_completed_by_manager(&self, manager: &str) -> ProjectRepositoryResult<u64> {
        let state = self.state.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let count = live_projects(&state)
            .filter(|project| project.assigned_manager() == manager && !project.is_completed())
            .count();
        u64::try_from(count).map_err(ProjectRepositoryError::persistence)
    }
}
