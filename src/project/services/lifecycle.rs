//! Service layer for project lifecycle orchestration.

use super::{CreateProjectRequest, UpdateProjectRequest};
use crate::project::{
    domain::{
        AccessDecision, CallerRoles, NewProject, Project, ProjectCode, ProjectDomainError,
        ProjectView, Role, TaskCounts, check_access,
    },
    ports::{
        IdentityError, IdentityOracle, ProjectRepository, ProjectRepositoryError,
        TaskServiceClient, TaskServiceResponse, TaskServiceResult,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for project lifecycle operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// A live project already uses the requested code.
    #[error("project code already exists: {0}")]
    AlreadyExists(ProjectCode),
    /// No live project has the requested code.
    #[error("project not found: {0}")]
    NotFound(ProjectCode),
    /// The caller may not act on the project.
    #[error("user {username} may not access project {code}")]
    AccessDenied {
        /// Caller username.
        username: String,
        /// Project the caller tried to reach.
        code: ProjectCode,
    },
    /// The project is already completed.
    #[error("project is already completed: {0}")]
    AlreadyCompleted(ProjectCode),
    /// Task counts could not be fetched for the project.
    #[error("task details could not be retrieved for project {0}")]
    DetailsNotRetrieved(ProjectCode),
    /// The task service did not complete the project's tasks.
    #[error("related tasks were not completed for project {0}")]
    RelatedTasksNotCompleted(ProjectCode),
    /// The task service did not delete the project's tasks.
    #[error("related tasks were not deleted for project {0}")]
    RelatedTasksNotDeleted(ProjectCode),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
    /// The caller's identity could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl ProjectServiceError {
    /// Returns the HTTP-style status code a transport layer should report.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AlreadyExists(_) | Self::AlreadyCompleted(_) => 409,
            Self::NotFound(_) => 404,
            Self::AccessDenied { .. } => 403,
            Self::DetailsNotRetrieved(_)
            | Self::RelatedTasksNotCompleted(_)
            | Self::RelatedTasksNotDeleted(_) => 502,
            Self::Domain(_) => 400,
            Self::Identity(_) => 401,
            Self::Repository(_) => 500,
        }
    }
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project lifecycle orchestration service.
///
/// Operations that act on a single project take the caller's identity and
/// enforce the ownership policy before touching the store or the task
/// service. Listing operations do not check roles; the transport decides who
/// may call them.
#[derive(Clone)]
pub struct ProjectService<R, T, C>
where
    R: ProjectRepository,
    T: TaskServiceClient,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    tasks: Arc<T>,
    clock: Arc<C>,
}

impl<R, T, C> ProjectService<R, T, C>
where
    R: ProjectRepository,
    T: TaskServiceClient,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(repository: Arc<R>, tasks: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            repository,
            tasks,
            clock,
        }
    }

    /// Creates a project managed by the caller.
    ///
    /// The project starts open with no task counts.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::AlreadyExists`] when a live project has
    /// the same code, and domain, identity or repository errors otherwise.
    pub async fn create<I>(
        &self,
        caller: &I,
        request: CreateProjectRequest,
    ) -> ProjectServiceResult<ProjectView>
    where
        I: IdentityOracle + ?Sized,
    {
        let code = ProjectCode::new(request.code.as_str())?;
        let details = request.to_details()?;
        let manager = caller.current_username().await?;

        if self.repository.find_by_code(&code).await?.is_some() {
            return Err(ProjectServiceError::AlreadyExists(code));
        }

        let new_project = NewProject::new(code, details, manager, &*self.clock)?;
        let project = match self.repository.insert(&new_project).await {
            Ok(project) => project,
            Err(ProjectRepositoryError::DuplicateCode(duplicate)) => {
                return Err(ProjectServiceError::AlreadyExists(duplicate));
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            project_id = %project.id(),
            project_code = %project.code(),
            manager = project.assigned_manager(),
            "project created"
        );
        Ok(ProjectView::from(&project))
    }

    /// Reads a project the caller may access.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] or
    /// [`ProjectServiceError::AccessDenied`].
    pub async fn read_by_code<I>(&self, caller: &I, code: &str) -> ProjectServiceResult<ProjectView>
    where
        I: IdentityOracle + ?Sized,
    {
        let project = self.find_project_or_error(code).await?;
        ensure_access(caller, &project).await?;
        Ok(ProjectView::from(&project))
    }

    /// Returns the assigned manager of a project the caller may access.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] or
    /// [`ProjectServiceError::AccessDenied`].
    pub async fn read_manager_by_code<I>(
        &self,
        caller: &I,
        code: &str,
    ) -> ProjectServiceResult<String>
    where
        I: IdentityOracle + ?Sized,
    {
        let project = self.find_project_or_error(code).await?;
        ensure_access(caller, &project).await?;
        Ok(project.assigned_manager().to_owned())
    }

    /// Lists every live project, without task counts.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn admin_read_all(&self) -> ProjectServiceResult<Vec<ProjectView>> {
        let projects = self.repository.find_all().await?;
        debug!(count = projects.len(), "listed all projects");
        Ok(projects.iter().map(ProjectView::from).collect())
    }

    /// Lists the caller's projects, without task counts.
    ///
    /// # Errors
    ///
    /// Returns identity or repository errors.
    pub async fn manager_read_all<I>(&self, caller: &I) -> ProjectServiceResult<Vec<ProjectView>>
    where
        I: IdentityOracle + ?Sized,
    {
        let manager = caller.current_username().await?;
        let projects = self.repository.find_all_by_manager(&manager).await?;
        debug!(%manager, count = projects.len(), "listed manager projects");
        Ok(projects.iter().map(ProjectView::from).collect())
    }

    /// Lists the caller's projects with task counts from the task service.
    ///
    /// The whole call fails on the first project whose counts cannot be
    /// fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::DetailsNotRetrieved`] naming the first
    /// project without counts, or identity and repository errors.
    pub async fn read_all_with_details<I>(
        &self,
        caller: &I,
    ) -> ProjectServiceResult<Vec<ProjectView>>
    where
        I: IdentityOracle + ?Sized,
    {
        let manager = caller.current_username().await?;
        let projects = self.repository.find_all_by_manager(&manager).await?;

        let mut views = Vec::with_capacity(projects.len());
        for project in &projects {
            let counts = self.retrieve_task_counts(caller, project.code()).await?;
            views.push(ProjectView::from(project).with_task_counts(counts));
        }
        Ok(views)
    }

    /// Counts the manager's live projects that are not completed.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn count_non_completed(&self, manager: &str) -> ProjectServiceResult<u64> {
        Ok(self
            .repository
            .count_non_completed_by_manager(manager)
            .await?)
    }

    /// Checks that a project exists, is still open, and is reachable by the
    /// caller.
    ///
    /// Completion is checked before ownership.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`],
    /// [`ProjectServiceError::AlreadyCompleted`] or
    /// [`ProjectServiceError::AccessDenied`].
    pub async fn check_by_code<I>(&self, caller: &I, code: &str) -> ProjectServiceResult<bool>
    where
        I: IdentityOracle + ?Sized,
    {
        let project = self.find_project_or_error(code).await?;
        if project.is_completed() {
            return Err(ProjectServiceError::AlreadyCompleted(project.code().clone()));
        }
        ensure_access(caller, &project).await?;
        Ok(true)
    }

    /// Replaces the descriptive fields of a project.
    ///
    /// Code, assigned manager and status are kept from the stored project
    /// whatever the request carries.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`],
    /// [`ProjectServiceError::AccessDenied`], or domain and repository errors.
    pub async fn update<I>(
        &self,
        caller: &I,
        code: &str,
        request: UpdateProjectRequest,
    ) -> ProjectServiceResult<ProjectView>
    where
        I: IdentityOracle + ?Sized,
    {
        let stored = self.find_project_or_error(code).await?;
        ensure_access(caller, &stored).await?;

        let details = request.to_details()?;
        let merged = stored.merged_with(details, &*self.clock);
        self.repository.update(&merged).await?;

        info!(project_code = %merged.code(), "project updated");
        Ok(ProjectView::from(&merged))
    }

    /// Completes a project and asks the task service to complete its tasks.
    ///
    /// The status change is stored before the task service is called and is
    /// kept when that call fails.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::RelatedTasksNotCompleted`] when the task
    /// service does not confirm, or lookup, access and repository errors.
    pub async fn complete<I>(&self, caller: &I, code: &str) -> ProjectServiceResult<ProjectView>
    where
        I: IdentityOracle + ?Sized,
    {
        let mut project = self.find_project_or_error(code).await?;
        ensure_access(caller, &project).await?;

        let token = caller.current_access_token().await?;
        project.complete(&*self.clock)?;
        self.repository.update(&project).await?;

        let outcome = self.tasks.complete_by_project(&token, project.code()).await;
        if confirmed("complete", project.code(), outcome).is_none() {
            return Err(ProjectServiceError::RelatedTasksNotCompleted(
                project.code().clone(),
            ));
        }

        info!(project_code = %project.code(), "project completed");
        Ok(ProjectView::from(&project))
    }

    /// Soft-deletes a project after the task service deletes its tasks.
    ///
    /// The stored code is renamed to `<code>-<id>` so the original code can
    /// be reused. Nothing is written when the task service does not confirm.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::RelatedTasksNotDeleted`] when the task
    /// service does not confirm, or lookup, access and repository errors.
    pub async fn delete<I>(&self, caller: &I, code: &str) -> ProjectServiceResult<()>
    where
        I: IdentityOracle + ?Sized,
    {
        let mut project = self.find_project_or_error(code).await?;
        ensure_access(caller, &project).await?;

        let original_code = project.code().clone();
        let token = caller.current_access_token().await?;
        let outcome = self.tasks.delete_by_project(&token, &original_code).await;
        if confirmed("delete", &original_code, outcome).is_none() {
            return Err(ProjectServiceError::RelatedTasksNotDeleted(original_code));
        }

        project.mark_deleted(&*self.clock);
        self.repository.update(&project).await?;

        info!(
            project_code = %original_code,
            retired_code = %project.code(),
            "project deleted"
        );
        Ok(())
    }

    async fn find_project_or_error(&self, code: &str) -> ProjectServiceResult<Project> {
        let project_code = ProjectCode::new(code)?;
        debug!(project_code = %project_code, "looking up project");
        let project = self.repository.find_by_code(&project_code).await?;
        project.ok_or(ProjectServiceError::NotFound(project_code))
    }

    async fn retrieve_task_counts<I>(
        &self,
        caller: &I,
        code: &ProjectCode,
    ) -> ProjectServiceResult<TaskCounts>
    where
        I: IdentityOracle + ?Sized,
    {
        let token = caller.current_access_token().await?;
        let outcome = self.tasks.get_counts_by_project(&token, code).await;
        let counts = confirmed("count", code, outcome)
            .and_then(|response| TaskCounts::from_payload(&response.data));
        counts.ok_or_else(|| {
            warn!(project_code = %code, "task counts missing from task service response");
            ProjectServiceError::DetailsNotRetrieved(code.clone())
        })
    }
}

async fn ensure_access<I>(caller: &I, project: &Project) -> ProjectServiceResult<()>
where
    I: IdentityOracle + ?Sized,
{
    let username = caller.current_username().await?;
    let roles = CallerRoles {
        is_manager: caller.has_role(&username, Role::Manager).await?,
        is_employee: caller.has_role(&username, Role::Employee).await?,
    };

    match check_access(&username, roles, project.assigned_manager()) {
        AccessDecision::Allowed => Ok(()),
        AccessDecision::Denied(reason) => {
            warn!(
                %username,
                project_code = %project.code(),
                ?reason,
                "project access denied"
            );
            Err(ProjectServiceError::AccessDenied {
                username,
                code: project.code().clone(),
            })
        }
    }
}

/// Returns the response when the task service confirmed the call.
fn confirmed(
    operation: &'static str,
    code: &ProjectCode,
    outcome: TaskServiceResult<TaskServiceResponse>,
) -> Option<TaskServiceResponse> {
    match outcome {
        Ok(response) if response.success => Some(response),
        Ok(response) => {
            warn!(
                operation,
                project_code = %code,
                message = response.message.as_deref().unwrap_or_default(),
                "task service reported failure"
            );
            None
        }
        Err(err) => {
            warn!(operation, project_code = %code, error = %err, "task service call failed");
            None
        }
    }
}
