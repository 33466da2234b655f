//! Project aggregate root and its status lifecycle.

use super::{ParseProjectStatusError, ProjectCode, ProjectDomainError, ProjectId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a project name, matching its storage column.
const MAX_PROJECT_NAME_LENGTH: usize = 255;
/// Maximum length of an assigned manager username, matching its storage column.
const MAX_ASSIGNED_MANAGER_LENGTH: usize = 255;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Project is accepting work.
    Open,
    /// Project has been completed.
    Completed,
}

impl ProjectStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
        }
    }

    /// Returns whether no further status change can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// Completing an already completed project is accepted and leaves the
    /// status unchanged. Nothing moves a project back to `open`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(target, Self::Completed)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = ParseProjectStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseProjectStatusError(value.to_owned())),
        }
    }
}

/// Descriptive project fields that callers may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetails {
    name: String,
    detail: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl ProjectDetails {
    /// Creates validated project details.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyProjectName`] when the name is
    /// blank, [`ProjectDomainError::ProjectNameTooLong`] when it exceeds 255
    /// characters, or [`ProjectDomainError::InvalidSchedule`] when the end
    /// date precedes the start date.
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, ProjectDomainError> {
        let raw_name = name.into();
        let trimmed_name = raw_name.trim();
        if trimmed_name.is_empty() {
            return Err(ProjectDomainError::EmptyProjectName);
        }

        let name_length = trimmed_name.chars().count();
        if name_length > MAX_PROJECT_NAME_LENGTH {
            return Err(ProjectDomainError::ProjectNameTooLong(name_length));
        }

        if end_date < start_date {
            return Err(ProjectDomainError::InvalidSchedule {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            name: trimmed_name.to_owned(),
            detail: None,
            start_date,
            end_date,
        })
    }

    /// Sets the free-form project description. Blank text clears it.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let raw_detail = detail.into();
        let trimmed_detail = raw_detail.trim();
        self.detail = (!trimmed_detail.is_empty()).then(|| trimmed_detail.to_owned());
        self
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the project description, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the planned start date.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the planned end date.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// Project awaiting its first save.
///
/// A store turns this into a [`Project`] by assigning an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    code: ProjectCode,
    details: ProjectDetails,
    assigned_manager: String,
    created_at: DateTime<Utc>,
}

impl NewProject {
    /// Creates an unsaved project owned by `assigned_manager`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyAssignedManager`] when the manager
    /// username is blank or [`ProjectDomainError::AssignedManagerTooLong`]
    /// when it exceeds 255 characters.
    pub fn new(
        code: ProjectCode,
        details: ProjectDetails,
        assigned_manager: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let raw_manager = assigned_manager.into();
        let trimmed_manager = raw_manager.trim();
        if trimmed_manager.is_empty() {
            return Err(ProjectDomainError::EmptyAssignedManager);
        }

        if trimmed_manager.chars().count() > MAX_ASSIGNED_MANAGER_LENGTH {
            return Err(ProjectDomainError::AssignedManagerTooLong(
                trimmed_manager.to_owned(),
            ));
        }

        Ok(Self {
            code,
            details,
            assigned_manager: trimmed_manager.to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Returns the project code.
    #[must_use]
    pub const fn code(&self) -> &ProjectCode {
        &self.code
    }

    /// Returns the descriptive details.
    #[must_use]
    pub const fn details(&self) -> &ProjectDetails {
        &self.details
    }

    /// Returns the owning manager's username.
    #[must_use]
    pub fn assigned_manager(&self) -> &str {
        &self.assigned_manager
    }

    /// Returns the initial status, which is always [`ProjectStatus::Open`].
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        ProjectStatus::Open
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Promotes the project to a persisted aggregate with a store-assigned
    /// identifier.
    #[must_use]
    pub fn into_project(self, id: ProjectId) -> Project {
        Project {
            id,
            code: self.code,
            details: self.details,
            assigned_manager: self.assigned_manager,
            status: ProjectStatus::Open,
            is_deleted: false,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    code: ProjectCode,
    details: ProjectDetails,
    assigned_manager: String,
    status: ProjectStatus,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted project code.
    pub code: ProjectCode,
    /// Persisted descriptive details.
    pub details: ProjectDetails,
    /// Persisted owning manager.
    pub assigned_manager: String,
    /// Persisted status.
    pub status: ProjectStatus,
    /// Persisted soft-delete flag.
    pub is_deleted: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            code: data.code,
            details: data.details,
            assigned_manager: data.assigned_manager,
            status: data.status,
            is_deleted: data.is_deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project code.
    #[must_use]
    pub const fn code(&self) -> &ProjectCode {
        &self.code
    }

    /// Returns the descriptive details.
    #[must_use]
    pub const fn details(&self) -> &ProjectDetails {
        &self.details
    }

    /// Returns the owning manager's username.
    #[must_use]
    pub fn assigned_manager(&self) -> &str {
        &self.assigned_manager
    }

    /// Returns the project status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns whether the project has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns whether the project has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks the project as completed.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidStatusTransition`] when the
    /// current status cannot move to [`ProjectStatus::Completed`].
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), ProjectDomainError> {
        self.transition_to(ProjectStatus::Completed)?;
        self.touch(clock);
        Ok(())
    }

    /// Soft-deletes the project and retires its code as `<code>-<id>`.
    pub fn mark_deleted(&mut self, clock: &impl Clock) {
        self.is_deleted = true;
        self.code = self.code.retired_for(self.id);
        self.touch(clock);
    }

    /// Builds the updated aggregate from replacement details.
    ///
    /// Only the descriptive details come from `details`. Identifier, code,
    /// manager, status, deletion flag and creation time are carried over
    /// from `self`.
    #[must_use]
    pub fn merged_with(&self, details: ProjectDetails, clock: &impl Clock) -> Self {
        Self {
            id: self.id,
            code: self.code.clone(),
            details,
            assigned_manager: self.assigned_manager.clone(),
            status: self.status,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: clock.utc(),
        }
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    fn transition_to(&mut self, target: ProjectStatus) -> Result<(), ProjectDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(ProjectDomainError::InvalidStatusTransition {
                code: self.code.clone(),
                from: self.status,
                to: target,
            });
        }

        self.status = target;
        Ok(())
    }
}
