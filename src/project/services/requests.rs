//! Request payloads accepted by the project service.

use crate::project::domain::{ProjectDetails, ProjectDomainError, ProjectStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Requested project code.
    pub code: String,
    /// Project name.
    pub name: String,
    /// Optional project description.
    #[serde(default)]
    pub detail: Option<String>,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Planned end date.
    pub end_date: NaiveDate,
}

impl CreateProjectRequest {
    /// Creates a request with the required project fields.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            detail: None,
            start_date,
            end_date,
        }
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Validates the descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError`] when the name or schedule is invalid.
    pub fn to_details(&self) -> Result<ProjectDetails, ProjectDomainError> {
        build_details(&self.name, self.detail.as_deref(), self.start_date, self.end_date)
    }
}

/// Request payload for replacing a project's descriptive fields.
///
/// The payload may carry a full project representation. `code`,
/// `assigned_manager` and `status` are accepted but never applied: an update
/// keeps those values from the stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    /// Replacement project name.
    pub name: String,
    /// Replacement description; `None` clears it.
    #[serde(default)]
    pub detail: Option<String>,
    /// Replacement start date.
    pub start_date: NaiveDate,
    /// Replacement end date.
    pub end_date: NaiveDate,
    /// Submitted code, ignored.
    #[serde(default)]
    pub code: Option<String>,
    /// Submitted manager, ignored.
    #[serde(default)]
    pub assigned_manager: Option<String>,
    /// Submitted status, ignored.
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

impl UpdateProjectRequest {
    /// Creates a request with replacement descriptive fields.
    #[must_use]
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            detail: None,
            start_date,
            end_date,
            code: None,
            assigned_manager: None,
            status: None,
        }
    }

    /// Sets the replacement description.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the submitted code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the submitted manager.
    #[must_use]
    pub fn with_assigned_manager(mut self, manager: impl Into<String>) -> Self {
        self.assigned_manager = Some(manager.into());
        self
    }

    /// Sets the submitted status.
    #[must_use]
    pub const fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Validates the replacement descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError`] when the name or schedule is invalid.
    pub fn to_details(&self) -> Result<ProjectDetails, ProjectDomainError> {
        build_details(&self.name, self.detail.as_deref(), self.start_date, self.end_date)
    }
}

fn build_details(
    name: &str,
    detail: Option<&str>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<ProjectDetails, ProjectDomainError> {
    let mut details = ProjectDetails::new(name, start_date, end_date)?;
    if let Some(text) = detail {
        details = details.with_detail(text);
    }
    Ok(details)
}
