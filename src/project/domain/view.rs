//! Read projection of a project and task accounting counters.

use super::{Project, ProjectCode, ProjectId, ProjectStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload key carrying the number of completed tasks.
const COMPLETED_TASK_COUNT_KEY: &str = "completedTaskCount";
/// Payload key carrying the number of tasks not yet completed.
const NON_COMPLETED_TASK_COUNT_KEY: &str = "nonCompletedTaskCount";

/// Task totals for one project as reported by the task service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    completed: u32,
    non_completed: u32,
}

impl TaskCounts {
    /// Creates task counts.
    #[must_use]
    pub const fn new(completed: u32, non_completed: u32) -> Self {
        Self {
            completed,
            non_completed,
        }
    }

    /// Extracts counts from a task service payload mapping.
    ///
    /// Returns `None` unless both count keys are present as non-negative
    /// integers that fit in `u32`.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let completed = count_field(payload, COMPLETED_TASK_COUNT_KEY)?;
        let non_completed = count_field(payload, NON_COMPLETED_TASK_COUNT_KEY)?;
        Some(Self::new(completed, non_completed))
    }

    /// Returns the number of completed tasks.
    #[must_use]
    pub const fn completed(self) -> u32 {
        self.completed
    }

    /// Returns the number of tasks not yet completed.
    #[must_use]
    pub const fn non_completed(self) -> u32 {
        self.non_completed
    }
}

fn count_field(payload: &Value, key: &str) -> Option<u32> {
    payload
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|count| u32::try_from(count).ok())
}

/// Transport-facing view of a project.
///
/// The task counters are only filled by the detailed listing and are never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectView {
    /// Project identifier.
    pub id: ProjectId,
    /// Project code.
    pub code: ProjectCode,
    /// Project name.
    pub name: String,
    /// Project description.
    pub detail: Option<String>,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Planned end date.
    pub end_date: NaiveDate,
    /// Owning manager's username.
    pub assigned_manager: String,
    /// Project status.
    pub status: ProjectStatus,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Completed task count, when retrieved.
    pub completed_task_count: Option<u32>,
    /// Non-completed task count, when retrieved.
    pub non_completed_task_count: Option<u32>,
}

impl ProjectView {
    /// Returns the view annotated with task counts.
    #[must_use]
    pub const fn with_task_counts(mut self, counts: TaskCounts) -> Self {
        self.completed_task_count = Some(counts.completed());
        self.non_completed_task_count = Some(counts.non_completed());
        self
    }
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        let details = project.details();
        Self {
            id: project.id(),
            code: project.code().clone(),
            name: details.name().to_owned(),
            detail: details.detail().map(str::to_owned),
            start_date: details.start_date(),
            end_date: details.end_date(),
            assigned_manager: project.assigned_manager().to_owned(),
            status: project.status(),
            is_deleted: project.is_deleted(),
            completed_task_count: None,
            non_completed_task_count: None,
        }
    }
}
