//! Error types for project domain validation and parsing.

use super::{ProjectCode, ProjectStatus};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating project domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project code is empty after trimming.
    #[error("project code must not be empty")]
    EmptyProjectCode,

    /// The project code exceeds the 100-character storage limit.
    #[error("project code exceeds 100 character limit: {0}")]
    ProjectCodeTooLong(String),

    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds the 255-character storage limit.
    #[error("project name exceeds 255 character limit ({0} characters)")]
    ProjectNameTooLong(usize),

    /// The assigned manager username is empty after trimming.
    #[error("assigned manager must not be empty")]
    EmptyAssignedManager,

    /// The assigned manager username exceeds the 255-character storage limit.
    #[error("assigned manager exceeds 255 character limit: {0}")]
    AssignedManagerTooLong(String),

    /// The project ends before it starts.
    #[error("project end date {end} is before start date {start}")]
    InvalidSchedule {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// Transitioning between two statuses is not allowed.
    #[error("invalid status transition for project {code}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Project code.
        code: ProjectCode,
        /// Current status.
        from: ProjectStatus,
        /// Requested status.
        to: ProjectStatus,
    },
}

/// Error returned while parsing project statuses from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project status: {0}")]
pub struct ParseProjectStatusError(pub String);

/// Error returned while parsing caller roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
