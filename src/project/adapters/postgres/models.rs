//! Diesel row models for project persistence.

use super::schema::projects;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Store-assigned project identifier.
    pub id: i64,
    /// Project code.
    pub project_code: String,
    /// Project name.
    pub project_name: String,
    /// Optional project description.
    pub project_detail: Option<String>,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Planned end date.
    pub end_date: NaiveDate,
    /// Username of the owning manager.
    pub assigned_manager: String,
    /// Project status.
    pub project_status: String,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for project records; the identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    /// Project code.
    pub project_code: String,
    /// Project name.
    pub project_name: String,
    /// Optional project description.
    pub project_detail: Option<String>,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Planned end date.
    pub end_date: NaiveDate,
    /// Username of the owning manager.
    pub assigned_manager: String,
    /// Project status.
    pub project_status: String,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Full-row changeset written by project updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub struct ProjectChangeset {
    /// Project code.
    pub project_code: String,
    /// Project name.
    pub project_name: String,
    /// Optional project description.
    pub project_detail: Option<String>,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Planned end date.
    pub end_date: NaiveDate,
    /// Username of the owning manager.
    pub assigned_manager: String,
    /// Project status.
    pub project_status: String,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
