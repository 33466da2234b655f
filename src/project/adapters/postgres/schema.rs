//! Diesel schema for project persistence.

diesel::table! {
    /// Project records, soft-deleted ones included.
    projects (id) {
        /// Store-assigned project identifier.
        id -> Int8,
        /// Project code; unique among live rows via `idx_projects_code_live`.
        #[max_length = 255]
        project_code -> Varchar,
        /// Project name.
        #[max_length = 255]
        project_name -> Varchar,
        /// Optional project description.
        project_detail -> Nullable<Text>,
        /// Planned start date.
        start_date -> Date,
        /// Planned end date.
        end_date -> Date,
        /// Username of the owning manager.
        #[max_length = 255]
        assigned_manager -> Varchar,
        /// Project status (`open`, `completed`).
        #[max_length = 50]
        project_status -> Varchar,
        /// Soft-delete flag.
        is_deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
