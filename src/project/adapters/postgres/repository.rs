//! `PostgreSQL` repository implementation for project records.

use super::{
    models::{NewProjectRow, ProjectChangeset, ProjectRow},
    schema::projects,
};
use crate::project::{
    domain::{
        NewProject, PersistedProjectData, Project, ProjectCode, ProjectDetails, ProjectId,
        ProjectStatus,
    },
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by project adapters.
pub type ProjectPgPool = Pool<ConnectionManager<PgConnection>>;

/// Name of the partial unique index over live project codes.
const LIVE_CODE_INDEX: &str = "idx_projects_code_live";

/// `PostgreSQL`-backed project repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: ProjectPgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProjectPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> ProjectRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProjectRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProjectRepositoryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(ProjectRepositoryError::persistence)?
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn insert(&self, project: &NewProject) -> ProjectRepositoryResult<Project> {
        let code = project.code().clone();
        let new_row = to_new_row(project);

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(projects::table)
                .values(&new_row)
                .returning(ProjectRow::as_returning())
                .get_result::<ProjectRow>(connection)
                .map_err(|err| map_write_error(err, &code))?;
            row_to_project(row)
        })
        .await
    }

    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let project_id = project.id();
        let code = project.code().clone();
        let changeset = to_changeset(project);

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(projects::table.filter(projects::id.eq(project_id.value())))
                    .set(&changeset)
                    .execute(connection)
                    .map_err(|err| map_write_error(err, &code))?;

            if updated_count == 0 {
                return Err(ProjectRepositoryError::NotFound(project_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_code(&self, code: &ProjectCode) -> ProjectRepositoryResult<Option<Project>> {
        let lookup_code = code.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::project_code.eq(&lookup_code))
                .filter(projects::is_deleted.eq(false))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn find_all(&self) -> ProjectRepositoryResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::is_deleted.eq(false))
                .order(projects::id.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn find_all_by_manager(&self, manager: &str) -> ProjectRepositoryResult<Vec<Project>> {
        let lookup_manager = manager.to_owned();
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::assigned_manager.eq(&lookup_manager))
                .filter(projects::is_deleted.eq(false))
                .order(projects::id.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn count_non_completed_by_manager(&self, manager: &str) -> ProjectRepositoryResult<u64> {
        let lookup_manager = manager.to_owned();
        self.run_blocking(move |connection| {
            let count = projects::table
                .filter(projects::assigned_manager.eq(&lookup_manager))
                .filter(projects::is_deleted.eq(false))
                .filter(projects::project_status.ne(ProjectStatus::Completed.as_str()))
                .count()
                .get_result::<i64>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            u64::try_from(count).map_err(ProjectRepositoryError::persistence)
        })
        .await
    }
}

fn to_new_row(project: &NewProject) -> NewProjectRow {
    let details = project.details();
    NewProjectRow {
        project_code: project.code().as_str().to_owned(),
        project_name: details.name().to_owned(),
        project_detail: details.detail().map(str::to_owned),
        start_date: details.start_date(),
        end_date: details.end_date(),
        assigned_manager: project.assigned_manager().to_owned(),
        project_status: project.status().as_str().to_owned(),
        is_deleted: false,
        created_at: project.created_at(),
        updated_at: project.created_at(),
    }
}

fn to_changeset(project: &Project) -> ProjectChangeset {
    let details = project.details();
    ProjectChangeset {
        project_code: project.code().as_str().to_owned(),
        project_name: details.name().to_owned(),
        project_detail: details.detail().map(str::to_owned),
        start_date: details.start_date(),
        end_date: details.end_date(),
        assigned_manager: project.assigned_manager().to_owned(),
        project_status: project.status().as_str().to_owned(),
        is_deleted: project.is_deleted(),
        updated_at: project.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> ProjectRepositoryResult<Project> {
    let ProjectRow {
        id,
        project_code,
        project_name,
        project_detail,
        start_date,
        end_date,
        assigned_manager,
        project_status,
        is_deleted,
        created_at,
        updated_at,
    } = row;

    let code =
        ProjectCode::new(project_code).map_err(ProjectRepositoryError::invalid_persisted_data)?;
    let mut details = ProjectDetails::new(project_name, start_date, end_date)
        .map_err(ProjectRepositoryError::invalid_persisted_data)?;
    if let Some(detail) = project_detail {
        details = details.with_detail(detail);
    }
    let status = ProjectStatus::try_from(project_status.as_str())
        .map_err(ProjectRepositoryError::invalid_persisted_data)?;

    let data = PersistedProjectData {
        id: ProjectId::new(id),
        code,
        details,
        assigned_manager,
        status,
        is_deleted,
        created_at,
        updated_at,
    };
    Ok(Project::from_persisted(data))
}

fn map_write_error(err: DieselError, code: &ProjectCode) -> ProjectRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_live_code_unique_violation(info.as_ref()) =>
        {
            ProjectRepositoryError::DuplicateCode(code.clone())
        }
        _ => ProjectRepositoryError::persistence(err),
    }
}

fn is_live_code_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == LIVE_CODE_INDEX)
}
