//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use pg_embedded_setup_unpriv::{ExecutionPrivileges, TestCluster, detect_execution_privileges};
use projecthub::project::{
    adapters::postgres::PostgresProjectRepository,
    domain::{NewProject, ProjectCode, ProjectDetails},
};
use rstest::fixture;
use std::sync::Once;
use tokio::runtime::Runtime;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Embedded cluster shared by every test in this binary.
pub type PostgresCluster = &'static TestCluster;

/// SQL creating the projects table and its indexes.
pub const CREATE_PROJECTS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_projects/up.sql");

/// Migrated database that per-test databases are cloned from.
pub const TEMPLATE_DB: &str = "projecthub_test_template";

const WORKER_ENV: &str = "PG_EMBEDDED_WORKER";

static WORKER_SELECTION: Once = Once::new();

/// Provides a [`DefaultClock`] for test fixtures.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Starts (once) and returns the shared embedded cluster.
///
/// Under root the cluster is driven through this crate's `pg_worker`
/// binary unless `PG_EMBEDDED_WORKER` already names a worker.
#[fixture]
pub fn postgres_cluster() -> PostgresCluster {
    WORKER_SELECTION.call_once(|| {
        let as_root = matches!(detect_execution_privileges(), ExecutionPrivileges::Root);
        if as_root && std::env::var_os(WORKER_ENV).is_none() {
            // SAFETY: runs before any cluster thread starts; other tests block
            // on this `Once` until it returns.
            unsafe {
                std::env::set_var(WORKER_ENV, env!("CARGO_BIN_EXE_pg_worker"));
            }
        }
    });
    shared_test_cluster::default()
}

/// Builds the runtime that drives repository futures in synchronous tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

fn ensure_template(cluster: PostgresCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn =
                PgConnection::establish(&url).map_err(|err| eyre::eyre!("connect: {err}"))?;
            conn.batch_execute(CREATE_PROJECTS_SQL)
                .map_err(|err| eyre::eyre!("migrate: {err}"))?;
            Ok(())
        })
        .map_err(|err| Box::new(err) as BoxError)
}

/// Private database cloned from [`TEMPLATE_DB`] and dropped with the guard.
///
/// Declare the guard before any repository built from it so the pool's
/// connections close before the database is dropped.
pub struct TestDatabase {
    cluster: PostgresCluster,
    name: String,
}

impl TestDatabase {
    /// Clones a fresh database from the migrated template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template or the clone cannot be created.
    pub fn create(cluster: PostgresCluster) -> Result<Self, BoxError> {
        ensure_template(cluster)?;
        let name = format!("projecthub_test_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|err| Box::new(err) as BoxError)?;
        Ok(Self { cluster, name })
    }

    /// Builds a repository over a single-connection pool for this database.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect.
    pub fn repository(&self) -> Result<PostgresProjectRepository, BoxError> {
        let url = self.cluster.connection().database_url(&self.name);
        let pool = Pool::builder()
            .max_size(1)
            .build(ConnectionManager::<PgConnection>::new(url))?;
        Ok(PostgresProjectRepository::new(pool))
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(self.name.as_str()) {
            tracing::warn!(database = %self.name, error = %err, "test database cleanup failed");
        }
    }
}

/// Builds an unsaved project for `manager`.
///
/// # Errors
///
/// Returns an error if the project values are invalid.
pub fn new_project(
    clock: &DefaultClock,
    code: &str,
    manager: &str,
) -> Result<NewProject, BoxError> {
    named_project(clock, code, &format!("Project {code}"), manager)
}

/// Builds an unsaved project with an explicit name.
///
/// # Errors
///
/// Returns an error if the project values are invalid.
pub fn named_project(
    clock: &DefaultClock,
    code: &str,
    name: &str,
    manager: &str,
) -> Result<NewProject, BoxError> {
    let start = chrono::NaiveDate::from_ymd_opt(2026, 3, 1).ok_or("invalid start date")?;
    let end = chrono::NaiveDate::from_ymd_opt(2026, 9, 30).ok_or("invalid end date")?;
    let details = ProjectDetails::new(name, start, end)?;
    Ok(NewProject::new(
        ProjectCode::new(code)?,
        details,
        manager,
        clock,
    )?)
}
