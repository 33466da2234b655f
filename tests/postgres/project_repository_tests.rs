//! Project repository behaviour against the embedded `PostgreSQL` cluster.

use super::helpers::{
    BoxError, PostgresCluster, TestDatabase, clock, named_project, new_project,
    postgres_cluster, test_runtime,
};
use mockable::DefaultClock;
use projecthub::project::{
    domain::{ProjectCode, ProjectId, ProjectStatus},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use rstest::rstest;

#[rstest]
fn insert_assigns_identifier_and_round_trips(
    clock: DefaultClock,
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let rt = test_runtime()?;
    let database = TestDatabase::create(postgres_cluster)?;
    let repo = database.repository()?;

    let inserted = rt.block_on(repo.insert(&new_project(&clock, "PG-1", "alice")?))?;
    let found = rt
        .block_on(repo.find_by_code(&ProjectCode::new("PG-1")?))?
        .ok_or("inserted project should be found")?;

    assert!(inserted.id().value() > 0);
    assert_eq!(found.id(), inserted.id());
    assert_eq!(found.status(), ProjectStatus::Open);
    assert_eq!(found.assigned_manager(), "alice");
    assert_eq!(found.details(), inserted.details());
    Ok(())
}

#[rstest]
fn name_at_column_limit_is_stored_whole(
    clock: DefaultClock,
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let rt = test_runtime()?;
    let database = TestDatabase::create(postgres_cluster)?;
    let repo = database.repository()?;
    let name = "n".repeat(255);

    rt.block_on(repo.insert(&named_project(&clock, "PG-LONG", &name, "alice")?))?;
    let found = rt
        .block_on(repo.find_by_code(&ProjectCode::new("PG-LONG")?))?
        .ok_or("inserted project should be found")?;

    assert_eq!(found.details().name(), name);
    Ok(())
}

#[rstest]
fn duplicate_live_code_is_rejected(
    clock: DefaultClock,
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let rt = test_runtime()?;
    let database = TestDatabase::create(postgres_cluster)?;
    let repo = database.repository()?;
    rt.block_on(repo.insert(&new_project(&clock, "PG-2", "alice")?))?;

    let result = rt.block_on(repo.insert(&new_project(&clock, "PG-2", "bob")?));

    assert!(matches!(
        result,
        Err(ProjectRepositoryError::DuplicateCode(code)) if code.as_str() == "PG-2"
    ));
    Ok(())
}

#[rstest]
fn soft_delete_frees_the_code(
    clock: DefaultClock,
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let rt = test_runtime()?;
    let database = TestDatabase::create(postgres_cluster)?;
    let repo = database.repository()?;
    let mut first = rt.block_on(repo.insert(&new_project(&clock, "PG-3", "alice")?))?;
    first.mark_deleted(&clock);
    rt.block_on(repo.update(&first))?;

    let second = rt.block_on(repo.insert(&new_project(&clock, "PG-3", "alice")?))?;
    let found = rt
        .block_on(repo.find_by_code(&ProjectCode::new("PG-3")?))?
        .ok_or("replacement project should be found")?;
    let retired_code = ProjectCode::new(format!("PG-3-{}", first.id()))?;

    assert_eq!(found.id(), second.id());
    assert!(rt.block_on(repo.find_by_code(&retired_code))?.is_none());
    Ok(())
}

#[rstest]
fn listings_and_counts_skip_deleted_rows(
    clock: DefaultClock,
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let rt = test_runtime()?;
    let database = TestDatabase::create(postgres_cluster)?;
    let repo = database.repository()?;
    rt.block_on(repo.insert(&new_project(&clock, "PG-4", "alice")?))?;
    let mut completed = rt.block_on(repo.insert(&new_project(&clock, "PG-5", "alice")?))?;
    let mut deleted = rt.block_on(repo.insert(&new_project(&clock, "PG-6", "alice")?))?;
    rt.block_on(repo.insert(&new_project(&clock, "PG-7", "bob")?))?;
    completed.complete(&clock)?;
    rt.block_on(repo.update(&completed))?;
    deleted.mark_deleted(&clock);
    rt.block_on(repo.update(&deleted))?;

    let all: Vec<_> = rt
        .block_on(repo.find_all())?
        .iter()
        .map(|project| project.code().as_str().to_owned())
        .collect();
    let mine = rt.block_on(repo.find_all_by_manager("alice"))?;

    assert_eq!(all, vec!["PG-4", "PG-5", "PG-7"]);
    assert_eq!(mine.len(), 2);
    assert_eq!(rt.block_on(repo.count_non_completed_by_manager("alice"))?, 1);
    assert_eq!(rt.block_on(repo.count_non_completed_by_manager("bob"))?, 1);
    Ok(())
}

#[rstest]
fn updating_missing_project_is_not_found(
    clock: DefaultClock,
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let rt = test_runtime()?;
    let database = TestDatabase::create(postgres_cluster)?;
    let repo = database.repository()?;
    let ghost = new_project(&clock, "PG-8", "alice")?.into_project(ProjectId::new(999_999));

    let result = rt.block_on(repo.update(&ghost));

    assert!(matches!(
        result,
        Err(ProjectRepositoryError::NotFound(id)) if id == ProjectId::new(999_999)
    ));
    Ok(())
}
