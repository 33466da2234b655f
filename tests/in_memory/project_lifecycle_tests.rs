//! In-memory integration tests for project lifecycle operations.

use std::sync::Arc;

use mockable::DefaultClock;
use projecthub::project::{
    adapters::{
        StaticIdentity,
        memory::{InMemoryProjectRepository, InMemoryTaskService},
    },
    domain::{ProjectStatus, Role, TaskCounts},
    services::{CreateProjectRequest, ProjectService, UpdateProjectRequest},
};
use rstest::{fixture, rstest};
use serde_json::json;

type TestService = ProjectService<InMemoryProjectRepository, InMemoryTaskService, DefaultClock>;

struct Context {
    service: TestService,
    tasks: InMemoryTaskService,
}

#[fixture]
fn context() -> Context {
    let tasks = InMemoryTaskService::new();
    let service = ProjectService::new(
        Arc::new(InMemoryProjectRepository::new()),
        Arc::new(tasks.clone()),
        Arc::new(DefaultClock),
    );
    Context { service, tasks }
}

fn manager(name: &str) -> StaticIdentity {
    StaticIdentity::new(name, format!("token-{name}")).with_role(Role::Manager)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn json_requests_drive_create_and_update(context: Context) -> eyre::Result<()> {
    let alice = manager("alice");
    let create: CreateProjectRequest = serde_json::from_value(json!({
        "code": "OPS-7",
        "name": "Observability",
        "start_date": "2026-02-01",
        "end_date": "2026-05-31",
    }))?;
    let created = context.service.create(&alice, create).await?;

    let update: UpdateProjectRequest = serde_json::from_value(json!({
        "code": "OPS-8",
        "name": "Observability stack",
        "detail": "Metrics and traces",
        "start_date": "2026-02-01",
        "end_date": "2026-07-31",
        "assigned_manager": "mallory",
        "status": "completed",
    }))?;
    let updated = context.service.update(&alice, "OPS-7", update).await?;

    eyre::ensure!(updated.id == created.id, "identifier changed on update");
    eyre::ensure!(updated.code.as_str() == "OPS-7", "code changed on update");
    eyre::ensure!(updated.assigned_manager == "alice", "manager changed on update");
    eyre::ensure!(updated.status == ProjectStatus::Open, "status changed on update");
    eyre::ensure!(
        updated.detail.as_deref() == Some("Metrics and traces"),
        "detail not applied"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn managers_see_only_their_projects_with_counts(context: Context) -> eyre::Result<()> {
    let alice = manager("alice");
    let bob = manager("bob");
    for (caller, code) in [(&alice, "A-1"), (&bob, "B-1"), (&alice, "A-2")] {
        let request = CreateProjectRequest::new(
            code,
            format!("Project {code}"),
            chrono::NaiveDate::from_ymd_opt(2026, 1, 1).ok_or_else(|| eyre::eyre!("date"))?,
            chrono::NaiveDate::from_ymd_opt(2026, 3, 1).ok_or_else(|| eyre::eyre!("date"))?,
        );
        context.service.create(caller, request).await?;
    }
    context.tasks.set_counts("A-2", TaskCounts::new(7, 3))?;

    let detailed = context.service.read_all_with_details(&alice).await?;
    let codes: Vec<_> = detailed.iter().map(|view| view.code.as_str()).collect();
    eyre::ensure!(codes == ["A-1", "A-2"], "unexpected projects: {codes:?}");

    let second = detailed
        .get(1)
        .ok_or_else(|| eyre::eyre!("expected a second project"))?;
    eyre::ensure!(
        second.completed_task_count == Some(7) && second.non_completed_task_count == Some(3),
        "unexpected counts on {}",
        second.code
    );

    let summary = context.service.manager_read_all(&bob).await?;
    eyre::ensure!(summary.len() == 1, "bob should own one project");
    eyre::ensure!(
        summary.iter().all(|view| view.completed_task_count.is_none()),
        "plain listing should not carry counts"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_project_can_still_be_deleted(context: Context) -> eyre::Result<()> {
    let alice = manager("alice");
    let request = CreateProjectRequest::new(
        "PRJ-5",
        "Archive",
        chrono::NaiveDate::from_ymd_opt(2026, 1, 1).ok_or_else(|| eyre::eyre!("date"))?,
        chrono::NaiveDate::from_ymd_opt(2026, 1, 31).ok_or_else(|| eyre::eyre!("date"))?,
    );
    context.service.create(&alice, request).await?;
    context.service.complete(&alice, "PRJ-5").await?;

    context.service.delete(&alice, "PRJ-5").await?;

    eyre::ensure!(
        context.service.count_non_completed("alice").await? == 0,
        "no live projects should remain"
    );
    eyre::ensure!(
        context.tasks.deleted_projects()? == vec!["PRJ-5".to_owned()],
        "task service should see the original code"
    );
    Ok(())
}
