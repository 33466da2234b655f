//! Collaborator failure handling, driven through mocked ports.

use std::sync::Arc;

use crate::project::{
    adapters::{StaticIdentity, memory::InMemoryProjectRepository},
    domain::{ProjectCode, ProjectId, ProjectStatus, Role},
    ports::{
        IdentityError, IdentityOracle, IdentityResult, TaskServiceClient, TaskServiceError,
        TaskServiceResponse, TaskServiceResult,
    },
    services::{CreateProjectRequest, ProjectService, ProjectServiceError},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::DefaultClock;
use mockall::mock;
use rstest::rstest;
use serde_json::json;

mock! {
    TaskService {}

    #[async_trait]
    impl TaskServiceClient for TaskService {
        async fn get_counts_by_project(
            &self,
            access_token: &str,
            code: &ProjectCode,
        ) -> TaskServiceResult<TaskServiceResponse>;

        async fn complete_by_project(
            &self,
            access_token: &str,
            code: &ProjectCode,
        ) -> TaskServiceResult<TaskServiceResponse>;

        async fn delete_by_project(
            &self,
            access_token: &str,
            code: &ProjectCode,
        ) -> TaskServiceResult<TaskServiceResponse>;
    }
}

mock! {
    Identity {}

    #[async_trait]
    impl IdentityOracle for Identity {
        async fn current_username(&self) -> IdentityResult<String>;
        async fn has_role(&self, username: &str, role: Role) -> IdentityResult<bool>;
        async fn current_access_token(&self) -> IdentityResult<String>;
    }
}

type MockedService = ProjectService<InMemoryProjectRepository, MockTaskService, DefaultClock>;

fn alice() -> StaticIdentity {
    StaticIdentity::new("alice", "token-alice").with_role(Role::Manager)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

async fn service_with_project(
    tasks: MockTaskService,
) -> (MockedService, InMemoryProjectRepository, ProjectId) {
    let repository = InMemoryProjectRepository::new();
    let service = ProjectService::new(
        Arc::new(repository.clone()),
        Arc::new(tasks),
        Arc::new(DefaultClock),
    );
    let request =
        CreateProjectRequest::new("PRJ-1", "Ledger sync", date(2026, 1, 1), date(2026, 6, 1));
    let view = service
        .create(&alice(), request)
        .await
        .expect("project creation should succeed");
    (service, repository, view.id)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_forwards_token_and_code() -> eyre::Result<()> {
    let mut tasks = MockTaskService::new();
    tasks
        .expect_complete_by_project()
        .withf(|token: &str, code: &ProjectCode| token == "token-alice" && code.as_str() == "PRJ-1")
        .times(1)
        .returning(|_, _| Ok(TaskServiceResponse::ok(json!(null))));
    let (service, _, _) = service_with_project(tasks).await;

    let view = service.complete(&alice(), "PRJ-1").await?;

    assert_eq!(view.status, ProjectStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_transport_error_keeps_completed_status() -> eyre::Result<()> {
    let mut tasks = MockTaskService::new();
    tasks.expect_complete_by_project().times(1).returning(|_, _| {
        Err(TaskServiceError::transport(std::io::Error::other(
            "connection refused",
        )))
    });
    let (service, repository, id) = service_with_project(tasks).await;

    let result = service.complete(&alice(), "PRJ-1").await;

    let Err(err) = result else {
        eyre::bail!("completion should fail");
    };
    assert!(matches!(err, ProjectServiceError::RelatedTasksNotCompleted(_)));
    assert_eq!(err.status_code(), 502);
    let stored = repository.stored(id)?.expect("stored project");
    assert_eq!(stored.status(), ProjectStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletion_status_error_writes_nothing() -> eyre::Result<()> {
    let mut tasks = MockTaskService::new();
    tasks.expect_delete_by_project().times(1).returning(|_, _| {
        Err(TaskServiceError::Status {
            status: 503,
            body: "maintenance".to_owned(),
        })
    });
    let (service, repository, id) = service_with_project(tasks).await;

    let result = service.delete(&alice(), "PRJ-1").await;

    assert!(matches!(
        result,
        Err(ProjectServiceError::RelatedTasksNotDeleted(_))
    ));
    let stored = repository.stored(id)?.expect("stored project");
    assert!(!stored.is_deleted());
    assert_eq!(stored.code().as_str(), "PRJ-1");
    Ok(())
}

#[rstest]
#[case::missing_counts(json!({"completedTaskCount": 2}))]
#[case::not_a_mapping(json!("three"))]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_count_payload_is_not_retrieved(#[case] payload: serde_json::Value) {
    let mut tasks = MockTaskService::new();
    tasks
        .expect_get_counts_by_project()
        .times(1)
        .returning(move |_, _| Ok(TaskServiceResponse::ok(payload.clone())));
    let (service, _, _) = service_with_project(tasks).await;

    let result = service.read_all_with_details(&alice()).await;

    assert!(matches!(
        result,
        Err(ProjectServiceError::DetailsNotRetrieved(code)) if code.as_str() == "PRJ-1"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn access_denial_skips_task_service() {
    let mut tasks = MockTaskService::new();
    tasks.expect_complete_by_project().never();
    let (service, _, _) = service_with_project(tasks).await;
    let bob = StaticIdentity::new("bob", "token-bob").with_role(Role::Manager);

    let result = service.complete(&bob, "PRJ-1").await;

    let Err(err) = result else {
        panic!("completion by a non-owner should fail");
    };
    assert_eq!(err.status_code(), 403);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identity_provider_failure_is_reported() {
    let (service, _, _) = service_with_project(MockTaskService::new()).await;
    let mut caller = MockIdentity::new();
    caller.expect_current_username().returning(|| {
        Err(IdentityError::provider(std::io::Error::other(
            "directory offline",
        )))
    });

    let result = service.read_by_code(&caller, "PRJ-1").await;

    let Err(err) = result else {
        panic!("lookup without an identity should fail");
    };
    assert!(matches!(err, ProjectServiceError::Identity(_)));
    assert_eq!(err.status_code(), 401);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn role_lookups_use_resolved_username() {
    let (service, _, _) = service_with_project(MockTaskService::new()).await;
    let mut caller = MockIdentity::new();
    caller
        .expect_current_username()
        .returning(|| Ok("alice".to_owned()));
    caller
        .expect_has_role()
        .withf(|username: &str, _: &Role| username == "alice")
        .times(2)
        .returning(|_, role| Ok(role == Role::Manager));

    let manager = service.read_manager_by_code(&caller, "PRJ-1").await;

    assert_eq!(manager.ok().as_deref(), Some("alice"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_access_token_leaves_project_open() -> eyre::Result<()> {
    let mut tasks = MockTaskService::new();
    tasks.expect_complete_by_project().never();
    let (service, repository, id) = service_with_project(tasks).await;
    let mut caller = MockIdentity::new();
    caller
        .expect_current_username()
        .returning(|| Ok("alice".to_owned()));
    caller
        .expect_has_role()
        .returning(|_, role| Ok(role == Role::Manager));
    caller
        .expect_current_access_token()
        .times(1)
        .returning(|| Err(IdentityError::Unauthenticated));

    let result = service.complete(&caller, "PRJ-1").await;

    assert!(matches!(
        result,
        Err(ProjectServiceError::Identity(IdentityError::Unauthenticated))
    ));
    let stored = repository.stored(id)?.expect("stored project");
    assert_eq!(stored.status(), ProjectStatus::Open);
    Ok(())
}
