//! Operator command line for project records.
//!
//! Usage:
//!
//! ```text
//! projecthub --user alice --role Manager --token <token> <command> [args]
//! ```
//!
//! The caller's username, roles and access token are taken from the
//! arguments (the token also from `PROJECTHUB_ACCESS_TOKEN`). Database and
//! task service settings come from the environment, optionally loaded from a
//! `.env` file. Results are written to stdout as JSON.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use projecthub::config::AppConfig;
use projecthub::project::{
    adapters::{
        StaticIdentity, http::HttpTaskServiceClient, postgres::PostgresProjectRepository,
    },
    domain::{ParseRoleError, Role},
    ports::{ProjectRepository, TaskServiceClient},
    services::{CreateProjectRequest, ProjectService, ProjectServiceError, UpdateProjectRequest},
};
use projecthub::telemetry;
use serde_json::Value;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "projecthub", version, about = "Manage project records")]
struct Cli {
    /// Username of the caller.
    #[arg(long, global = true, default_value = "")]
    user: String,
    /// Role held by the caller; repeat for several roles.
    #[arg(long = "role", global = true, value_parser = parse_role)]
    roles: Vec<Role>,
    /// Access token forwarded to the task service.
    #[arg(long, global = true, env = "PROJECTHUB_ACCESS_TOKEN", default_value = "")]
    token: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a project managed by the caller.
    Create {
        code: String,
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        #[arg(long)]
        detail: Option<String>,
    },
    /// Show one project.
    Show { code: String },
    /// Show the assigned manager of a project.
    Manager { code: String },
    /// List the caller's projects.
    List,
    /// List every project (requires the Admin role).
    ListAll,
    /// List the caller's projects with task counts.
    Details,
    /// Count a manager's projects that are not completed.
    Count { manager: String },
    /// Check that a project is open and reachable.
    Check { code: String },
    /// Replace a project's name, description and dates.
    Update {
        code: String,
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        #[arg(long)]
        detail: Option<String>,
    },
    /// Complete a project and its tasks.
    Complete { code: String },
    /// Soft-delete a project and its tasks.
    Delete { code: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("list-all requires the Admin role")]
    AdminRequired,
    #[error(transparent)]
    Service(#[from] ProjectServiceError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn parse_role(value: &str) -> Result<Role, ParseRoleError> {
    Role::try_from(value)
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    telemetry::init_tracing(config.log_format)?;

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .max_size(config.database_pool_size)
        .build(manager)?;
    let tasks =
        HttpTaskServiceClient::new(&config.task_service_url, config.task_service_timeout)?;
    let service = ProjectService::new(
        Arc::new(PostgresProjectRepository::new(pool)),
        Arc::new(tasks),
        Arc::new(DefaultClock),
    );

    let identity = StaticIdentity::new(cli.user, cli.token).with_roles(cli.roles.iter().copied());
    let is_admin = cli.roles.contains(&Role::Admin);

    match run(&service, &identity, is_admin, cli.command).await {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let mut stderr = io::stderr().lock();
            match &err {
                CliError::Service(service_err) => writeln!(
                    stderr,
                    "error ({}): {service_err}",
                    service_err.status_code()
                )?,
                CliError::AdminRequired | CliError::Encode(_) => writeln!(stderr, "error: {err}")?,
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run<R, T>(
    service: &ProjectService<R, T, DefaultClock>,
    identity: &StaticIdentity,
    is_admin: bool,
    command: Command,
) -> Result<Value, CliError>
where
    R: ProjectRepository,
    T: TaskServiceClient,
{
    let output = match command {
        Command::Create {
            code,
            name,
            start_date,
            end_date,
            detail,
        } => {
            let request = detail.into_iter().fold(
                CreateProjectRequest::new(code, name, start_date, end_date),
                CreateProjectRequest::with_detail,
            );
            serde_json::to_value(service.create(identity, request).await?)?
        }
        Command::Show { code } => serde_json::to_value(service.read_by_code(identity, &code).await?)?,
        Command::Manager { code } => {
            Value::String(service.read_manager_by_code(identity, &code).await?)
        }
        Command::List => serde_json::to_value(service.manager_read_all(identity).await?)?,
        Command::ListAll => {
            if !is_admin {
                return Err(CliError::AdminRequired);
            }
            serde_json::to_value(service.admin_read_all().await?)?
        }
        Command::Details => serde_json::to_value(service.read_all_with_details(identity).await?)?,
        Command::Count { manager } => Value::from(service.count_non_completed(&manager).await?),
        Command::Check { code } => Value::Bool(service.check_by_code(identity, &code).await?),
        Command::Update {
            code,
            name,
            start_date,
            end_date,
            detail,
        } => {
            let request = detail.into_iter().fold(
                UpdateProjectRequest::new(name, start_date, end_date),
                UpdateProjectRequest::with_detail,
            );
            serde_json::to_value(service.update(identity, &code, request).await?)?
        }
        Command::Complete { code } => serde_json::to_value(service.complete(identity, &code).await?)?,
        Command::Delete { code } => {
            service.delete(identity, &code).await?;
            serde_json::json!({ "deleted": code })
        }
    };
    Ok(output)
}
