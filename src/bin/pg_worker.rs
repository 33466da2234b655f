//! Drives embedded `PostgreSQL` lifecycle steps for the repository test
//! cluster.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `pg-embed-setup-unpriv` launches this binary when the test suite runs as
//! root. The file at `config-path` holds a JSON `WorkerPayload` with the
//! cluster settings and environment overrides. The worker switches to the
//! `nobody` account before it touches the cluster, since `initdb` and
//! `postgres` both refuse to run as root.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    worker::run().map_err(Into::into)
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker requires a Unix platform".into())
}

#[cfg(unix)]
mod worker {
    use std::ffi::CString;
    use std::io::Read;

    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use thiserror::Error;

    use super::BoxError;

    const CLUSTER_USER: &str = "nobody";

    #[derive(Debug, Error)]
    pub(super) enum WorkerError {
        #[error("usage: pg_worker <setup|start|stop> <config-path>: {0}")]
        Usage(String),
        #[error("cannot read worker config {path}: {source}")]
        ConfigRead {
            path: Utf8PathBuf,
            #[source]
            source: BoxError,
        },
        #[error("invalid worker config: {0}")]
        ConfigParse(#[from] serde_json::Error),
        #[error("invalid cluster settings: {0}")]
        Settings(String),
        #[error("cannot switch to the cluster account: {0}")]
        PrivilegeDrop(String),
        #[error("cannot build runtime: {0}")]
        Runtime(#[source] std::io::Error),
        #[error("postgres {operation:?} failed: {message}")]
        Postgres { operation: Operation, message: String },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(super) enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl Operation {
        fn from_arg(arg: &str) -> Result<Self, WorkerError> {
            match arg {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::Usage(format!("unknown operation '{other}'"))),
            }
        }

        fn failed(self, err: &impl std::fmt::Display) -> WorkerError {
            WorkerError::Postgres {
                operation: self,
                message: err.to_string(),
            }
        }
    }

    pub(super) fn run() -> Result<(), WorkerError> {
        let args = std::env::args_os()
            .map(|arg| {
                arg.into_string()
                    .map_err(|_| WorkerError::Usage("arguments must be UTF-8".to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (operation, config_path) = parse_args(args)?;
        let payload = load_payload(&config_path)?;
        become_cluster_user()?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Settings(err.to_string()))?;
        apply_environment(&payload.environment);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)?;
        runtime.block_on(execute(operation, PostgreSQL::new(settings)))
    }

    fn parse_args<I>(args: I) -> Result<(Operation, Utf8PathBuf), WorkerError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut remaining = args.into_iter().skip(1);
        let operation = remaining
            .next()
            .ok_or_else(|| WorkerError::Usage("missing operation".to_owned()))
            .and_then(|arg| Operation::from_arg(&arg))?;
        let config_path = remaining
            .next()
            .map(Utf8PathBuf::from)
            .ok_or_else(|| WorkerError::Usage("missing config path".to_owned()))?;
        if let Some(extra) = remaining.next() {
            return Err(WorkerError::Usage(format!("unexpected argument '{extra}'")));
        }
        Ok((operation, config_path))
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let bytes = read_config(path).map_err(|source| WorkerError::ConfigRead {
            path: path.to_owned(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn read_config(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
        let (dir, relative) = ambient_dir_and_path(path)?;
        let mut file = dir.open(relative.as_std_path())?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn become_cluster_user() -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let denied = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());
        let user = User::from_name(CLUSTER_USER)
            .map_err(denied)?
            .ok_or_else(|| WorkerError::PrivilegeDrop("account not found".to_owned()))?;
        let name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;

        initgroups(&name, user.gid).map_err(denied)?;
        setgid(user.gid).map_err(denied)?;
        setuid(user.uid).map_err(denied)?;

        // SAFETY: no other threads exist yet; the runtime is built afterwards.
        unsafe {
            std::env::set_var("HOME", &user.dir);
            std::env::set_var("USER", &user.name);
            std::env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: still single-threaded; see `become_cluster_user`.
            unsafe {
                match value {
                    Some(secret) => std::env::set_var(key, secret.expose()),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    async fn execute(operation: Operation, mut postgres: PostgreSQL) -> Result<(), WorkerError> {
        match operation {
            Operation::Setup => {
                postgres
                    .setup()
                    .await
                    .map_err(|err| operation.failed(&err))?;
                start_if_stopped(operation, &mut postgres).await
            }
            Operation::Start => {
                start_if_stopped(operation, &mut postgres).await?;
                // The server must outlive this process.
                std::mem::forget(postgres);
                Ok(())
            }
            Operation::Stop => postgres.stop().await.map_err(|err| operation.failed(&err)),
        }
    }

    async fn start_if_stopped(
        operation: Operation,
        postgres: &mut PostgreSQL,
    ) -> Result<(), WorkerError> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres
            .start()
            .await
            .map_err(|err| operation.failed(&err))
    }

}
