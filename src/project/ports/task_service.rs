//! Port for the remote task service that owns per-project tasks.

use crate::project::domain::ProjectCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task service calls.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Response envelope returned by every task service operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskServiceResponse {
    /// Whether the task service carried out the request.
    pub success: bool,
    /// Optional diagnostic message.
    #[serde(default)]
    pub message: Option<String>,
    /// Operation-specific payload.
    #[serde(default)]
    pub data: Value,
}

impl TaskServiceResponse {
    /// Creates a successful response carrying `data`.
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    /// Creates a failed response with a diagnostic message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Value::Null,
        }
    }
}

/// Remote task accounting contract.
///
/// Every call carries the caller's access token unchanged; this side never
/// inspects or validates it.
#[async_trait]
pub trait TaskServiceClient: Send + Sync {
    /// Fetches completed and non-completed task counts for a project.
    async fn get_counts_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse>;

    /// Marks every task of a project as completed.
    async fn complete_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse>;

    /// Deletes every task of a project.
    async fn delete_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse>;
}

/// Errors raised while talking to the task service.
#[derive(Debug, Clone, Error)]
pub enum TaskServiceError {
    /// The request URL could not be built from the configured base URL.
    #[error("invalid task service URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response.
    #[error("task service transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The task service answered with a non-success HTTP status.
    #[error("task service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The response body was not a valid envelope.
    #[error("task service response could not be decoded: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskServiceError {
    /// Wraps a transport failure.
    #[must_use]
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Wraps a response decoding failure.
    #[must_use]
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }
}
