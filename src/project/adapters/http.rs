//! HTTP adapter for the remote task service.

use crate::project::{
    domain::ProjectCode,
    ports::{TaskServiceClient, TaskServiceError, TaskServiceResponse, TaskServiceResult},
};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("projecthub/", env!("CARGO_PKG_VERSION"));

/// Task service client speaking the JSON envelope protocol over HTTP.
///
/// Endpoints, relative to the base URL:
///
/// - `GET    api/v1/task/count/project/{code}`
/// - `PUT    api/v1/task/complete/project/{code}`
/// - `DELETE api/v1/task/delete/project/{code}`
///
/// Each request carries the caller's token as a bearer credential. No retry
/// is attempted; a timeout fails the call.
#[derive(Debug, Clone)]
pub struct HttpTaskServiceClient {
    client: Client,
    base_url: Url,
}

impl HttpTaskServiceClient {
    /// Creates a client for the task service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::InvalidUrl`] when `base_url` is not an
    /// absolute URL that can carry a path, or a transport error when the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> TaskServiceResult<Self> {
        let parsed =
            Url::parse(base_url).map_err(|_| TaskServiceError::InvalidUrl(base_url.to_owned()))?;
        if parsed.cannot_be_a_base() {
            return Err(TaskServiceError::InvalidUrl(base_url.to_owned()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(TaskServiceError::transport)?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Returns the endpoint URL for `action` on the project `code`.
    ///
    /// The code is percent-encoded as a single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::InvalidUrl`] when the base URL cannot take
    /// path segments.
    pub fn endpoint(&self, action: &str, code: &ProjectCode) -> TaskServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TaskServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1", "task", action, "project", code.as_str()]);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        action: &str,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse> {
        let url = self.endpoint(action, code)?;
        debug!(%method, %url, "calling task service");

        let response = self
            .client
            .request(method, url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(TaskServiceError::transport)?;

        decode_envelope(response).await
    }
}

async fn decode_envelope(response: Response) -> TaskServiceResult<TaskServiceResponse> {
    let status = response.status();
    let body = response.text().await.map_err(TaskServiceError::transport)?;

    if !status.is_success() {
        return Err(TaskServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    debug!(%status, %body, "task service response");
    serde_json::from_str(&body).map_err(TaskServiceError::decode)
}

#[async_trait]
impl TaskServiceClient for HttpTaskServiceClient {
    async fn get_counts_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse> {
        self.send(Method::GET, "count", access_token, code).await
    }

    async fn complete_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse> {
        self.send(Method::PUT, "complete", access_token, code).await
    }

    async fn delete_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse> {
        self.send(Method::DELETE, "delete", access_token, code).await
    }
}
