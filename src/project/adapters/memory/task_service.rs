//! In-memory task service adapter for project lifecycle tests.

use crate::project::{
    domain::{ProjectCode, TaskCounts},
    ports::{TaskServiceClient, TaskServiceError, TaskServiceResponse, TaskServiceResult},
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Task service operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOperation {
    /// `get_counts_by_project`.
    Counts,
    /// `complete_by_project`.
    Complete,
    /// `delete_by_project`.
    Delete,
}

/// In-memory stand-in for the remote task service.
///
/// Counts default to zero for unknown projects. Failures are reported as
/// `success: false` envelopes, the same shape the remote service uses.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskService {
    state: Arc<RwLock<InMemoryTaskServiceState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskServiceState {
    counts: HashMap<String, TaskCounts>,
    failures: HashSet<(TaskOperation, String)>,
    completed_projects: Vec<String>,
    deleted_projects: Vec<String>,
    seen_tokens: Vec<String>,
}

impl InMemoryTaskService {
    /// Creates an empty in-memory task service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the task counts reported for `code`.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn set_counts(&self, code: &str, counts: TaskCounts) -> TaskServiceResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))?;
        state.counts.insert(code.to_owned(), counts);
        Ok(())
    }

    /// Makes `operation` report failure for `code`.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn fail_on(&self, operation: TaskOperation, code: &str) -> TaskServiceResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))?;
        state.failures.insert((operation, code.to_owned()));
        Ok(())
    }

    /// Returns the project codes whose tasks were completed, in call order.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn completed_projects(&self) -> TaskServiceResult<Vec<String>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))?;
        Ok(state.completed_projects.clone())
    }

    /// Returns the project codes whose tasks were deleted, in call order.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn deleted_projects(&self) -> TaskServiceResult<Vec<String>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))?;
        Ok(state.deleted_projects.clone())
    }

    /// Returns every access token presented so far, in call order.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn seen_tokens(&self) -> TaskServiceResult<Vec<String>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))?;
        Ok(state.seen_tokens.clone())
    }

    fn record_call(
        &self,
        operation: TaskOperation,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<Option<TaskServiceResponse>> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))?;
        state.seen_tokens.push(access_token.to_owned());

        if state
            .failures
            .contains(&(operation, code.as_str().to_owned()))
        {
            return Ok(Some(TaskServiceResponse::failed(format!(
                "{operation:?} failed for project {code}"
            ))));
        }

        match operation {
            TaskOperation::Counts => {}
            TaskOperation::Complete => state.completed_projects.push(code.as_str().to_owned()),
            TaskOperation::Delete => state.deleted_projects.push(code.as_str().to_owned()),
        }
        Ok(None)
    }
}

#[async_trait]
impl TaskServiceClient for InMemoryTaskService {
    async fn get_counts_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse> {
        if let Some(failure) = self.record_call(TaskOperation::Counts, access_token, code)? {
            return Ok(failure);
        }

        let state = self
            .state
            .read()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))?;
        let counts = state
            .counts
            .get(code.as_str())
            .copied()
            .unwrap_or_default();
        Ok(TaskServiceResponse::ok(json!({
            "completedTaskCount": counts.completed(),
            "nonCompletedTaskCount": counts.non_completed(),
        })))
    }

    async fn complete_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse> {
        Ok(self
            .record_call(TaskOperation::Complete, access_token, code)?
            .unwrap_or_else(|| TaskServiceResponse::ok(serde_json::Value::Null)))
    }

    async fn delete_by_project(
        &self,
        access_token: &str,
        code: &ProjectCode,
    ) -> TaskServiceResult<TaskServiceResponse> {
        Ok(self
            .record_call(TaskOperation::Delete, access_token, code)?
            .unwrap_or_else(|| TaskServiceResponse::ok(serde_json::Value::Null)))
    }
}
