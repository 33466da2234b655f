//! Identity port resolving the calling principal.

use crate::project::domain::Role;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity lookups.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity of the caller of a project operation.
///
/// Implementations are resolved per request. The project service queries
/// them afresh on every access check and never caches the answers.
#[async_trait]
pub trait IdentityOracle: Send + Sync {
    /// Returns the caller's username.
    async fn current_username(&self) -> IdentityResult<String>;

    /// Returns whether `username` holds `role`.
    async fn has_role(&self, username: &str, role: Role) -> IdentityResult<bool>;

    /// Returns the caller's access token for downstream service calls.
    async fn current_access_token(&self) -> IdentityResult<String>;
}

/// Errors returned by identity oracle implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// No authenticated principal is bound to the request.
    #[error("no authenticated caller")]
    Unauthenticated,

    /// The identity provider could not answer.
    #[error("identity provider error: {0}")]
    Provider(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityError {
    /// Wraps an identity provider failure.
    pub fn provider(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Provider(Arc::new(err))
    }
}
