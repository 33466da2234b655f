//! Fixed identity adapter for pre-authenticated callers.

use crate::project::{
    domain::Role,
    ports::{IdentityError, IdentityOracle, IdentityResult},
};
use async_trait::async_trait;
use std::collections::HashSet;

/// Identity whose username, roles and token were resolved up front.
///
/// Transport layers build one per request from verified credentials; the CLI
/// builds one from its arguments. Role queries only answer for the bound
/// username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    username: String,
    roles: HashSet<Role>,
    access_token: String,
}

impl StaticIdentity {
    /// Creates an identity with no roles.
    #[must_use]
    pub fn new(username: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: HashSet::new(),
            access_token: access_token.into(),
        }
    }

    /// Grants `role` to the identity.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Grants every role in `roles` to the identity.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }
}

#[async_trait]
impl IdentityOracle for StaticIdentity {
    async fn current_username(&self) -> IdentityResult<String> {
        if self.username.trim().is_empty() {
            return Err(IdentityError::Unauthenticated);
        }
        Ok(self.username.clone())
    }

    async fn has_role(&self, username: &str, role: Role) -> IdentityResult<bool> {
        Ok(username == self.username && self.roles.contains(&role))
    }

    async fn current_access_token(&self) -> IdentityResult<String> {
        if self.access_token.is_empty() {
            return Err(IdentityError::Unauthenticated);
        }
        Ok(self.access_token.clone())
    }
}
