//! Caller roles and the project ownership access policy.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles recognised by the project access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Administrator with access to every project.
    Admin,
    /// Manager limited to the projects they own.
    Manager,
    /// Employee with no access to project records.
    Employee,
}

impl Role {
    /// Returns the role name as registered with the identity provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Role memberships of the caller that the access policy depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallerRoles {
    /// Caller holds [`Role::Manager`].
    pub is_manager: bool,
    /// Caller holds [`Role::Employee`].
    pub is_employee: bool,
}

/// Reason an access check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenial {
    /// Employees never access project records.
    EmployeeRole,
    /// Managers only access the projects assigned to them.
    NotAssignedManager,
}

/// Outcome of [`check_access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The caller may act on the project.
    Allowed,
    /// The caller may not act on the project.
    Denied(AccessDenial),
}

impl AccessDecision {
    /// Returns whether access was granted.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides whether `username` may act on a project owned by
/// `assigned_manager`.
///
/// Employees are always denied. Managers are denied on projects assigned to
/// someone else. Everyone else, administrators included, is allowed.
#[must_use]
pub fn check_access(username: &str, roles: CallerRoles, assigned_manager: &str) -> AccessDecision {
    if roles.is_employee {
        return AccessDecision::Denied(AccessDenial::EmployeeRole);
    }

    if roles.is_manager && username != assigned_manager {
        return AccessDecision::Denied(AccessDenial::NotAssignedManager);
    }

    AccessDecision::Allowed
}
