//! Identifier and validated scalar types for the project domain.

use super::ProjectDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a live project code, matching the input contract.
const MAX_PROJECT_CODE_LENGTH: usize = 100;

/// Store-assigned identifier for a persisted project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    /// Wraps an identifier assigned by a project store.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Human-assigned project code used as the external lookup key.
///
/// Codes are unique among live projects only. A soft-deleted project keeps a
/// retired code of the form `<code>-<id>`, which frees the original code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectCode(String);

impl ProjectCode {
    /// Creates a validated project code.
    ///
    /// Surrounding whitespace is trimmed; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyProjectCode`] when the value is
    /// blank or [`ProjectDomainError::ProjectCodeTooLong`] when it exceeds
    /// 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(ProjectDomainError::EmptyProjectCode);
        }

        if normalized.chars().count() > MAX_PROJECT_CODE_LENGTH {
            return Err(ProjectDomainError::ProjectCodeTooLong(normalized.to_owned()));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the code written to a project when it is soft-deleted.
    #[must_use]
    pub fn retired_for(&self, id: ProjectId) -> Self {
        Self(format!("{}-{id}", self.0))
    }

    /// Returns the project code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProjectCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
