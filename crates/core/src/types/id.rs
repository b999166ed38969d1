//! Opaque job identifiers.
//!
//! The backend hands out job ids as strings (`task_id` on submission,
//! `job_id` on status). [`JobId`] wraps them so they cannot be confused with
//! search queries or other free-form strings travelling through the same code.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a backend import job.
///
/// The value is opaque: it is never parsed, only compared and echoed back
/// to the backend in the status URL.
///
/// # Example
///
/// ```rust
/// # use auraa_core::JobId;
/// let id = JobId::new("job-1");
/// assert_eq!(id.as_str(), "job-1");
/// assert_eq!(id.to_string(), "job-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Create a new job ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `JobId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let id = JobId::new("job-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"job-42\"");

        let parsed: JobId = serde_json::from_str("\"job-42\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_conversions() {
        let id: JobId = "abc".into();
        let raw: String = id.clone().into();
        assert_eq!(raw, "abc");
        assert_eq!(id.into_inner(), "abc");
    }
}
