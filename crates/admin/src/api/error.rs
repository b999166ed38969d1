//! Error types for the import job API client.
//!
//! Errors carry a discriminating `kind` plus a human-readable `detail` and are
//! `Clone`, so they can be stored in progress snapshots and shown as-is.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a job submission (or a sync request) failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitErrorKind {
    /// The backend refused the request contents.
    ValidationRejected,
    /// No session token, or the backend rejected it.
    Unauthorized,
    /// The request never produced an HTTP response.
    NetworkError,
    /// The backend failed or answered with something unreadable.
    ServerError,
}

impl SubmitErrorKind {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            StatusCode::NOT_FOUND => Self::ServerError,
            s if s.is_client_error() => Self::ValidationRejected,
            _ => Self::ServerError,
        }
    }
}

impl fmt::Display for SubmitErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ValidationRejected => "rejected",
            Self::Unauthorized => "unauthorized",
            Self::NetworkError => "network error",
            Self::ServerError => "server error",
        })
    }
}

/// A submission that was sent (or attempted) and did not produce a job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct SubmitError {
    /// Failure category.
    pub kind: SubmitErrorKind,
    /// Backend message or transport description.
    pub detail: String,
}

impl SubmitError {
    /// Create a submit error.
    #[must_use]
    pub fn new(kind: SubmitErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Why a status poll failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The backend does not know the job id.
    NotFound,
    /// No session token, or the backend rejected it.
    Unauthorized,
    /// The request never produced an HTTP response.
    NetworkError,
    /// The backend failed or answered with something unreadable.
    ServerError,
}

impl FetchErrorKind {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            StatusCode::NOT_FOUND => Self::NotFound,
            _ => Self::ServerError,
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "job not found",
            Self::Unauthorized => "unauthorized",
            Self::NetworkError => "network error",
            Self::ServerError => "server error",
        })
    }
}

/// A status poll that did not produce a [`JobStatus`](auraa_core::JobStatus).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct FetchError {
    /// Failure category.
    pub kind: FetchErrorKind,
    /// Backend message or transport description.
    pub detail: String,
}

impl FetchError {
    /// Create a fetch error.
    #[must_use]
    pub fn new(kind: FetchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Describe a transport-level `reqwest` failure.
pub(crate) fn transport_detail(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
