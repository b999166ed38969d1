//! Client-side view of an import's progress.
//!
//! [`JobProgressModel`] holds exactly one [`ProgressSnapshot`] and replaces it
//! wholesale; renderers read the latest value or subscribe to changes. The
//! model has no business logic: deciding *which* snapshot to publish is the
//! controller's job.

use auraa_core::{ImportRequest, JobHandle, JobStatus, ValidationError};
use tokio::sync::watch;

use crate::api::{FetchError, SubmitError};

/// A failed poll shown next to the last good status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollWarning {
    /// The most recent fetch failure.
    pub error: FetchError,
    /// Failures in a row since the last successful poll.
    pub consecutive_failures: u32,
}

/// Everything a renderer needs to draw the import panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProgressSnapshot {
    /// No job.
    #[default]
    Idle,
    /// The request failed local validation; nothing was sent.
    Invalid(ValidationError),
    /// The request is on its way to the backend.
    Submitting {
        /// What was submitted.
        request: ImportRequest,
    },
    /// The backend did not create a job; polling never started.
    SubmissionFailed(SubmitError),
    /// The job exists and is being polled.
    Running {
        /// The job being tracked.
        handle: JobHandle,
        /// Last status received, if any poll has succeeded yet.
        status: Option<JobStatus>,
        /// Set while polls are failing ("reconnecting").
        warning: Option<PollWarning>,
    },
    /// The backend reported `completed`.
    Completed {
        /// The finished job.
        handle: JobHandle,
        /// Final status.
        status: JobStatus,
    },
    /// The backend reported `failed`.
    Failed {
        /// The failed job.
        handle: JobHandle,
        /// Final status.
        status: JobStatus,
    },
}

impl ProgressSnapshot {
    /// Whether the workflow has ended and the start control can be re-enabled.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Invalid(_) | Self::SubmissionFailed(_) | Self::Completed { .. } | Self::Failed { .. }
        )
    }

    /// Whether an import is currently in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Submitting { .. } | Self::Running { .. })
    }

    /// The job this snapshot refers to, if one was created.
    #[must_use]
    pub const fn handle(&self) -> Option<&JobHandle> {
        match self {
            Self::Running { handle, .. }
            | Self::Completed { handle, .. }
            | Self::Failed { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// Latest job status carried by this snapshot.
    #[must_use]
    pub const fn status(&self) -> Option<&JobStatus> {
        match self {
            Self::Running { status, .. } => status.as_ref(),
            Self::Completed { status, .. } | Self::Failed { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// Holder of the latest [`ProgressSnapshot`].
#[derive(Debug)]
pub struct JobProgressModel {
    tx: watch::Sender<ProgressSnapshot>,
}

impl JobProgressModel {
    /// Create a model showing "no job".
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::Idle);
        Self { tx }
    }

    /// Replace the current snapshot.
    pub fn replace(&self, snapshot: ProgressSnapshot) {
        self.tx.send_replace(snapshot);
    }

    /// Copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for JobProgressModel {
    fn default() -> Self {
        Self::new()
    }
}
