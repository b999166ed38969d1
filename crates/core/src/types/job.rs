//! Submitted jobs and their progress snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, JobState};

/// A job accepted by the backend.
///
/// Created from a successful submission and kept for display after the
/// polling session that tracked it has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Backend-assigned job identifier.
    pub job_id: JobId,
    /// When the submission was accepted.
    pub submitted_at: DateTime<Utc>,
}

impl JobHandle {
    /// Create a handle for a job accepted at `submitted_at`.
    #[must_use]
    pub const fn new(job_id: JobId, submitted_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            submitted_at,
        }
    }
}

/// Progress of a job as of one status poll.
///
/// Snapshots are replaced wholesale, never patched field by field. Values
/// are kept exactly as the backend reported them: `percent` is not clamped
/// or recomputed, and `processed_items > total_items` is carried through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Job the snapshot belongs to.
    pub job_id: JobId,
    /// Lifecycle state.
    pub state: JobState,
    /// Completion percentage as reported by the backend.
    pub percent: u32,
    /// Items processed so far.
    pub processed_items: u64,
    /// Items the job expects to process (0 when not yet known).
    pub total_items: u64,
}

impl JobStatus {
    /// Whether this snapshot ends the job.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: JobState) -> JobStatus {
        JobStatus {
            job_id: JobId::new("job-1"),
            state,
            percent: 45,
            processed_items: 225,
            total_items: 500,
        }
    }

    #[test]
    fn test_is_terminal_follows_state() {
        assert!(!status(JobState::Running).is_terminal());
        assert!(status(JobState::Completed).is_terminal());
        assert!(status(JobState::Failed).is_terminal());
    }
}
