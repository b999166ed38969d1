//! Orchestration of a single bulk import.
//!
//! The controller owns one polling session at a time. Each session is tagged
//! with a generation number; starting, superseding or cancelling an import
//! bumps the generation, and a poll result is only published if its
//! generation still matches. The check and the publish happen under the same
//! mutex that `cancel_import` takes, so a cancelled session stays cancelled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use auraa_core::{ImportRequest, JobHandle, JobState, JobStatus, Provider};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::api::{FetchError, JobApi, JobClient, SubmitError};

use super::progress::{JobProgressModel, PollWarning, ProgressSnapshot};
use super::scheduler::{Delivery, PollOutcome, PollScheduler, PollState, StatusSink};

/// Starts, tracks and cancels bulk import jobs.
///
/// All failures are reported through the [`JobProgressModel`]; no method
/// returns an error for the import itself.
pub struct ImportController<A: JobApi = JobClient> {
    api: Arc<A>,
    shared: Arc<Shared<A>>,
}

struct Shared<A: JobApi> {
    model: JobProgressModel,
    session: Mutex<SessionState<A>>,
}

struct SessionState<A: JobApi> {
    generation: u64,
    scheduler: PollScheduler<A, SessionSink<A>>,
    last_job: Option<JobHandle>,
}

/// Delivers poll results for one generation.
struct SessionSink<A: JobApi> {
    generation: u64,
    handle: JobHandle,
    shared: Weak<Shared<A>>,
}

impl<A: JobApi> ImportController<A> {
    /// Create a controller polling every `interval`.
    #[must_use]
    pub fn new(api: Arc<A>, interval: Duration) -> Self {
        let scheduler = PollScheduler::new(Arc::clone(&api), interval);
        Self {
            api,
            shared: Arc::new(Shared {
                model: JobProgressModel::new(),
                session: Mutex::new(SessionState {
                    generation: 0,
                    scheduler,
                    last_job: None,
                }),
            }),
        }
    }

    /// Validate, submit and start polling an import.
    ///
    /// A request that fails validation is returned as
    /// [`ProgressSnapshot::Invalid`] without touching an import already in
    /// progress; the snapshot is only published when nothing is active.
    /// A valid request supersedes any running session: its timer is stopped
    /// and its late results are dropped. Returns the snapshot this call left in
    /// the model, which is the current one unless another call superseded it
    /// while the submission was in flight.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip(self, request), fields(count = request.count, provider = %request.provider))]
    pub async fn start_import(&self, request: ImportRequest) -> ProgressSnapshot {
        let generation = {
            let mut session = self.shared.lock();

            if let Err(error) = request.validate() {
                info!(%error, "Import request rejected before submission");
                let snapshot = ProgressSnapshot::Invalid(error);
                if !self.shared.model.snapshot().is_active() {
                    self.shared.model.replace(snapshot.clone());
                }
                return snapshot;
            }

            let generation = session.begin_generation();
            self.shared.model.replace(ProgressSnapshot::Submitting {
                request: request.clone(),
            });
            generation
        };

        let result = self.api.submit(&request).await;

        let mut session = self.shared.lock();
        if session.generation != generation {
            debug!(
                generation,
                current = session.generation,
                "Discarding submission result for superseded import",
            );
            return self.shared.model.snapshot();
        }

        match result {
            Ok(handle) => {
                info!(job_id = %handle.job_id, "Import job created");
                session.last_job = Some(handle.clone());
                let sink = SessionSink {
                    generation,
                    handle: handle.clone(),
                    shared: Arc::downgrade(&self.shared),
                };
                let snapshot = ProgressSnapshot::Running {
                    handle: handle.clone(),
                    status: None,
                    warning: None,
                };
                self.shared.model.replace(snapshot.clone());
                session.scheduler.start(handle.job_id, sink);
                snapshot
            }
            Err(error) => {
                warn!(%error, "Import submission failed");
                let snapshot = ProgressSnapshot::SubmissionFailed(error);
                self.shared.model.replace(snapshot.clone());
                snapshot
            }
        }
    }

    /// Stop tracking the current import and return to idle.
    ///
    /// Safe to call at any time, any number of times. The backend job is not
    /// cancelled; only client-side polling stops.
    pub fn cancel_import(&self) {
        let mut session = self.shared.lock();
        let generation = session.begin_generation();
        debug!(generation, "Import cancelled");
        self.shared.model.replace(ProgressSnapshot::Idle);
    }

    /// Check the active job's status now instead of waiting for the timer.
    ///
    /// Returns [`PollOutcome::Skipped`] while a fetch is already outstanding
    /// and [`PollOutcome::Inactive`] when nothing is being polled.
    pub async fn refresh(&self) -> PollOutcome {
        let poll = self.shared.lock().scheduler.manual_poll();
        match poll {
            Some(poll) => poll.run().await,
            None => PollOutcome::Inactive,
        }
    }

    /// Trigger an immediate provider sync. Does not affect the import session.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection or transport failure.
    pub async fn sync_now(&self, provider: Provider) -> Result<(), SubmitError> {
        self.api.sync_now(provider).await
    }

    /// Current progress snapshot.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        self.shared.model.snapshot()
    }

    /// Receiver notified on every snapshot change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.shared.model.subscribe()
    }

    /// State of the underlying poll scheduler.
    #[must_use]
    pub fn scheduler_state(&self) -> PollState {
        self.shared.lock().scheduler.state()
    }

    /// The most recently created job, if any.
    #[must_use]
    pub fn last_job(&self) -> Option<JobHandle> {
        self.shared.lock().last_job.clone()
    }
}

impl<A: JobApi> std::fmt::Debug for ImportController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportController")
            .field("progress", &self.shared.model.snapshot())
            .finish_non_exhaustive()
    }
}

impl<A: JobApi> Shared<A> {
    fn lock(&self) -> MutexGuard<'_, SessionState<A>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: JobApi> SessionState<A> {
    /// Invalidate the current session and stop its timer.
    fn begin_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.scheduler.stop();
        self.generation
    }
}

impl<A: JobApi> SessionSink<A> {
    fn publish(&self, build: impl FnOnce(&JobProgressModel) -> ProgressSnapshot) -> Delivery {
        let Some(shared) = self.shared.upgrade() else {
            return Delivery::Stale;
        };
        let session = shared.lock();
        if session.generation != self.generation {
            return Delivery::Stale;
        }
        let snapshot = build(&shared.model);
        shared.model.replace(snapshot);
        drop(session);
        Delivery::Applied
    }
}

impl<A: JobApi> StatusSink for SessionSink<A> {
    fn on_status(&self, status: JobStatus) -> Delivery {
        let handle = self.handle.clone();
        self.publish(move |_| match status.state {
            JobState::Completed => ProgressSnapshot::Completed { handle, status },
            JobState::Failed => ProgressSnapshot::Failed { handle, status },
            JobState::Pending | JobState::Running => ProgressSnapshot::Running {
                handle,
                status: Some(status),
                warning: None,
            },
        })
    }

    fn on_error(&self, error: FetchError, consecutive_failures: u32) -> Delivery {
        let handle = self.handle.clone();
        self.publish(move |model| ProgressSnapshot::Running {
            handle,
            status: model.snapshot().status().cloned(),
            warning: Some(PollWarning {
                error,
                consecutive_failures,
            }),
        })
    }
}
