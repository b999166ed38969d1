//! Fixed-interval status polling for one job at a time.
//!
//! ```text
//!            start(job)                 terminal status / stop() / stale
//!   Idle ───────────────► Polling ──────────────────────────────────────► Stopped
//!                            ▲                                              │
//!                            └──────────────────── start(job) ──────────────┘
//! ```
//!
//! The first fetch fires one interval after [`PollScheduler::start`], then
//! once per interval. At most one fetch is outstanding per scheduler: the
//! timer loop awaits each fetch before waiting for the next tick, and manual
//! polls share an in-flight flag with the timer. Ticks stay on the grid set by
//! `start`: a tick that comes due while a fetch is outstanding is dropped, so
//! a slow fetch is followed by the next grid tick, never an immediate one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use auraa_core::{JobId, JobStatus};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{FetchError, JobApi};

/// Poll interval used by the admin import pages.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Observable scheduler state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Never started.
    Idle,
    /// Timer active for `job_id`.
    Polling {
        /// Job being polled.
        job_id: JobId,
    },
    /// Timer cleared; may be started again.
    Stopped,
}

/// Whether the receiver accepted a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The result was published.
    Applied,
    /// The session the result belongs to is no longer current.
    Stale,
}

/// Receiver of poll results.
pub trait StatusSink: Send + Sync + 'static {
    /// A poll succeeded.
    fn on_status(&self, status: JobStatus) -> Delivery;

    /// A poll failed; polling continues unless the delivery is stale.
    fn on_error(&self, error: FetchError, consecutive_failures: u32) -> Delivery;
}

/// Result of a single poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A non-terminal status was delivered.
    Delivered,
    /// A terminal status was delivered and the scheduler stopped.
    Terminal,
    /// The fetch failed and the error was delivered.
    Failed,
    /// Another fetch was already outstanding.
    Skipped,
    /// The session was stopped while the fetch was in flight.
    Cancelled,
    /// The sink rejected the result and the scheduler stopped.
    Stale,
    /// No polling session is active.
    Inactive,
}

/// Drives `fetch_status` for one job on a fixed interval.
pub struct PollScheduler<A, S> {
    api: Arc<A>,
    interval: Duration,
    session: Option<Session<A, S>>,
}

struct Session<A, S> {
    job_id: JobId,
    cancel: CancellationToken,
    ctx: Arc<TickContext<A, S>>,
    task: JoinHandle<()>,
}

struct TickContext<A, S> {
    api: Arc<A>,
    job_id: JobId,
    sink: S,
    cancel: CancellationToken,
    in_flight: AtomicBool,
    consecutive_failures: AtomicU32,
}

/// A manual status check bound to the session that was active when it was
/// taken. Obtained from [`PollScheduler::manual_poll`].
pub struct ManualPoll<A, S> {
    ctx: Arc<TickContext<A, S>>,
}

impl<A: JobApi, S: StatusSink> PollScheduler<A, S> {
    /// Create an idle scheduler.
    #[must_use]
    pub const fn new(api: Arc<A>, interval: Duration) -> Self {
        Self {
            api,
            interval,
            session: None,
        }
    }

    /// Poll interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PollState {
        match &self.session {
            None => PollState::Idle,
            Some(session) if session.cancel.is_cancelled() => PollState::Stopped,
            Some(session) => PollState::Polling {
                job_id: session.job_id.clone(),
            },
        }
    }

    /// Start polling `job_id`, delivering results to `sink`.
    ///
    /// Any running timer is cleared first, so two timers never coexist.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&mut self, job_id: JobId, sink: S) {
        self.stop();

        let cancel = CancellationToken::new();
        let ctx = Arc::new(TickContext {
            api: Arc::clone(&self.api),
            job_id: job_id.clone(),
            sink,
            cancel: cancel.clone(),
            in_flight: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
        });

        info!(
            job_id = %job_id,
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "Polling started",
        );
        let task = tokio::spawn(run_loop(Arc::clone(&ctx), self.interval));

        self.session = Some(Session {
            job_id,
            cancel,
            ctx,
            task,
        });
    }

    /// Take a manual status check for the active session.
    ///
    /// Returns `None` when no session is polling.
    #[must_use]
    pub fn manual_poll(&self) -> Option<ManualPoll<A, S>> {
        self.session
            .as_ref()
            .filter(|session| !session.cancel.is_cancelled())
            .map(|session| ManualPoll {
                ctx: Arc::clone(&session.ctx),
            })
    }

    /// Poll right now, outside the timer.
    ///
    /// Shares the in-flight guard with the timer: returns
    /// [`PollOutcome::Skipped`] when a fetch is already outstanding.
    pub async fn poll_now(&self) -> PollOutcome {
        match self.manual_poll() {
            Some(poll) => poll.run().await,
            None => PollOutcome::Inactive,
        }
    }
}

impl<A, S> PollScheduler<A, S> {
    /// Stop polling. A no-op when idle or already stopped.
    ///
    /// An outstanding fetch is abandoned and its result never delivered.
    pub fn stop(&mut self) {
        if let Some(session) = &self.session
            && !session.cancel.is_cancelled()
        {
            session.cancel.cancel();
            info!(job_id = %session.job_id, "Polling stopped");
        }
    }

    /// Whether the timer task of the last session has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session
            .as_ref()
            .is_none_or(|session| session.task.is_finished())
    }
}

impl<A, S> Drop for PollScheduler<A, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<A: JobApi, S: StatusSink> ManualPoll<A, S> {
    /// Run the check.
    pub async fn run(self) -> PollOutcome {
        if self.ctx.cancel.is_cancelled() {
            return PollOutcome::Inactive;
        }
        self.ctx.poll_once().await
    }
}

impl<A: JobApi, S: StatusSink> TickContext<A, S> {
    async fn poll_once(&self) -> PollOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(job_id = %self.job_id, "Fetch already in flight, skipping poll");
            return PollOutcome::Skipped;
        };

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return PollOutcome::Cancelled,
            result = self.api.fetch_status(&self.job_id) => result,
        };

        if self.cancel.is_cancelled() {
            debug!(job_id = %self.job_id, "Discarding poll result after stop");
            return PollOutcome::Cancelled;
        }

        match result {
            Ok(status) => {
                self.consecutive_failures.store(0, Ordering::Relaxed);
                let terminal = status.is_terminal();
                if terminal {
                    info!(job_id = %self.job_id, state = %status.state, "Job reached terminal state");
                    self.cancel.cancel();
                }

                match self.sink.on_status(status) {
                    Delivery::Stale => self.stale(),
                    Delivery::Applied if terminal => PollOutcome::Terminal,
                    Delivery::Applied => PollOutcome::Delivered,
                }
            }
            Err(error) => {
                let failures = self
                    .consecutive_failures
                    .fetch_add(1, Ordering::Relaxed)
                    .saturating_add(1);
                warn!(
                    job_id = %self.job_id,
                    error = %error,
                    consecutive_failures = failures,
                    "Status poll failed, will retry on next tick",
                );

                match self.sink.on_error(error, failures) {
                    Delivery::Stale => self.stale(),
                    Delivery::Applied => PollOutcome::Failed,
                }
            }
        }
    }

    fn stale(&self) -> PollOutcome {
        debug!(job_id = %self.job_id, "Session superseded, stopping poll loop");
        self.cancel.cancel();
        PollOutcome::Stale
    }
}

async fn run_loop<A: JobApi, S: StatusSink>(ctx: Arc<TickContext<A, S>>, period: Duration) {
    let mut deadline = Instant::now() + period;

    loop {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            () = tokio::time::sleep_until(deadline) => {}
        }

        ctx.poll_once().await;
        deadline = next_deadline(deadline, period, Instant::now());
    }

    debug!(job_id = %ctx.job_id, "Poll loop exited");
}

/// First tick on the `last + n * period` grid strictly after `now`.
///
/// Ticks that came due while a fetch was outstanding are dropped, not fired
/// late.
fn next_deadline(last: Instant, period: Duration, now: Instant) -> Instant {
    let next = last + period;
    if next > now || period.is_zero() {
        return next;
    }
    let behind = now.duration_since(next).as_nanos() / period.as_nanos();
    let skipped = u32::try_from(behind).unwrap_or(u32::MAX).saturating_add(1);
    next + period.saturating_mul(skipped)
}

/// Marks a fetch as outstanding for as long as it is alive.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
