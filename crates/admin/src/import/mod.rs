//! Bulk import workflow: submit a job, poll it, publish progress.
//!
//! # Components
//!
//! - [`ImportController`] - the only entry point for callers; owns the
//!   current polling session and its generation counter
//! - [`PollScheduler`] - fixed-interval polling of one job, at most one fetch
//!   outstanding
//! - [`JobProgressModel`] - latest [`ProgressSnapshot`], replaced wholesale
//!
//! # Flow
//!
//! ```text
//! start_import(req) ─► validate ─► submit ─► PollScheduler::start(job_id)
//!                                                │ every interval
//!                                                ▼
//!                                    fetch_status ─► SessionSink ─► JobProgressModel
//!                                                (generation check)
//! ```

mod controller;
mod progress;
mod scheduler;

pub use controller::ImportController;
pub use progress::{JobProgressModel, PollWarning, ProgressSnapshot};
pub use scheduler::{
    DEFAULT_POLL_INTERVAL, Delivery, ManualPoll, PollOutcome, PollScheduler, PollState,
    StatusSink,
};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! Scripted in-memory [`JobApi`] for timing tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use auraa_core::{ImportRequest, JobHandle, JobId, JobState, JobStatus, Provider};
    use chrono::Utc;
    use tokio::time::Instant;

    use crate::api::{FetchError, JobApi, SubmitError};

    pub fn status(job_id: &str, state: JobState, percent: u32) -> JobStatus {
        counted_status(job_id, state, percent, 0, 0)
    }

    pub fn counted_status(
        job_id: &str,
        state: JobState,
        percent: u32,
        processed_items: u64,
        total_items: u64,
    ) -> JobStatus {
        JobStatus {
            job_id: JobId::new(job_id),
            state,
            percent,
            processed_items,
            total_items,
        }
    }

    /// Responses are consumed in order; the last one repeats once the
    /// script runs out. Submissions default to `job-1`.
    #[derive(Default)]
    pub struct FakeApi {
        submits: Mutex<VecDeque<Result<JobHandle, SubmitError>>>,
        statuses: Mutex<VecDeque<Result<JobStatus, FetchError>>>,
        submit_delay: Duration,
        fetch_delay: Duration,
        submit_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
        sync_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        polled: Mutex<Vec<JobId>>,
        fetch_started: Mutex<Vec<Instant>>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_submit_delay(mut self, delay: Duration) -> Self {
            self.submit_delay = delay;
            self
        }

        pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
            self.fetch_delay = delay;
            self
        }

        pub fn push_submit(&self, result: Result<JobHandle, SubmitError>) {
            self.submits.lock().unwrap().push_back(result);
        }

        pub fn push_status(&self, result: Result<JobStatus, FetchError>) {
            self.statuses.lock().unwrap().push_back(result);
        }

        pub fn submit_calls(&self) -> usize {
            self.submit_calls.load(Ordering::SeqCst)
        }

        pub fn fetch_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }

        pub fn sync_calls(&self) -> usize {
            self.sync_calls.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        pub fn polled(&self) -> Vec<JobId> {
            self.polled.lock().unwrap().clone()
        }

        pub fn fetch_started(&self) -> Vec<Instant> {
            self.fetch_started.lock().unwrap().clone()
        }

        fn next<T: Clone>(script: &Mutex<VecDeque<T>>) -> Option<T> {
            let mut script = script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        }
    }

    struct InFlight<'a>(&'a AtomicUsize);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl JobApi for FakeApi {
        async fn submit(&self, _request: &ImportRequest) -> Result<JobHandle, SubmitError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            let result = Self::next(&self.submits)
                .unwrap_or_else(|| Ok(JobHandle::new(JobId::new("job-1"), Utc::now())));
            if !self.submit_delay.is_zero() {
                tokio::time::sleep(self.submit_delay).await;
            }
            result
        }

        async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, FetchError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.polled.lock().unwrap().push(job_id.clone());
            self.fetch_started.lock().unwrap().push(Instant::now());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _in_flight = InFlight(&self.in_flight);

            let result = Self::next(&self.statuses)
                .unwrap_or_else(|| Ok(status(job_id.as_str(), JobState::Running, 0)));
            if !self.fetch_delay.is_zero() {
                tokio::time::sleep(self.fetch_delay).await;
            }
            result
        }

        async fn sync_now(&self, _provider: Provider) -> Result<(), SubmitError> {
            self.sync_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
