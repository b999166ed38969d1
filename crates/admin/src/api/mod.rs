//! Backend import job API.
//!
//! # Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | `POST` | `/api/admin/import-fast` | `{ count, query, provider }` | `{ success, task_id }` |
//! | `GET` | `/api/admin/import-jobs/{job_id}` | - | `{ job_id, status, percent, processed_items, total_items }` |
//! | `POST` | `/api/admin/sync-now` | `{ provider }` | `{ success }` |
//!
//! Every call carries `Authorization: Bearer <token>`.
//!
//! [`JobApi`] is the seam the poll scheduler and controller are written
//! against; [`JobClient`] is the HTTP implementation.

use std::future::Future;
use std::sync::Arc;

use auraa_core::{ImportRequest, JobHandle, JobId, JobStatus, Provider};

mod client;
mod error;
pub mod token;
pub mod types;

pub use client::JobClient;
pub use error::{FetchError, FetchErrorKind, SubmitError, SubmitErrorKind};
pub use token::{FileTokenSource, StaticTokenSource, TokenSource};

/// Operations the import workflow needs from the backend.
pub trait JobApi: Send + Sync + 'static {
    /// Create an import job.
    fn submit(
        &self,
        request: &ImportRequest,
    ) -> impl Future<Output = Result<JobHandle, SubmitError>> + Send;

    /// Read the current status of a job.
    fn fetch_status(
        &self,
        job_id: &JobId,
    ) -> impl Future<Output = Result<JobStatus, FetchError>> + Send;

    /// Trigger an immediate provider sync.
    fn sync_now(&self, provider: Provider) -> impl Future<Output = Result<(), SubmitError>> + Send;
}

impl JobApi for JobClient {
    fn submit(
        &self,
        request: &ImportRequest,
    ) -> impl Future<Output = Result<JobHandle, SubmitError>> + Send {
        Self::submit(self, request)
    }

    fn fetch_status(
        &self,
        job_id: &JobId,
    ) -> impl Future<Output = Result<JobStatus, FetchError>> + Send {
        Self::fetch_status(self, job_id)
    }

    fn sync_now(&self, provider: Provider) -> impl Future<Output = Result<(), SubmitError>> + Send {
        Self::sync_now(self, provider)
    }
}

impl<T: JobApi> JobApi for Arc<T> {
    fn submit(
        &self,
        request: &ImportRequest,
    ) -> impl Future<Output = Result<JobHandle, SubmitError>> + Send {
        (**self).submit(request)
    }

    fn fetch_status(
        &self,
        job_id: &JobId,
    ) -> impl Future<Output = Result<JobStatus, FetchError>> + Send {
        (**self).fetch_status(job_id)
    }

    fn sync_now(&self, provider: Provider) -> impl Future<Output = Result<(), SubmitError>> + Send {
        (**self).sync_now(provider)
    }
}
