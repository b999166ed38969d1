//! Follow a bulk import from submission to completion.
//!
//! # Usage
//!
//! ```bash
//! auraa import -c 500 -q "jewelry accessories" -p aliexpress --timeout 900
//! ```
//!
//! Progress is reported through the log. Ctrl+C or `--timeout` stops polling
//! locally; the backend job keeps running and can be checked later with
//! `auraa status <JOB_ID>`.

use std::sync::Arc;
use std::time::Duration;

use auraa_admin::{AdminConfig, ImportController, ProgressSnapshot};
use auraa_core::{ImportRequest, JobStatus, Provider};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::CommandError;

/// Arguments of `auraa import`.
#[derive(Debug)]
pub struct ImportOptions {
    pub count: u32,
    pub query: String,
    pub provider: Provider,
    pub timeout: Option<Duration>,
}

/// Submit an import and poll it until it completes, fails or is interrupted.
///
/// # Errors
///
/// Returns an error unless the job reaches `completed`.
pub async fn run(config: &AdminConfig, options: ImportOptions) -> Result<(), CommandError> {
    let client = Arc::new(super::client(config)?);
    let controller = ImportController::new(client, config.poll_interval);
    let mut rx = controller.subscribe();

    let request = ImportRequest::new(options.count, options.query, options.provider);
    let started = controller.start_import(request).await;
    match started {
        ProgressSnapshot::Invalid(e) => return Err(CommandError::Invalid(e)),
        ProgressSnapshot::SubmissionFailed(e) => return Err(CommandError::Submit(e)),
        _ => render(&started),
    }

    let timeout = options.timeout;
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };

    let finished = tokio::select! {
        snapshot = follow(&mut rx) => snapshot,
        () = interrupted() => {
            controller.cancel_import();
            return Err(CommandError::Cancelled);
        }
        () = deadline => {
            controller.cancel_import();
            let secs = timeout.map_or(0, |limit| limit.as_secs());
            return Err(CommandError::TimedOut(secs));
        }
    };

    match finished {
        ProgressSnapshot::Completed { .. } => Ok(()),
        ProgressSnapshot::Failed { handle, .. } => {
            Err(CommandError::JobFailed(handle.job_id.into_inner()))
        }
        _ => Err(CommandError::Cancelled),
    }
}

/// Render every snapshot change until the import finishes.
async fn follow(rx: &mut watch::Receiver<ProgressSnapshot>) -> ProgressSnapshot {
    let mut snapshot = rx.borrow_and_update().clone();
    while !snapshot.is_finished() {
        if rx.changed().await.is_err() {
            break;
        }
        snapshot = rx.borrow_and_update().clone();
        render(&snapshot);
    }
    snapshot
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Interrupted, stopping import polling");
}

fn render(snapshot: &ProgressSnapshot) {
    match snapshot {
        ProgressSnapshot::Submitting { request } => info!(
            count = request.count,
            query = %request.query,
            provider = %request.provider,
            "Submitting import",
        ),
        ProgressSnapshot::Running {
            handle,
            status: None,
            warning: None,
        } => info!(job_id = %handle.job_id, "Import job created, waiting for first status"),
        ProgressSnapshot::Running {
            handle,
            warning: Some(warning),
            ..
        } => warn!(
            job_id = %handle.job_id,
            error = %warning.error,
            consecutive_failures = warning.consecutive_failures,
            "Status check failed, reconnecting",
        ),
        ProgressSnapshot::Running {
            handle,
            status: Some(status),
            warning: None,
        } => info!(
            job_id = %handle.job_id,
            state = %status.state,
            "Import progress: {}",
            progress_line(status),
        ),
        ProgressSnapshot::Completed { handle, status } => info!(
            job_id = %handle.job_id,
            "Import completed: {}",
            progress_line(status),
        ),
        ProgressSnapshot::Failed { handle, status } => warn!(
            job_id = %handle.job_id,
            "Import failed: {}",
            progress_line(status),
        ),
        other => debug!(?other, "Progress changed"),
    }
}

/// `"40% (200/500 items)"`, or just the percentage when totals are unknown.
fn progress_line(status: &JobStatus) -> String {
    if status.total_items == 0 {
        format!("{}%", status.percent)
    } else {
        format!(
            "{}% ({}/{} items)",
            status.percent, status.processed_items, status.total_items
        )
    }
}

#[cfg(test)]
mod tests {
    use auraa_core::{JobId, JobState};

    use super::*;

    fn status(percent: u32, processed_items: u64, total_items: u64) -> JobStatus {
        JobStatus {
            job_id: JobId::new("job-1"),
            state: JobState::Running,
            percent,
            processed_items,
            total_items,
        }
    }

    #[test]
    fn test_progress_line_with_totals() {
        assert_eq!(progress_line(&status(40, 200, 500)), "40% (200/500 items)");
    }

    #[test]
    fn test_progress_line_without_totals() {
        assert_eq!(progress_line(&status(0, 0, 0)), "0%");
    }
}
