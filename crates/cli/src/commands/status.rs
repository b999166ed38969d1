//! One-shot job status check.

use auraa_admin::AdminConfig;
use auraa_core::JobId;
use tracing::info;

use super::CommandError;

/// Fetch and log the current status of `job_id`.
///
/// # Errors
///
/// Returns the fetch failure if the backend cannot be reached or does not
/// know the job.
pub async fn run(config: &AdminConfig, job_id: JobId) -> Result<(), CommandError> {
    let client = super::client(config)?;
    let status = client.fetch_status(&job_id).await?;

    info!(
        job_id = %status.job_id,
        state = %status.state,
        percent = status.percent,
        processed_items = status.processed_items,
        total_items = status.total_items,
        terminal = status.is_terminal(),
        "Job status",
    );
    Ok(())
}
