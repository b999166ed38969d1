//! CLI subcommands.

use auraa_admin::api::{FetchError, SubmitError};
use auraa_admin::{AdminConfig, JobClient};
use auraa_core::ValidationError;
use thiserror::Error;

pub mod import;
pub mod status;
pub mod sync;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The request failed local validation.
    #[error("Invalid import request: {0}")]
    Invalid(ValidationError),

    /// The backend refused a submission or sync.
    #[error("Submission failed: {0}")]
    Submit(#[from] SubmitError),

    /// A status fetch failed.
    #[error("Status check failed: {0}")]
    Fetch(#[from] FetchError),

    /// The job finished in the `failed` state.
    #[error("Import job {0} failed")]
    JobFailed(String),

    /// The user interrupted the command.
    #[error("Import cancelled")]
    Cancelled,

    /// The job did not finish within `--timeout`.
    #[error("Import did not finish within {0} seconds")]
    TimedOut(u64),
}

/// Create the job client every command talks through.
fn client(config: &AdminConfig) -> Result<JobClient, CommandError> {
    Ok(JobClient::new(&config.api, config.token.source())?)
}
