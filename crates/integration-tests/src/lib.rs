//! Integration tests for the Auraa admin import client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p auraa-integration-tests
//! ```
//!
//! Every test starts its own `wiremock` server standing in for the backend,
//! so no running services or credentials are needed.
//!
//! # Test Categories
//!
//! - `job_client` - HTTP contract of [`JobClient`]: paths, bearer token,
//!   status code mapping, response decoding
//! - `import_flow` - [`ImportController`](auraa_admin::ImportController)
//!   driving a real client through submit, poll and completion

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use auraa_admin::JobClient;
use auraa_admin::api::{StaticTokenSource, TokenSource};
use serde_json::{Value, json};
use url::Url;
use wiremock::MockServer;

/// Token every helper client sends.
pub const TEST_TOKEN: &str = "test-session-token";

/// Submit endpoint path.
pub const IMPORT_PATH: &str = "/api/admin/import-fast";

/// Sync endpoint path.
pub const SYNC_PATH: &str = "/api/admin/sync-now";

/// Status endpoint path for `job_id`.
#[must_use]
pub fn job_path(job_id: &str) -> String {
    format!("/api/admin/import-jobs/{job_id}")
}

/// Client pointed at `server`, authenticated with [`TEST_TOKEN`].
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
pub fn job_client(server: &MockServer) -> JobClient {
    job_client_with_tokens(server, Arc::new(StaticTokenSource::new(TEST_TOKEN)))
}

/// Client pointed at `server` reading tokens from `tokens`.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn job_client_with_tokens(server: &MockServer, tokens: Arc<dyn TokenSource>) -> JobClient {
    JobClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        tokens,
    )
}

/// Status endpoint body.
#[must_use]
pub fn status_body(job_id: &str, status: &str, percent: u32, processed: u64, total: u64) -> Value {
    json!({
        "job_id": job_id,
        "status": status,
        "percent": percent,
        "processed_items": processed,
        "total_items": total,
    })
}

/// Submit endpoint body for an accepted job.
#[must_use]
pub fn accepted_body(task_id: &str) -> Value {
    json!({ "success": true, "task_id": task_id })
}
