//! Wire types for the admin import endpoints.
//!
//! These match the JSON the backend sends. They are decoded leniently and
//! converted into the `auraa_core` domain types at the client boundary.

use auraa_core::{JobId, JobState, JobStatus, Provider};
use serde::{Deserialize, Deserializer, Serialize};

/// Response of `POST /api/admin/import-fast`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Whether the backend accepted the import.
    #[serde(default)]
    pub success: bool,
    /// Id of the created job (present on success).
    #[serde(default)]
    pub task_id: Option<String>,
    /// Explanation when `success` is false.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/admin/sync-now`.
#[derive(Debug, Serialize)]
pub struct SyncRequest {
    /// Marketplace to sync.
    pub provider: Provider,
}

/// Response of `POST /api/admin/sync-now`.
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    /// Whether the sync was started.
    #[serde(default)]
    pub success: bool,
    /// Explanation when `success` is false.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /api/admin/import-jobs/{job_id}`.
///
/// Counters may be missing, null or fractional; all of those decode without
/// error so that an out-of-contract backend never breaks polling.
#[derive(Debug, Deserialize)]
pub struct JobStatusResponse {
    /// Echo of the job id.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Job state.
    pub status: JobState,
    /// Completion percentage.
    #[serde(default, deserialize_with = "lenient_count")]
    pub percent: u64,
    /// Items processed so far.
    #[serde(default, deserialize_with = "lenient_count")]
    pub processed_items: u64,
    /// Items expected in total.
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_items: u64,
}

impl JobStatusResponse {
    /// Convert into a domain snapshot for the job that was polled.
    ///
    /// A missing or blank `job_id` falls back to `polled`.
    #[must_use]
    pub fn into_status(self, polled: &JobId) -> JobStatus {
        let job_id = self
            .job_id
            .filter(|id| !id.trim().is_empty())
            .map_or_else(|| polled.clone(), JobId::from);

        JobStatus {
            job_id,
            state: self.status,
            percent: u32::try_from(self.percent).unwrap_or(u32::MAX),
            processed_items: self.processed_items,
            total_items: self.total_items,
        }
    }
}

/// Extract a readable message from an error response body.
///
/// Looks for a string `detail`, `message` or `error` field in a JSON body,
/// then falls back to the raw text truncated to [`MAX_DETAIL_CHARS`].
#[must_use]
pub fn error_detail_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        for key in ["detail", "message", "error"] {
            if let Some(serde_json::Value::String(text)) = map.get(key) {
                return Some(text.clone());
            }
        }
    }

    Some(trimmed.chars().take(MAX_DETAIL_CHARS).collect())
}

/// Longest raw body kept as an error detail.
pub const MAX_DETAIL_CHARS: usize = 512;

/// Accept integers, floats, null and negatives for a non-negative counter.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(match value {
        Some(v) if v.is_finite() && v > 0.0 => v.floor() as u64,
        _ => 0,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_full_body() {
        let json = r#"{
            "job_id": "job-1",
            "status": "running",
            "percent": 45,
            "processed_items": 225,
            "total_items": 500
        }"#;

        let response: JobStatusResponse = serde_json::from_str(json).unwrap();
        let status = response.into_status(&JobId::new("job-1"));

        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.percent, 45);
        assert_eq!(status.processed_items, 225);
        assert_eq!(status.total_items, 500);
    }

    #[test]
    fn test_job_status_minimal_body() {
        let json = r#"{"status": "completed", "percent": 100}"#;

        let response: JobStatusResponse = serde_json::from_str(json).unwrap();
        let status = response.into_status(&JobId::new("job-7"));

        assert_eq!(status.job_id, JobId::new("job-7"));
        assert_eq!(status.state, JobState::Completed);
        assert_eq!(status.percent, 100);
        assert_eq!(status.processed_items, 0);
        assert_eq!(status.total_items, 0);
    }

    #[test]
    fn test_job_status_out_of_contract_values_are_kept() {
        let json = r#"{
            "status": "running",
            "percent": 140.7,
            "processed_items": 600,
            "total_items": 500
        }"#;

        let response: JobStatusResponse = serde_json::from_str(json).unwrap();
        let status = response.into_status(&JobId::new("job-1"));

        assert_eq!(status.percent, 140);
        assert_eq!(status.processed_items, 600);
        assert_eq!(status.total_items, 500);
    }

    #[test]
    fn test_job_status_null_and_negative_counters() {
        let json = r#"{"status": "pending", "percent": null, "processed_items": -3}"#;

        let response: JobStatusResponse = serde_json::from_str(json).unwrap();
        let status = response.into_status(&JobId::new("job-1"));

        assert_eq!(status.percent, 0);
        assert_eq!(status.processed_items, 0);
    }

    #[test]
    fn test_job_status_unknown_state_is_an_error() {
        let json = r#"{"status": "exploded"}"#;
        assert!(serde_json::from_str::<JobStatusResponse>(json).is_err());
    }

    #[test]
    fn test_submit_response_defaults() {
        let response: SubmitResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.success);
        assert!(response.task_id.is_none());
    }

    #[test]
    fn test_error_detail_prefers_json_fields() {
        assert_eq!(
            error_detail_from_body(r#"{"detail": "count too large"}"#).as_deref(),
            Some("count too large")
        );
        assert_eq!(
            error_detail_from_body(r#"{"message": "token expired"}"#).as_deref(),
            Some("token expired")
        );
        assert_eq!(
            error_detail_from_body(r#"{"error": "boom"}"#).as_deref(),
            Some("boom")
        );
    }

    #[test]
    fn test_error_detail_raw_and_empty() {
        assert_eq!(
            error_detail_from_body("Bad Gateway").as_deref(),
            Some("Bad Gateway")
        );
        assert!(error_detail_from_body("   ").is_none());

        let long = "x".repeat(2000);
        assert_eq!(
            error_detail_from_body(&long).map(|d| d.len()),
            Some(MAX_DETAIL_CHARS)
        );
    }
}
