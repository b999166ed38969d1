//! HTTP client for the admin import endpoints.

use std::sync::Arc;

use auraa_core::{ImportRequest, JobHandle, JobId, JobStatus, Provider};
use chrono::Utc;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;

use super::error::{
    FetchError, FetchErrorKind, SubmitError, SubmitErrorKind, transport_detail,
};
use super::token::TokenSource;
use super::types::{
    JobStatusResponse, SubmitResponse, SyncRequest, SyncResponse, error_detail_from_body,
};

const IMPORT_PATH: &str = "/api/admin/import-fast";
const JOBS_PATH: &str = "/api/admin/import-jobs";
const SYNC_PATH: &str = "/api/admin/sync-now";

const MISSING_TOKEN: &str = "no session token; log in to the admin first";

/// Client for the backend import job API.
///
/// Translates domain operations into HTTP calls and HTTP outcomes into
/// [`SubmitError`] / [`FetchError`]. It has no retry or backoff of its own.
/// The bearer token is read from the [`TokenSource`] on every call.
#[derive(Clone)]
pub struct JobClient {
    inner: Arc<JobClientInner>,
}

struct JobClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

/// Failure while reading a 2xx response body.
enum BodyError {
    Network(String),
    Malformed(String),
}

impl JobClient {
    /// Create a new job client.
    ///
    /// # Arguments
    ///
    /// * `config` - Backend URL and request timeout
    /// * `tokens` - Where to read the session token from
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config.base_url.clone(), tokens))
    }

    /// Create a job client reusing an existing [`reqwest::Client`].
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: Url,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            inner: Arc::new(JobClientInner {
                client,
                base_url,
                tokens,
            }),
        }
    }

    /// Backend origin the client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Submit a bulk import job.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without sending anything when no token is
    /// available, `NetworkError` when no response arrives, and the status
    /// mapping of [`SubmitErrorKind::from_status`] for non-2xx responses. A
    /// 2xx answer with `success: false` is `ValidationRejected`.
    #[instrument(skip(self, request), fields(provider = %request.provider, count = request.count))]
    pub async fn submit(&self, request: &ImportRequest) -> Result<JobHandle, SubmitError> {
        let token = self
            .token()
            .ok_or_else(|| SubmitError::new(SubmitErrorKind::Unauthorized, MISSING_TOKEN))?;

        let response = self
            .inner
            .client
            .post(self.endpoint(IMPORT_PATH))
            .bearer_auth(token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| SubmitError::new(SubmitErrorKind::NetworkError, transport_detail(&e)))?;

        let status = response.status();
        debug!(%status, "Import submission answered");

        if !status.is_success() {
            let detail = error_detail(status, response).await;
            return Err(SubmitError::new(SubmitErrorKind::from_status(status), detail));
        }

        let body: SubmitResponse = read_json(response).await.map_err(submit_body_error)?;

        if !body.success {
            let detail = body
                .message
                .unwrap_or_else(|| "backend declined the import".to_string());
            return Err(SubmitError::new(SubmitErrorKind::ValidationRejected, detail));
        }

        let task_id = body
            .task_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                SubmitError::new(SubmitErrorKind::ServerError, "response is missing task_id")
            })?;

        Ok(JobHandle::new(JobId::new(task_id), Utc::now()))
    }

    /// Fetch the current status of a job.
    ///
    /// Read-only and safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without sending anything when no token is
    /// available, `NetworkError` when no response arrives, and the status
    /// mapping of [`FetchErrorKind::from_status`] for non-2xx responses.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, FetchError> {
        let token = self
            .token()
            .ok_or_else(|| FetchError::new(FetchErrorKind::Unauthorized, MISSING_TOKEN))?;

        let response = self
            .inner
            .client
            .get(self.job_url(job_id))
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| FetchError::new(FetchErrorKind::NetworkError, transport_detail(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(status, response).await;
            return Err(FetchError::new(FetchErrorKind::from_status(status), detail));
        }

        let body: JobStatusResponse = read_json(response).await.map_err(|e| match e {
            BodyError::Network(detail) => FetchError::new(FetchErrorKind::NetworkError, detail),
            BodyError::Malformed(detail) => FetchError::new(FetchErrorKind::ServerError, detail),
        })?;

        Ok(body.into_status(job_id))
    }

    /// Ask the backend to sync a provider's catalogue now.
    ///
    /// Fire-and-forget: the backend runs the sync on its own and nothing is
    /// polled afterwards.
    ///
    /// # Errors
    ///
    /// Same classification as [`JobClient::submit`].
    #[instrument(skip(self), fields(provider = %provider))]
    pub async fn sync_now(&self, provider: Provider) -> Result<(), SubmitError> {
        let token = self
            .token()
            .ok_or_else(|| SubmitError::new(SubmitErrorKind::Unauthorized, MISSING_TOKEN))?;

        let response = self
            .inner
            .client
            .post(self.endpoint(SYNC_PATH))
            .bearer_auth(token.expose_secret())
            .json(&SyncRequest { provider })
            .send()
            .await
            .map_err(|e| SubmitError::new(SubmitErrorKind::NetworkError, transport_detail(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(status, response).await;
            return Err(SubmitError::new(SubmitErrorKind::from_status(status), detail));
        }

        let body: SyncResponse = read_json(response).await.map_err(submit_body_error)?;
        if body.success {
            Ok(())
        } else {
            Err(SubmitError::new(
                SubmitErrorKind::ValidationRejected,
                body.message
                    .unwrap_or_else(|| "backend declined the sync".to_string()),
            ))
        }
    }

    fn token(&self) -> Option<SecretString> {
        let token = self.inner.tokens.token();
        if token.is_none() {
            debug!("No session token available");
        }
        token
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        url.set_path(path);
        url
    }

    /// Status URL for a job; the id is percent-encoded as one path segment.
    fn job_url(&self, job_id: &JobId) -> Url {
        let mut url = self.endpoint(JOBS_PATH);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(job_id.as_str());
        }
        url
    }
}

impl std::fmt::Debug for JobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn submit_body_error(err: BodyError) -> SubmitError {
    match err {
        BodyError::Network(detail) => SubmitError::new(SubmitErrorKind::NetworkError, detail),
        BodyError::Malformed(detail) => SubmitError::new(SubmitErrorKind::ServerError, detail),
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BodyError> {
    let body = response
        .text()
        .await
        .map_err(|e| BodyError::Network(transport_detail(&e)))?;

    serde_json::from_str(&body)
        .map_err(|e| BodyError::Malformed(format!("unexpected response body: {e}")))
}

async fn error_detail(status: StatusCode, response: reqwest::Response) -> String {
    let fallback = format!("HTTP {status}");
    match response.text().await {
        Ok(body) => error_detail_from_body(&body).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::token::StaticTokenSource;

    fn client(base: &str) -> JobClient {
        JobClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Arc::new(StaticTokenSource::new("test-token")),
        )
    }

    #[test]
    fn test_endpoint_replaces_base_path() {
        let client = client("https://admin.auraaluxury.com/dashboard");
        assert_eq!(
            client.endpoint(IMPORT_PATH).as_str(),
            "https://admin.auraaluxury.com/api/admin/import-fast"
        );
    }

    #[test]
    fn test_job_url_encodes_id() {
        let client = client("http://localhost:8001");
        assert_eq!(
            client.job_url(&JobId::new("job-1")).as_str(),
            "http://localhost:8001/api/admin/import-jobs/job-1"
        );
        assert_eq!(
            client.job_url(&JobId::new("a/b c")).as_str(),
            "http://localhost:8001/api/admin/import-jobs/a%2Fb%20c"
        );
    }

    #[test]
    fn test_debug_omits_token() {
        let debug_output = format!("{:?}", client("http://localhost:8001"));
        assert!(debug_output.contains("localhost:8001"));
        assert!(!debug_output.contains("test-token"));
    }

    #[test]
    fn test_job_client_is_clone_send_sync() {
        fn assert_traits<T: Clone + Send + Sync>() {}
        assert_traits::<JobClient>();
    }
}
