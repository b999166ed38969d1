//! Session token sources.
//!
//! The admin session token lives in local storage owned by the login flow.
//! It is read again on every request so a refreshed token is picked up
//! without restarting anything; a missing token is reported as
//! `Unauthorized` by the client before any request is sent.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Key holding the bearer token in the session file.
pub const TOKEN_KEY: &str = "token";

/// Source of the bearer token for admin API calls.
pub trait TokenSource: Send + Sync {
    /// Current token, or `None` when the operator is not logged in.
    fn token(&self) -> Option<SecretString>;
}

/// Reads the token from a JSON session file (`{"token": "..."}`).
///
/// A missing file, malformed JSON, a missing key or a blank value all mean
/// "no token".
#[derive(Debug, Clone)]
pub struct FileTokenSource {
    path: PathBuf,
}

impl FileTokenSource {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenSource for FileTokenSource {
    fn token(&self) -> Option<SecretString> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Session file not readable");
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Session file is not JSON");
                return None;
            }
        };

        value
            .get(TOKEN_KEY)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::from(token.to_owned()))
    }
}

/// A fixed token, for overrides and tests.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct StaticTokenSource {
    token: SecretString,
}

impl StaticTokenSource {
    /// Create a source that always returns `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl std::fmt::Debug for StaticTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenSource")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl TokenSource for StaticTokenSource {
    fn token(&self) -> Option<SecretString> {
        if self.token.expose_secret().trim().is_empty() {
            return None;
        }
        Some(self.token.clone())
    }
}
