//! Admin client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AURAA_API_BASE_URL` - Backend origin (e.g., `https://api.auraaluxury.com`)
//!
//! ## Optional
//! - `AURAA_TOKEN_FILE` - Session token file (default: `$HOME/.config/auraa/session.json`)
//! - `AURAA_TOKEN` - Static session token, overrides the token file
//! - `AURAA_POLL_INTERVAL_MS` - Job status poll interval (default: 2000)
//! - `AURAA_HTTP_TIMEOUT_SECS` - Per-request HTTP timeout (default: 30)
//! - `AURAA_LOG_JSON` - Emit JSON log lines when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::api::{FileTokenSource, StaticTokenSource, TokenSource};
use crate::import::DEFAULT_POLL_INTERVAL;

const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";
const DEFAULT_TOKEN_FILE: &str = ".config/auraa/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin client configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Where the session token comes from
    pub token: TokenConfig,
    /// Job status poll interval
    pub poll_interval: Duration,
    /// Emit JSON log lines instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Backend API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin; endpoint paths replace its path component
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Session token location.
///
/// Implements `Debug` manually to redact the static token.
#[derive(Clone)]
pub struct TokenConfig {
    /// Token file written by the admin login
    pub file: PathBuf,
    /// Static token taking precedence over the file
    pub override_token: Option<SecretString>,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("file", &self.file)
            .field(
                "override_token",
                &self.override_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl TokenConfig {
    /// Build the token source this configuration describes.
    #[must_use]
    pub fn source(&self) -> Arc<dyn TokenSource> {
        match &self.override_token {
            Some(token) => Arc::new(StaticTokenSource::new(token.expose_secret())),
            None => Arc::new(FileTokenSource::new(self.file.clone())),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&env);

        let base_url = parse_base_url(&env.required("AURAA_API_BASE_URL")?)?;
        let timeout_secs = env
            .or_default("AURAA_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| invalid("AURAA_HTTP_TIMEOUT_SECS", e))?;

        let poll_interval = match env.optional("AURAA_POLL_INTERVAL_MS") {
            Some(raw) => parse_poll_interval(&raw)?,
            None => DEFAULT_POLL_INTERVAL,
        };

        let file = env.optional("AURAA_TOKEN_FILE").map_or_else(
            || default_token_file(env.optional("HOME")),
            PathBuf::from,
        );

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            token: TokenConfig {
                file,
                override_token: env.optional("AURAA_TOKEN").map(SecretString::from),
            },
            poll_interval,
            log_json: env
                .optional("AURAA_LOG_JSON")
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true")),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup treating blank values as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn invalid(key: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), err.to_string())
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid("AURAA_API_BASE_URL", e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(
            "AURAA_API_BASE_URL",
            format!("unsupported scheme '{other}', expected http or https"),
        )),
    }
}

fn parse_poll_interval(raw: &str) -> Result<Duration, ConfigError> {
    let millis = raw
        .parse::<u64>()
        .map_err(|e| invalid("AURAA_POLL_INTERVAL_MS", e))?;
    if millis == 0 {
        return Err(invalid("AURAA_POLL_INTERVAL_MS", "must be greater than 0"));
    }
    Ok(Duration::from_millis(millis))
}

fn default_token_file(home: Option<String>) -> PathBuf {
    home.map_or_else(PathBuf::new, PathBuf::from)
        .join(DEFAULT_TOKEN_FILE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("AURAA_API_BASE_URL", "https://api.auraaluxury.com"),
            ("HOME", "/home/admin"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url.as_str(), "https://api.auraaluxury.com/");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(
            config.token.file,
            PathBuf::from("/home/admin/.config/auraa/session.json")
        );
        assert!(config.token.override_token.is_none());
        assert!(!config.log_json);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "AURAA_API_BASE_URL"));
    }

    #[test]
    fn test_blank_base_url_is_missing() {
        let err = load(&[("AURAA_API_BASE_URL", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = load(&[("AURAA_API_BASE_URL", "ftp://example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "AURAA_API_BASE_URL"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = load(&[
            ("AURAA_API_BASE_URL", "http://localhost:8001"),
            ("AURAA_POLL_INTERVAL_MS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "AURAA_POLL_INTERVAL_MS"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("AURAA_API_BASE_URL", "http://localhost:8001"),
            ("AURAA_POLL_INTERVAL_MS", "500"),
            ("AURAA_HTTP_TIMEOUT_SECS", "5"),
            ("AURAA_TOKEN_FILE", "/tmp/token.json"),
            ("AURAA_TOKEN", "abc123"),
            ("AURAA_LOG_JSON", "TRUE"),
            ("SENTRY_DSN", "https://key@sentry.io/1"),
        ])
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.token.file, PathBuf::from("/tmp/token.json"));
        assert!(config.log_json);
        assert_eq!(config.sentry_dsn.as_deref(), Some("https://key@sentry.io/1"));
        assert_eq!(
            config.token.source().token().unwrap().expose_secret(),
            "abc123"
        );
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load(&[
            ("AURAA_API_BASE_URL", "http://localhost:8001"),
            ("AURAA_HTTP_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "AURAA_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[
            ("AURAA_API_BASE_URL", "http://localhost:8001"),
            ("AURAA_TOKEN", "super-secret-token"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
