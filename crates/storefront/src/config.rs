//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ZENTRO_BASE_URL` - Base URL of the storefront backend (e.g., <https://shop.example.in>)
//!
//! ## Optional
//! - `ZENTRO_SESSION_COOKIE` - Value of the backend `session` cookie for a logged-in user
//! - `ZENTRO_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds (default: 5)
//! - `ZENTRO_CACHE_PATH` - Location of the local cache file (default: .zentro-cache.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CACHE_PATH: &str = ".zentro-cache.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the session cookie.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Backend base URL. Always ends with `/` so API paths join beneath it.
    pub base_url: Url,
    /// Session cookie for authenticated cart calls
    pub session_cookie: Option<SecretString>,
    /// Per-request timeout; expiry is reported as a failed request
    pub request_timeout: Duration,
    /// Local cache file location
    pub cache_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("cache_path", &self.cache_path)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl StorefrontConfig {
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

        let base_url = parse_base_url(&get_required_env("ZENTRO_BASE_URL")?)?;
        let session_cookie = get_optional_env("ZENTRO_SESSION_COOKIE")
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);
        let timeout_secs = get_env_or_default(
            "ZENTRO_REQUEST_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("ZENTRO_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ZENTRO_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let cache_path = PathBuf::from(get_env_or_default("ZENTRO_CACHE_PATH", DEFAULT_CACHE_PATH));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            base_url,
            session_cookie,
            request_timeout: Duration::from_secs(timeout_secs),
            cache_path,
            sentry_dsn,
        })
    }

    /// Configuration for a backend at `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            session_cookie: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            sentry_dsn: None,
        })
    }

    /// Attach a session cookie.
    #[must_use]
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(SecretString::from(cookie.into()));
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend URL, forcing a trailing slash so `Url::join` keeps any
/// path prefix the backend is mounted under.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("ZENTRO_BASE_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "ZENTRO_BASE_URL".to_string(),
            "must be an http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:5000/shop").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/shop/");
        assert_eq!(
            url.join("api/cart").unwrap().as_str(),
            "http://localhost:5000/shop/api/cart"
        );
    }

    #[test]
    fn test_base_url_root() {
        let url = parse_base_url("http://localhost:5000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_base_url("mailto:shop@example.in").is_err());
    }

    #[test]
    fn test_debug_redacts_cookie() {
        let config = StorefrontConfig::for_base_url("http://localhost:5000")
            .unwrap()
            .with_session_cookie("very-secret-session");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret-session"));
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::for_base_url("http://localhost:5000").unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.session_cookie.is_none());
    }
}
