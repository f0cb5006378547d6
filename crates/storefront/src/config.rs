//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QKART_API_ENDPOINT` - Base URL of the backend REST API (e.g., `http://localhost:8082/api/v1`)
//!
//! ## Optional
//! - `QKART_SEARCH_DEBOUNCE_MS` - Quiet window before a search fires (default: 500)
//! - `QKART_CATALOG_CACHE_TTL_SECS` - Lifetime of the cached product listing (default: 300)
//! - `QKART_SESSION_TOKEN` - Bearer token of a logged-in session
//! - `QKART_USERNAME` - Display name of the logged-in user
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API base URL
    pub api_endpoint: Url,
    /// Quiet window after the last keystroke before a search request fires
    pub search_debounce: Duration,
    /// Time-to-live of the cached default product listing
    pub catalog_cache_ttl: Duration,
    /// Credentials of a logged-in session, if any
    pub session: Option<SessionConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Credentials of a logged-in session.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct SessionConfig {
    /// Bearer token returned on login
    pub token: SecretString,
    /// Display name of the logged-in user
    pub username: Option<String>,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .finish()
    }
}

impl StorefrontConfig {
    /// Create a configuration for `api_endpoint` with default settings and no
    /// session.
    #[must_use]
    pub const fn new(api_endpoint: Url) -> Self {
        Self {
            api_endpoint,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            session: None,
            sentry_dsn: None,
        }
    }

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

        let api_endpoint = parse_endpoint("QKART_API_ENDPOINT", &get_required_env("QKART_API_ENDPOINT")?)?;
        let search_debounce = Duration::from_millis(get_env_as_u64(
            "QKART_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let catalog_cache_ttl = Duration::from_secs(get_env_as_u64(
            "QKART_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?);
        let session = SessionConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_endpoint,
            search_debounce,
            catalog_cache_ttl,
            session,
            sentry_dsn,
        })
    }
}

impl SessionConfig {
    fn from_env() -> Option<Self> {
        let token = get_optional_env("QKART_SESSION_TOKEN")?;
        Some(Self {
            token: SecretString::from(token),
            username: get_optional_env("QKART_USERNAME"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable parsed as `u64`, with a default value.
fn get_env_as_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse the backend base URL.
///
/// A trailing slash is enforced so relative joins (`products`, `cart`) land
/// under the configured path instead of replacing its last segment.
fn parse_endpoint(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
