//! Auth core configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WELLSPRING_API_BASE_URL` - Base URL of the Wellspring backend REST API
//!
//! ## Optional
//! - `WELLSPRING_SESSION_FILE` - Path of the persisted session file
//!   (default: `<platform data dir>/wellspring/session.json`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Auth core configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the backend REST API.
    pub api_base_url: Url,
    /// Override for the persisted session file location.
    pub session_file: Option<PathBuf>,
}

impl AuthConfig {
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

        let api_base_url = parse_base_url(
            "WELLSPRING_API_BASE_URL",
            &get_required_env("WELLSPRING_API_BASE_URL")?,
        )?;
        let session_file = get_optional_env("WELLSPRING_SESSION_FILE").map(PathBuf::from);

        Ok(Self {
            api_base_url,
            session_file,
        })
    }

    /// Create a configuration directly, for hosts that do not use the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not a valid http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", api_base_url)?,
            session_file: None,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse and validate the backend base URL.
fn parse_base_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}
