//! Client configuration.
//!
//! Loads configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; request paths are appended to it.
    pub api_base_url: Url,
    /// Timeout for ordinary requests.
    pub request_timeout: Duration,
    /// Timeout for the token refresh call.
    pub refresh_timeout: Duration,
    /// Where the session is persisted.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VWS_API_BASE_URL` - Backend base URL (default: `http://localhost:8000/api`)
    /// - `VWS_REQUEST_TIMEOUT_SECS` - Request timeout (default: 30)
    /// - `VWS_REFRESH_TIMEOUT_SECS` - Token refresh timeout (default: 10)
    /// - `VWS_SESSION_FILE` - Session file (default: `$XDG_DATA_HOME/village-water/session.json`,
    ///   falling back to `$HOME/.local/share/village-water/session.json`)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or no session file
    /// location can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_env_or_default(&get, "VWS_API_BASE_URL", DEFAULT_API_BASE_URL);
        let api_base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("VWS_API_BASE_URL".to_string(), e.to_string())
        })?;

        let request_timeout = get_secs(&get, "VWS_REQUEST_TIMEOUT_SECS", 30)?;
        let refresh_timeout = get_secs(&get, "VWS_REFRESH_TIMEOUT_SECS", 10)?;

        let session_file = match get_optional_env(&get, "VWS_SESSION_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_session_file(&get)?,
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            refresh_timeout,
            session_file,
        })
    }

    /// Configuration pointing at `api_base_url` with default timeouts.
    ///
    /// The session file is placed in the system temp directory; callers that
    /// persist sessions should set [`ClientConfig::session_file`].
    #[must_use]
    pub fn with_base_url(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            request_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(10),
            session_file: std::env::temp_dir().join("village-water-session.json"),
        }
    }
}

fn default_session_file(get: &impl Fn(&str) -> Option<String>) -> Result<PathBuf, ConfigError> {
    let data_home = get_optional_env(get, "XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| get_optional_env(get, "HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .ok_or_else(|| ConfigError::MissingEnvVar("VWS_SESSION_FILE".to_string()))?;

    Ok(data_home.join("village-water").join("session.json"))
}

fn get_secs(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = match get_optional_env(get, key) {
        Some(value) => value
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    get(key).filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(get, key).unwrap_or_else(|| default.to_string())
}
