//! Error types for talking to the backend.

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::SessionStoreError;

/// A request never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS failure, TLS failure, reset mid-body, ...
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// No response within the request's timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built (bad URL, unencodable header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// Errors surfaced to callers of [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the request with a 4xx other than 401.
    ///
    /// `body` is the response body as sent (usually a field -> messages map).
    #[error("Request rejected ({status}): {}", summarize(.body))]
    Validation {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// The backend answered with an unexpected non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// Credentials were rejected on a request that is not eligible for refresh.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session could not be recovered; it has been cleared.
    #[error("Session expired - please log in again")]
    SessionExpired,

    /// The operation needs a signed-in user and there is none.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The backend could not be reached.
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// The backend did not answer in time.
    #[error("Request timed out")]
    Timeout,

    /// A request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A JSON body did not have the expected shape.
    #[error("Unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The session store could not be written.
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unreachable(message) => Self::Unreachable(message),
            TransportError::Timeout => Self::Timeout,
            TransportError::InvalidRequest(message) => Self::InvalidRequest(message),
        }
    }
}

impl ApiError {
    /// Whether this error means the user has to sign in (again).
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired | Self::AuthenticationFailed(_) | Self::NotAuthenticated
        )
    }

    /// Whether the backend could not be reached at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout)
    }

    /// HTTP status of the response that caused this error, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Validation { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::AuthenticationFailed(_) | Self::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Short message suitable for showing to a user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation { body, .. } => summarize(body),
            Self::Unreachable(_) | Self::Timeout => {
                "Cannot reach the server. Check your connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Pull a readable message out of an error body.
///
/// Django REST framework bodies carry either `error`, `detail`, or a map of
/// field name to a list of messages.
pub(crate) fn summarize(body: &serde_json::Value) -> String {
    use serde_json::Value;

    match body {
        Value::String(text) => text.clone(),
        Value::Object(map) => {
            for key in ["error", "detail", "message"] {
                if let Some(Value::String(text)) = map.get(key) {
                    return text.clone();
                }
            }
            map.iter()
                .map(|(field, messages)| match messages {
                    Value::Array(items) => format!(
                        "{field}: {}",
                        items
                            .iter()
                            .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_string))
                            .collect::<Vec<_>>()
                            .join(" ")
                    ),
                    other => format!("{field}: {other}"),
                })
                .collect::<Vec<_>>()
                .join("; ")
        }
        other => other.to_string(),
    }
}
