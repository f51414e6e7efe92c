//! The `request -> response` seam between the client and the network.
//!
//! A [`Transport`] sends exactly one request and reports what came back. It
//! never retries, never touches the session and never interprets status
//! codes; that is [`crate::ApiClient`]'s job.

mod http;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;

pub use http::ReqwestTransport;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::error::TransportError;

/// One outbound API call.
///
/// `path` is relative to the configured base URL and starts with `/`.
/// The request id is sent as `x-request-id` and kept when the request is
/// replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<SecretString>,
    pub request_id: Uuid,
    /// Overrides the transport's default timeout.
    pub timeout: Option<Duration>,
    pub(crate) retried: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            request_id: Uuid::new_v4(),
            timeout: None,
            retried: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append query parameters.
    #[must_use]
    pub fn query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn bearer(mut self, token: SecretString) -> Self {
        self.bearer = Some(token);
        self
    }

    /// Whether this request is a replay after a token refresh.
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        self.retried
    }
}

/// What the backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub const fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the body does not match `R`.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The body as JSON if it parses, otherwise as a JSON string.
    #[must_use]
    pub fn json_or_text(&self) -> serde_json::Value {
        self.json()
            .unwrap_or_else(|_| serde_json::Value::String(self.text()))
    }
}

/// Sends a single request.
pub trait Transport: Send + Sync + 'static {
    /// Send `request` and return the response, whatever its status.
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        (**self).send(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/bills/")
            .query([("status", "Pending"), ("household", "3")])
            .timeout(Duration::from_secs(5));
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.query.len(), 2);
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        assert!(!request.is_retry());
        assert!(request.bearer.is_none());
    }

    #[test]
    fn test_json_body() {
        let request = ApiRequest::post("/auth/login/")
            .json(&serde_json::json!({"username": "jdoe"}))
            .unwrap();
        assert_eq!(request.body.unwrap()["username"], "jdoe");
    }

    #[test]
    fn test_response_body_fallback() {
        let response = ApiResponse::new(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>".to_vec());
        assert_eq!(
            response.json_or_text(),
            serde_json::Value::String("<html>bad gateway</html>".to_string())
        );
    }
}
