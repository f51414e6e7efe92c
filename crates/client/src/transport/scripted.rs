//! Scripted [`Transport`] for tests.
//!
//! Responses are queued per `(method, path)` and handed out in order. Every
//! request is recorded so tests can assert on headers and bodies.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use uuid::Uuid;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::TransportError;

/// A request as the scripted transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// The bearer token, exposed for assertions.
    pub bearer: Option<String>,
    pub request_id: Uuid,
}

type Script = VecDeque<Result<ApiResponse, TransportError>>;

/// In-memory [`Transport`] that replays queued responses.
///
/// A request with nothing queued for its route fails with
/// [`TransportError::Unreachable`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<(Method, String), Script>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.respond_bytes(method, path, status, body.to_string().into_bytes());
    }

    /// Queue a raw response for `method path`.
    ///
    /// # Panics
    ///
    /// Panics if `status` is not a valid HTTP status code.
    pub fn respond_bytes(&self, method: Method, path: &str, status: u16, body: Vec<u8>) {
        let status = StatusCode::from_u16(status).expect("valid HTTP status");
        self.push(method, path, Ok(ApiResponse::new(status, body)));
    }

    /// Queue a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.push(method, path, Err(error));
    }

    fn push(&self, method: Method, path: &str, outcome: Result<ApiResponse, TransportError>) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(outcome);
    }

    /// Every request sent so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests sent to `path`, in order.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Number of requests sent so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether every queued response has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .all(VecDeque::is_empty)
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method: request.method.clone(),
                path: request.path.clone(),
                query: request.query.clone(),
                body: request.body.clone(),
                bearer: request
                    .bearer
                    .as_ref()
                    .map(|token| token.expose_secret().to_string()),
                request_id: request.request_id,
            });

        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&(request.method.clone(), request.path.clone()))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Unreachable(format!(
                    "no scripted response for {} {}",
                    request.method, request.path
                )))
            })
    }
}
