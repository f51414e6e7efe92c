//! Bearer-token injection and the single refresh-and-retry policy.
//!
//! Every authenticated request goes through [`WithAuthRefresh::send`]:
//!
//! 1. Attach the stored access token, if any.
//! 2. Send. Anything but `401` is classified and returned.
//! 3. On the first `401`, refresh the access token once and replay the
//!    request with the new token. A second `401` is terminal.
//! 4. If the refresh fails, clear the session and publish
//!    [`AuthState::Unauthenticated`].
//!
//! The refresh call is sent straight to the transport, so it is never itself
//! subject to this policy.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::{Mutex, watch};
use tracing::instrument;

use crate::auth::AuthState;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Token refresh endpoint.
pub(crate) const REFRESH_PATH: &str = "/auth/token/refresh/";

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

pub(crate) struct WithAuthRefresh<T> {
    pub(crate) transport: T,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) state: Arc<watch::Sender<AuthState>>,
    /// Serializes refreshes so concurrent `401`s share one refresh call.
    refresh_gate: Mutex<()>,
    refresh_timeout: Duration,
}

impl<T: Transport> WithAuthRefresh<T> {
    pub(crate) fn new(
        transport: T,
        store: Arc<dyn SessionStore>,
        state: Arc<watch::Sender<AuthState>>,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            store,
            state,
            refresh_gate: Mutex::new(()),
            refresh_timeout,
        }
    }

    /// Send `request` with the stored credentials, refreshing once on `401`.
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path, request_id = %request.request_id)
    )]
    pub(crate) async fn send(self: &Arc<Self>, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        request.bearer = self.store.load().map(|session| session.access_token);

        let response = self.transport.send(&request).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return classify(response);
        }

        if request.retried {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }
        request.retried = true;

        // The refresh runs as its own task so that a refreshed token is
        // persisted even if this caller is dropped while waiting.
        let policy = Arc::clone(self);
        let rejected = request.bearer.take();
        let access_token = match tokio::spawn(async move { policy.refresh(rejected).await }).await {
            Ok(result) => result?,
            Err(e) => {
                tracing::error!(error = %e, "Token refresh task failed");
                self.expire_session();
                return Err(ApiError::SessionExpired);
            }
        };

        request.bearer = Some(access_token);
        let response = self.transport.send(&request).await?;
        if response.status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Request rejected again after token refresh");
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }
        classify(response)
    }

    /// Obtain a fresh access token, or tear the session down.
    ///
    /// `rejected` is the token the backend just refused. If the store already
    /// holds a different one, another request refreshed first and its token
    /// is reused.
    async fn refresh(&self, rejected: Option<SecretString>) -> Result<SecretString, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        let Some(session) = self.store.load() else {
            tracing::info!("No stored session to refresh");
            self.expire_session();
            return Err(ApiError::SessionExpired);
        };

        let already_refreshed = rejected.as_ref().is_none_or(|rejected| {
            rejected.expose_secret() != session.access_token.expose_secret()
        });
        if already_refreshed {
            tracing::debug!("Reusing access token refreshed by a concurrent request");
            return Ok(session.access_token);
        }

        tracing::info!("Access token rejected, refreshing");
        let request = ApiRequest::post(REFRESH_PATH)
            .json(&serde_json::json!({ "refresh": session.refresh_token.expose_secret() }))?
            .timeout(self.refresh_timeout);

        let sent = tokio::time::timeout(self.refresh_timeout, self.transport.send(&request)).await;
        let response = match sent {
            Ok(Ok(response)) if response.status.is_success() => response,
            Ok(Ok(response)) => {
                tracing::warn!(status = %response.status, "Token refresh rejected");
                return Err(self.abandon(&session.refresh_token));
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Token refresh failed");
                return Err(self.abandon(&session.refresh_token));
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.refresh_timeout.as_secs_f64(),
                    "Token refresh timed out"
                );
                return Err(self.abandon(&session.refresh_token));
            }
        };

        let access_token = match response.json::<RefreshResponse>() {
            Ok(body) => SecretString::from(body.access),
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh returned an unexpected body");
                return Err(self.abandon(&session.refresh_token));
            }
        };

        // A logout or a new login may have happened while the call was in flight.
        let session = match self
            .store
            .replace_access_token(&session.refresh_token, access_token.clone())
        {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::info!("Session changed during token refresh, discarding new token");
                return Err(ApiError::SessionExpired);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist refreshed session");
                self.expire_session();
                return Err(ApiError::Store(e));
            }
        };
        self.state
            .send_replace(AuthState::Authenticated(Box::new(session.user)));

        tracing::info!("Access token refreshed");
        Ok(access_token)
    }

    /// Give up on a failed refresh of the session holding `refresh_token`.
    ///
    /// The session is torn down only if it is still the stored one; a session
    /// created or cleared meanwhile is left as it is.
    fn abandon(&self, refresh_token: &SecretString) -> ApiError {
        let still_current = self.store.load().is_some_and(|session| {
            session.refresh_token.expose_secret() == refresh_token.expose_secret()
        });
        if still_current {
            self.expire_session();
        } else {
            tracing::info!("Session changed during token refresh, leaving it alone");
        }
        ApiError::SessionExpired
    }

    /// Clear the stored session and publish that nobody is signed in.
    pub(crate) fn expire_session(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear session store");
        }
        self.state.send_replace(AuthState::Unauthenticated);
        tracing::info!("Session cleared");
    }
}

/// Map a non-`401` response onto the caller-facing result.
pub(crate) fn classify(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    let status = response.status;
    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::UNAUTHORIZED {
        Err(ApiError::AuthenticationFailed(crate::error::summarize(
            &response.json_or_text(),
        )))
    } else if status.is_client_error() {
        Err(ApiError::Validation {
            status,
            body: response.json_or_text(),
        })
    } else {
        Err(ApiError::Http {
            status,
            body: response.text(),
        })
    }
}
