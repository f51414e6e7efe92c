//! Authenticated API client.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use village_water_core::ListResponse;

use crate::auth::AuthState;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::refresh::WithAuthRefresh;
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

/// Client for the Village Water System REST API.
///
/// Attaches the stored access token to every request and, on a `401`,
/// refreshes it once and replays the request. If the session cannot be
/// recovered it is cleared and [`AuthState::Unauthenticated`] is published.
///
/// Cheap to clone; clones share the transport, store and auth state.
pub struct ApiClient<T = ReqwestTransport> {
    inner: Arc<WithAuthRefresh<T>>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    /// Create a client that talks HTTP to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the HTTP client cannot be created.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(transport, store, config))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create a client over `transport`.
    ///
    /// The auth state starts as [`AuthState::Resolving`] until
    /// [`crate::AuthSession::resolve`] reads the store.
    #[must_use]
    pub fn new(transport: T, store: Arc<dyn SessionStore>, config: &ClientConfig) -> Self {
        let (state, _) = watch::channel(AuthState::Resolving);
        Self {
            inner: Arc::new(WithAuthRefresh::new(
                transport,
                store,
                Arc::new(state),
                config.refresh_timeout,
            )),
        }
    }

    /// Send `request` with the stored credentials and the refresh policy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for any non-success outcome; see [`ApiError`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.inner.send(request).await
    }

    /// Send `request` exactly as given: no stored token, no refresh policy,
    /// no status classification.
    ///
    /// Used for the login, registration and logout calls, whose failures
    /// must never tear down an existing session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` only if no response was received.
    pub async fn send_raw(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        Ok(self.inner.transport.send(request).await?)
    }

    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure or if the body does not decode.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.query_json(path, Vec::<(String, String)>::new()).await
    }

    /// `GET path?query` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure or if the body does not decode.
    pub async fn query_json<R, K, V>(
        &self,
        path: &str,
        query: impl IntoIterator<Item = (K, V)>,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        K: Into<String>,
        V: Into<String>,
    {
        let response = self.send(ApiRequest::get(path).query(query)).await?;
        Ok(response.json()?)
    }

    /// `GET path?query` on a list endpoint, accepting either a bare JSON
    /// array or a `{results: [...]}` page.
    ///
    /// Only the page the endpoint returns is fetched. Further pages are not
    /// followed; pass the backend's `page` query parameter to reach them.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure or if the body is neither shape.
    pub async fn list<R, K, V>(
        &self,
        path: &str,
        query: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Vec<R>, ApiError>
    where
        R: DeserializeOwned,
        K: Into<String>,
        V: Into<String>,
    {
        let page: ListResponse<R> = self.query_json(path, query).await?;
        if let Some(next) = page.next_page() {
            tracing::debug!(
                path,
                returned = page.len(),
                total = page.total(),
                next,
                "List response has more pages"
            );
        }
        Ok(page.into_items())
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure or if the body does not decode.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(ApiRequest::post(path).json(body)?).await?;
        Ok(response.json()?)
    }

    /// `PUT path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure or if the body does not decode.
    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(ApiRequest::put(path).json(body)?).await?;
        Ok(response.json()?)
    }

    /// `POST path` without a body, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::post(path)).await?;
        Ok(())
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// `GET path` and return the raw body (CSV, PDF, ...).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        Ok(self.send(ApiRequest::get(path)).await?.body)
    }

    /// The session store this client reads tokens from.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// The auth state sender shared with [`crate::AuthSession`].
    pub(crate) fn state(&self) -> &watch::Sender<AuthState> {
        &self.inner.state
    }

    /// Subscribe to auth state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Clear the session and publish [`AuthState::Unauthenticated`].
    pub(crate) fn expire_session(&self) {
        self.inner.expire_session();
    }
}
