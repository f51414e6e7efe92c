use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use super::{ApiRequest, ApiResponse, Transport};
use crate::config::ClientConfig;
use crate::error::TransportError;

/// Header carrying the per-request correlation id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// [`Transport`] over HTTP using `reqwest`.
///
/// The base URL, JSON content type and default timeout come from
/// [`ClientConfig`]; callers only supply a path.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport for `config`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidRequest` if the HTTP client cannot be
    /// created.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Absolute URL for `request`, including its query string.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{}", request.path))
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {e}", request.path)))?;

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

impl Transport for ReqwestTransport {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path, request_id = %request.request_id)
    )]
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(REQUEST_ID_HEADER, request.request_id.to_string());
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(status = %status, bytes = body.len(), "Response received");
        Ok(ApiResponse { status, body })
    }
}
