//! HTTP client for the job-flow backend

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, Method, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Result, Transport, TransportError};
use crate::config::BackendConfig;

/// Largest error body kept for diagnostics
const MAX_ERROR_BODY_CHARS: usize = 2048;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    authorization: Option<HeaderValue>,
}

impl HttpTransport {
    /// Create a new HTTP transport from backend configuration
    pub fn new(config: &BackendConfig) -> std::result::Result<Self, BuildError> {
        url::Url::parse(&config.base_url)?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout.as_duration())
            .timeout(config.request_timeout.as_duration())
            .user_agent(&config.user_agent)
            .build()?;

        let authorization = config
            .api_key
            .as_deref()
            .map(|key| {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", key))?;
                value.set_sensitive(true);
                Ok::<_, InvalidHeaderValue>(value)
            })
            .transpose()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, url);
        match &self.authorization {
            Some(value) => request.header(AUTHORIZATION, value.clone()),
            None => request,
        }
    }

    /// Send once (no retry) and return the body of a 2xx response
    async fn execute(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Bytes> {
        let response = request.send().await.map_err(|e| {
            let err = TransportError::from(e);
            warn!(url, error = %err, "Request failed without a response");
            err
        })?;

        let response = ensure_success(response, url).await?;

        let bytes = response.bytes().await.map_err(|e| {
            let err = TransportError::from(e);
            warn!(url, error = %err, "Failed to read response body");
            err
        })?;

        debug!(url, size = bytes.len(), "Response received");

        Ok(bytes)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self.endpoint(path);
        debug!(%method, url = %url, "Dispatching request");

        let mut request = self
            .request(method, &url)
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref());

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(body.to_string());
        }

        let bytes = self.execute(request, &url).await?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(url = %url, error = %e, "Response is not valid JSON");
            TransportError::from(e)
        })
    }

    async fn fetch_binary(&self, path: &str) -> Result<Bytes> {
        let url = self.endpoint(path);
        debug!(url = %url, "Fetching binary");

        let request = self.request(Method::GET, &url);
        self.execute(request, &url).await
    }
}

async fn ensure_success(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .ok()
        .filter(|text| !text.trim().is_empty())
        .map(|text| text.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>());

    warn!(
        url,
        status = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Unknown"),
        "Backend returned an error status"
    );

    Err(TransportError::HttpFailure {
        status: status.as_u16(),
        body,
    })
}
