//! Transport abstraction
//!
//! The requestor never talks to reqwest directly; it hands a
//! [`TransportRequest`] to a [`Transport`] and gets back status, headers
//! and raw body. [`ReqwestTransport`] is the production implementation.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::Method;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    /// Value of the `Content-Type` header
    pub content_type: String,
    /// Encoded payload
    pub bytes: Bytes,
}

impl RequestBody {
    /// Create a body with its content type
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// A single outgoing request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Optional body
    pub body: Option<RequestBody>,
}

impl TransportRequest {
    /// Create a request without body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attach a body
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response as seen by the requestor
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Numeric status code
    pub status: u16,
    /// Full response header set
    pub headers: HeaderMap,
    /// Raw body
    pub body: Bytes,
}

impl TransportResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossy for invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues HTTP requests on behalf of the requestor
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport from client configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::config(format!("Invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("Invalid value for header '{key}': {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout_duration())
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut req = self.client.request(request.method.into(), &request.url);

        if let Some(body) = request.body {
            req = req.header(CONTENT_TYPE, body.content_type).body(body.bytes);
        }

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        // Error bodies are informational only; a failed read becomes empty.
        let body = if status.is_success() {
            response.bytes().await?
        } else {
            response.bytes().await.unwrap_or_default()
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
