//! Rate-limited requestor
//!
//! Every verb goes through the same sequence:
//! - take a permit from the [`AdmissionGate`] (release is scheduled, not awaited)
//! - send the request through the [`Transport`]
//! - turn any non-2xx status into [`Error::Remote`]
//! - decode the body with the [`Codec`]
//!
//! No request is retried; failures go straight back to the caller.

use super::codec::{Codec, JsonCodec};
use super::multipart::FileUpload;
use super::rate_limit::AdmissionGate;
use super::transport::{
    ReqwestTransport, RequestBody, Transport, TransportRequest, TransportResponse,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::Method;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP verbs behind a shared admission gate
///
/// Cloning is cheap; clones share the gate, the ceiling and the transport.
#[derive(Clone)]
pub struct Requestor<C: Codec = JsonCodec> {
    transport: Arc<dyn Transport>,
    codec: C,
    gate: AdmissionGate,
    base_url: Option<String>,
}

impl Requestor<JsonCodec> {
    /// Create a requestor with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a reqwest-backed requestor from configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_config(config)?;
        let mut requestor = Self::with_transport(Arc::new(transport), JsonCodec);
        requestor.base_url = config.base_url.clone();
        requestor.set_max_requests_per_second(config.max_requests_per_second);
        Ok(requestor)
    }
}

impl<C: Codec> Requestor<C> {
    /// Create a requestor over an arbitrary transport and codec
    pub fn with_transport(transport: Arc<dyn Transport>, codec: C) -> Self {
        Self {
            transport,
            codec,
            gate: AdmissionGate::default(),
            base_url: None,
        }
    }

    /// Set the base URL relative paths are joined onto
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Current requests-per-second ceiling
    pub fn max_requests_per_second(&self) -> u32 {
        self.gate.max_requests_per_second()
    }

    /// Change the requests-per-second ceiling for subsequent requests
    pub fn set_max_requests_per_second(&self, rps: u32) {
        self.gate.set_max_requests_per_second(rps);
    }

    /// The admission gate shared by this requestor and its clones
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// GET and decode the body
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        self.decode(&response)
    }

    /// GET and decode the body, also returning the response headers
    pub async fn get_with_headers<T: DeserializeOwned>(&self, url: &str) -> Result<(T, HeaderMap)> {
        let response = self.send(Method::GET, url, None).await?;
        let value = self.decode(&response)?;
        Ok((value, response.headers))
    }

    /// POST an optional payload and decode the body
    pub async fn post<T, B>(&self, url: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.encode(body)?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        self.decode(&response)
    }

    /// POST an optional payload, discarding the body
    pub async fn post_unit<B: Serialize + ?Sized>(&self, url: &str, body: Option<&B>) -> Result<()> {
        let body = self.encode(body)?;
        self.send(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    /// PUT a payload and decode the body
    pub async fn put<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.encode(Some(body))?;
        let response = self.send(Method::PUT, url, Some(body)).await?;
        self.decode(&response)
    }

    /// PUT a payload, discarding the body
    pub async fn put_unit<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let body = self.encode(Some(body))?;
        self.send(Method::PUT, url, Some(body)).await?;
        Ok(())
    }

    /// DELETE, discarding the body
    pub async fn delete(&self, url: &str) -> Result<()> {
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// DELETE and decode the body
    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(Method::DELETE, url, None).await?;
        self.decode(&response)
    }

    /// POST a file as `multipart/form-data` and decode the body
    pub async fn post_file<T: DeserializeOwned>(&self, url: &str, upload: &FileUpload) -> Result<T> {
        let response = self
            .send(Method::POST, url, Some(upload.to_body()))
            .await?;
        self.decode(&response)
    }

    /// Issue one gated request and map non-success statuses to errors
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<RequestBody>,
    ) -> Result<TransportResponse> {
        let full_url = self.build_url(url);

        self.gate.acquire().await?;

        let mut request = TransportRequest::new(method, &full_url);
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!("Request failed: {} {} -> {}", method, full_url, response.status);
            return Err(Error::remote(response.status, response.text()));
        }

        debug!("Request succeeded: {} {} -> {}", method, full_url, response.status);
        Ok(response)
    }

    fn encode<B: Serialize + ?Sized>(&self, body: Option<&B>) -> Result<RequestBody> {
        let text = self.codec.serialize_body(body)?;
        Ok(RequestBody::new(self.codec.content_type(), text))
    }

    fn decode<T: DeserializeOwned>(&self, response: &TransportResponse) -> Result<T> {
        self.codec.deserialize(&response.text())
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

impl<C: Codec> std::fmt::Debug for Requestor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requestor")
            .field("gate", &self.gate)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
