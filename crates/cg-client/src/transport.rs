//! Transport abstraction: one POST, one status code, one body.

use serde_json::Value;

use cg_types::{CgResult, ExchangeError};

/// Raw outcome of a single POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Something that can POST a JSON document and hand back the raw response.
///
/// Non-200 statuses are not errors at this level; retry policy lives in
/// [`crate::ExchangeClient`]. Connection-level failures are errors and are
/// not retried.
pub trait Transport {
    fn post_json(&self, url: &str, body: &Value) -> CgResult<TransportResponse>;
}

/// Blocking HTTP transport backed by `reqwest`.
///
/// Keeps no idle connections between calls, so every attempt opens a fresh
/// connection. No request timeout is set.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> CgResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| ExchangeError::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &Value) -> CgResult<TransportResponse> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| ExchangeError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ExchangeError::Http(format!("failed to read response body: {}", e)))?;

        Ok(TransportResponse { status, body })
    }
}
