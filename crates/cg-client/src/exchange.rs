//! The request/response exchange with the optimization service.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use cg_types::{CgResult, ExchangeError, Table};

use crate::config::ClientConfig;
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// `message` value of a successful response.
pub const SUCCESS_MESSAGE: &str = "Ok";

#[derive(Debug, Serialize)]
struct RequestEnvelope<'a> {
    number_of_arms: usize,
    /// The measurements table, JSON-encoded as a string.
    measurements: &'a str,
}

/// Decoded successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeResponse {
    pub analysis: Table,
    pub design: Table,
    pub message: String,
}

/// Configured client for the service.
#[derive(Debug)]
pub struct ExchangeClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl ExchangeClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> CgResult<Self> {
        Self::with_transport(config, HttpTransport::new()?)
    }
}

impl<T: Transport> ExchangeClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> CgResult<Self> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send the measurements and ask for `number_of_arms` new arms.
    pub fn request(&self, measurements: &Table, number_of_arms: usize) -> CgResult<ExchangeResponse> {
        let measurements_text = measurements.to_json_string()?;
        let payload = serde_json::to_value(RequestEnvelope {
            number_of_arms,
            measurements: &measurements_text,
        })?;

        info!(
            "Requesting {} arms from {} with {} measurements",
            number_of_arms,
            self.config.endpoint,
            measurements.len()
        );

        let response = self.post_with_retries(&payload)?;
        let decoded = decode_response(&response.body)?;

        info!(
            "Received {} analysis rows and {} design rows",
            decoded.analysis.len(),
            decoded.design.len()
        );
        Ok(decoded)
    }

    fn post_with_retries(&self, payload: &Value) -> CgResult<TransportResponse> {
        let attempts = self.config.num_retries;
        let mut last_status = 0;

        for attempt in 1..=attempts {
            debug!("POST {} (attempt {}/{})", self.config.endpoint, attempt, attempts);
            let response = self.transport.post_json(&self.config.endpoint, payload)?;
            if response.status == 200 {
                return Ok(response);
            }

            warn!(
                "Service returned status {} on attempt {}/{}",
                response.status, attempt, attempts
            );
            last_status = response.status;
            if attempt < attempts {
                std::thread::sleep(self.config.retry_delay);
            }
        }

        Err(ExchangeError::RetriesExhausted {
            attempts,
            last_status,
        }
        .into())
    }
}

/// One-shot exchange against `endpoint` (or the default endpoint).
pub fn request(
    measurements: &Table,
    number_of_arms: usize,
    endpoint: Option<&str>,
    num_retries: u32,
) -> CgResult<ExchangeResponse> {
    let mut config = ClientConfig::default().with_num_retries(num_retries);
    if let Some(endpoint) = endpoint {
        config = config.with_endpoint(endpoint);
    }
    ExchangeClient::new(config)?.request(measurements, number_of_arms)
}

fn decode_response(body: &str) -> CgResult<ExchangeResponse> {
    let malformed = || ExchangeError::MalformedResponse {
        body: body.to_string(),
    };

    let doc: Value = serde_json::from_str(body).map_err(|_| malformed())?;
    let doc = doc.as_object().ok_or_else(malformed)?;
    let message = doc.get("message").ok_or_else(malformed)?;

    let message = match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if message != SUCCESS_MESSAGE {
        return Err(ExchangeError::ServerReported(message).into());
    }

    Ok(ExchangeResponse {
        analysis: decode_table(doc, "analysis")?,
        design: decode_table(doc, "design")?,
        message,
    })
}

/// Tables arrive as JSON-encoded strings; an inline object is accepted too.
fn decode_table(doc: &Map<String, Value>, field: &str) -> CgResult<Table> {
    let malformed = |detail: String| ExchangeError::MalformedResponse {
        body: format!("field '{field}': {detail}"),
    };

    let table = match doc.get(field) {
        Some(Value::String(text)) => Table::from_json_str(text),
        Some(value @ Value::Object(_)) => Table::from_value(value),
        Some(other) => return Err(malformed(format!("expected a table, got {other}")).into()),
        None => return Err(malformed("missing".to_string()).into()),
    };
    table.map_err(|e| malformed(e.to_string()).into())
}
