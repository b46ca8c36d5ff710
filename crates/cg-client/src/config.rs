//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use cg_types::{config_error, CgResult};

/// Well-known service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://cogneato.xyz/api";

/// Attempts made before giving up on non-200 responses.
pub const DEFAULT_NUM_RETRIES: u32 = 3;

/// Fixed wait between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Where and how persistently to talk to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service URL requests are POSTed to.
    pub endpoint: String,

    /// Total number of attempts per request (not additional retries).
    pub num_retries: u32,

    /// Sleep between a non-200 response and the next attempt.
    pub retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            num_retries: DEFAULT_NUM_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_num_retries(mut self, n: u32) -> Self {
        self.num_retries = n;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn validate(&self) -> CgResult<()> {
        if self.num_retries == 0 {
            return Err(config_error!("num_retries must be at least 1"));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(config_error!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            ));
        }
        Ok(())
    }
}
