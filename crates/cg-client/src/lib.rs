//! # cg-client
//!
//! Transport exchange with the Cogneato optimization service.
//!
//! A request carries the measurements table and a requested arm count; the
//! response carries an analysis table, a design table, and a status message.
//! Non-200 responses are retried a fixed number of times with a fixed delay.

mod config;
mod exchange;
#[cfg(any(test, feature = "testing"))]
mod scripted;
mod transport;

pub use config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_NUM_RETRIES, DEFAULT_RETRY_DELAY};
pub use exchange::{request, ExchangeClient, ExchangeResponse, SUCCESS_MESSAGE};
#[cfg(any(test, feature = "testing"))]
pub use scripted::ScriptedTransport;
pub use transport::{HttpTransport, Transport, TransportResponse};
