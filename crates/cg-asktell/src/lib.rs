//! # cg-asktell
//!
//! Ask/tell loop over the Cogneato optimization service.
//!
//! Construct an [`AskTell`] with a `"name:domain"` schema, `ask` for a batch
//! of arms, evaluate them, `tell` the observed metrics, repeat. The session
//! keeps every measurement, the service's current favorite, and the best
//! metric told so far.

mod session;
mod tracking;

pub use session::AskTell;
pub use tracking::{RunningBest, Scored};

pub use cg_client::{ClientConfig, ExchangeClient, HttpTransport, Transport};
pub use cg_types::{CgError, CgResult, ParameterValue, Parameters, Schema};
