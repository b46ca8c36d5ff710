//! In-memory transport that replays canned responses.
//!
//! Lets a session run offline: each POST pops the next queued response and
//! the request payload is recorded for inspection.

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

use cg_types::{CgResult, ExchangeError, Table};

use crate::exchange::SUCCESS_MESSAGE;
use crate::transport::{Transport, TransportResponse};

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<TransportResponse>>,
    requests: RefCell<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push(&self, status: u16, body: impl Into<String>) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(TransportResponse::new(status, body));
        self
    }

    /// Queue a 200 response carrying a successful analysis and design.
    pub fn push_ok(&self, analysis: &Table, design: &Table) -> CgResult<&Self> {
        let body = json!({
            "message": SUCCESS_MESSAGE,
            "analysis": analysis.to_json_string()?,
            "design": design.to_json_string()?,
        });
        Ok(self.push(200, body.to_string()))
    }

    /// Queue a 200 response with a server-reported error message.
    pub fn push_message(&self, message: &str) -> &Self {
        self.push(200, json!({ "message": message }).to_string())
    }

    /// Every (url, payload) posted so far, oldest first.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn post_json(&self, url: &str, body: &Value) -> CgResult<TransportResponse> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), body.clone()));
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ExchangeError::Http("connection refused: no scripted response left".into()).into())
    }
}
