//! Favorite and running-best bookkeeping.

use serde::{Deserialize, Serialize};

use cg_types::Parameters;

/// A parameter setting paired with its metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub phi: f64,
    pub params: Parameters,
}

impl Scored {
    pub fn new(phi: f64, params: Parameters) -> Self {
        Self { phi, params }
    }
}

/// Largest metric ever told, with the parameters it was told for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningBest {
    best: Option<Scored>,
}

impl RunningBest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the best if `phi` strictly exceeds it. Returns whether it did.
    pub fn offer(&mut self, phi: f64, params: &Parameters) -> bool {
        let improves = match &self.best {
            None => !phi.is_nan(),
            Some(current) => phi > current.phi,
        };
        if improves {
            self.best = Some(Scored::new(phi, params.clone()));
        }
        improves
    }

    pub fn get(&self) -> Option<&Scored> {
        self.best.as_ref()
    }
}
