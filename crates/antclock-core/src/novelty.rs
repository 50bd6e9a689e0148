// ─────────────────────────────────────────────────────────────────────
// Antclock — Flux Novelty
// ─────────────────────────────────────────────────────────────────────
//! ΔF: distance between the observed (S, Π, ṡ) and a linear
//! extrapolation from the two previous accepted samples. Zero until
//! two samples exist.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One flux observation at coordinate time t.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxSample {
    pub t: f64,
    pub energy_flux: f64,
    pub momentum_flux: f64,
    pub entropy_rate: f64,
}

impl FluxSample {
    fn components(&self) -> [f64; 3] {
        [self.energy_flux, self.momentum_flux, self.entropy_rate]
    }
}

/// Two-sample predictor for the flux triple.
#[derive(Debug, Clone, Default)]
pub struct FluxNovelty {
    history: VecDeque<FluxSample>,
}

impl FluxNovelty {
    const HORIZON: usize = 2;

    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(Self::HORIZON),
        }
    }

    /// Prediction error for `sample` without recording it.
    pub fn novelty(&self, sample: &FluxSample) -> f64 {
        if self.history.len() < Self::HORIZON {
            return 0.0;
        }
        let a = &self.history[0];
        let b = &self.history[1];
        let span = b.t - a.t;
        let (ca, cb, cs) = (a.components(), b.components(), sample.components());
        let mut err2 = 0.0;
        for k in 0..3 {
            let predicted = if span > 0.0 {
                cb[k] + (cb[k] - ca[k]) * (sample.t - b.t) / span
            } else {
                cb[k]
            };
            err2 += (cs[k] - predicted).powi(2);
        }
        err2.sqrt()
    }

    /// Novelty of `sample`, then record it.
    pub fn observe(&mut self, sample: FluxSample) -> f64 {
        let delta = self.novelty(&sample);
        if self.history.len() == Self::HORIZON {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        delta
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
