// ─────────────────────────────────────────────────────────────────────
// Antclock — Regime-Change Detection
// ─────────────────────────────────────────────────────────────────────
//! Closed set of binary detectors over already computed quantities.
//! Each compares the probe of the current accepted state with the
//! previous one:
//!
//!   - trapped_crossing: ρ_t² − ρ_x² at x_b crosses the trapping level
//!   - entropy_burst: ṡ rises through its level, or ΔF spikes while ṡ grows
//!   - curvature_spike: |ΔJ_meas|/Δt above the rate limit
//!   - junction_sign_flip: signed mismatch flips with both sides above the floor

use serde::{Deserialize, Serialize};

use antclock_types::{RegimeThresholds, TickKind};

/// Detector inputs sampled from one accepted state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeProbe {
    pub t: f64,
    pub trapping: f64,
    pub entropy_rate: f64,
    pub flux_novelty: f64,
    pub gradient_jump: f64,
    pub junction_mismatch: f64,
}

/// A detector that fired, with a human-readable cause.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeSignal {
    pub kind: TickKind,
    pub detail: String,
}

/// Stateful detector bank; remembers the previous probe only.
#[derive(Debug, Clone)]
pub struct RegimeDetector {
    thresholds: RegimeThresholds,
    prev: Option<RegimeProbe>,
}

impl RegimeDetector {
    pub fn new(thresholds: RegimeThresholds) -> Self {
        Self { thresholds, prev: None }
    }

    pub fn previous(&self) -> Option<&RegimeProbe> {
        self.prev.as_ref()
    }

    /// Run every detector against `probe`, then make it the new
    /// reference. Signals come out in `TickKind::REGIMES` order.
    pub fn detect(&mut self, probe: RegimeProbe) -> Vec<RegimeSignal> {
        let th = &self.thresholds;
        let mut out = Vec::new();

        // The first state counts as rising from zero entropy production.
        let prev_rate = self.prev.map_or(0.0, |p| p.entropy_rate);

        if let Some(prev) = self.prev {
            let before = prev.trapping - th.trapped;
            let after = probe.trapping - th.trapped;
            if before * after < 0.0 || (before != 0.0 && after == 0.0) {
                out.push(RegimeSignal {
                    kind: TickKind::TrappedCrossing,
                    detail: format!(
                        "trapping scalar {:.4e} -> {:.4e} crossed {:.4e}",
                        prev.trapping, probe.trapping, th.trapped
                    ),
                });
            }
        }

        let rising = probe.entropy_rate > prev_rate;
        if probe.entropy_rate > th.entropy_burst && prev_rate <= th.entropy_burst {
            out.push(RegimeSignal {
                kind: TickKind::EntropyBurst,
                detail: format!(
                    "entropy rate {:.4e} rose above {:.4e}",
                    probe.entropy_rate, th.entropy_burst
                ),
            });
        } else if probe.flux_novelty > th.novelty && rising {
            out.push(RegimeSignal {
                kind: TickKind::EntropyBurst,
                detail: format!(
                    "flux novelty {:.4e} above {:.4e} with rising entropy rate",
                    probe.flux_novelty, th.novelty
                ),
            });
        }

        if let Some(prev) = self.prev {
            let span = probe.t - prev.t;
            if span > 0.0 {
                let rate = (probe.gradient_jump - prev.gradient_jump).abs() / span;
                if rate > th.curvature_rate {
                    out.push(RegimeSignal {
                        kind: TickKind::CurvatureSpike,
                        detail: format!("gradient-jump rate {:.4e} above {:.4e}", rate, th.curvature_rate),
                    });
                }
            }

            let (a, b) = (prev.junction_mismatch, probe.junction_mismatch);
            let floor = th.junction_flip_floor;
            if a.signum() != b.signum() && a.abs() > floor && b.abs() > floor {
                out.push(RegimeSignal {
                    kind: TickKind::JunctionSignFlip,
                    detail: format!("junction mismatch {a:.4e} -> {b:.4e}"),
                });
            }
        }

        if !out.is_empty() {
            log::debug!("regime: {} detector(s) fired at t={:.4e}", out.len(), probe.t);
        }
        self.prev = Some(probe);
        out
    }
}
