// ─────────────────────────────────────────────────────────────────────
// Antclock — Tick Events, Run Status, Step Records
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn finite_clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("finite_clamp: NaN detected, clamping to {lo:.4e}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("finite_clamp: Inf detected, clamping to {boundary:.4e}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Closed set of tick-event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickKind {
    /// Trapping scalar crossed its threshold (marginally-trapped-like).
    TrappedCrossing,
    /// Entropy production rate burst.
    EntropyBurst,
    /// Gradient-jump rate spike at the interface.
    CurvatureSpike,
    /// Junction mismatch changed sign.
    JunctionSignFlip,
    /// Step accepted after retries exhausted with a constraint still violated.
    MonotonicityViolation,
}

impl TickKind {
    pub const REGIMES: [TickKind; 4] = [
        TickKind::TrappedCrossing,
        TickKind::EntropyBurst,
        TickKind::CurvatureSpike,
        TickKind::JunctionSignFlip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TickKind::TrappedCrossing => "trapped_crossing",
            TickKind::EntropyBurst => "entropy_burst",
            TickKind::CurvatureSpike => "curvature_spike",
            TickKind::JunctionSignFlip => "junction_sign_flip",
            TickKind::MonotonicityViolation => "monotonicity_violation",
        }
    }

    /// True for the four regime detectors, false for violations.
    pub fn is_regime(&self) -> bool {
        !matches!(self, TickKind::MonotonicityViolation)
    }
}

/// Immutable record emitted by the scheduler when a regime fires or a
/// constraint is violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    /// Trajectory index of the state the event belongs to: 0 for the
    /// initial state, otherwise the 1-based accepted step.
    pub step: usize,
    /// Semantic time after the step.
    pub tau_sched: f64,
    /// Coordinate time after the step.
    pub t: f64,
    pub kind: TickKind,
    /// Composite residual of the state the step started from.
    pub residual_before: f64,
    /// Composite residual of the accepted state.
    pub residual_after: f64,
    /// Coordinate step planned by the step-size law (0 at step 0).
    pub dt_before: f64,
    /// Coordinate step actually accepted after halvings (0 at step 0).
    pub dt_after: f64,
    /// Human-readable cause.
    pub detail: String,
}

/// Terminal status of a run. Partial results are preserved in every case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Target semantic time reached.
    Ok,
    /// NaN/Inf detected right after a tentative step.
    NumericalFailure { step: usize, quantity: String },
    /// Step ceiling reached before the target semantic time.
    DidNotConverge { reason: String },
}

impl RunStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, RunStatus::Ok)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Ok => "ok",
            RunStatus::NumericalFailure { .. } => "numerical_failure",
            RunStatus::DidNotConverge { .. } => "did_not_converge",
        }
    }
}

/// Summary counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    /// Final semantic time reached.
    pub tau_sched: f64,
    /// Final coordinate time reached.
    pub t: f64,
    pub regime_events: usize,
    pub violations: usize,
}

/// Diagnostic sample logged for every accepted step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub t: f64,
    pub tau_sched: f64,
    pub dt: f64,
    /// Coordinate step before halvings; dt = dt_plan / 2^retries.
    pub dt_plan: f64,
    pub d_tau: f64,
    pub retries: u32,
    /// Composite residual ℜ of the accepted state.
    pub residual: f64,
    pub flux_novelty: f64,
    pub energy: f64,
    pub entropy: f64,
    pub energy_flux: f64,
    pub spectral_acceleration: f64,
    /// The step was taken with the regime boost.
    pub boosted: bool,
    /// A detector fired on the accepted state.
    pub regime_fired: bool,
    pub violation: bool,
}
