// ─────────────────────────────────────────────────────────────────────
// Antclock — Adaptive Scheduler
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Residual-driven semantic-time scheduler over the fixed-step RK4
//! integrator: composite residual, flux novelty, regime detection,
//! monotonicity enforcement and whole-run parameter sweeps.

#![deny(unsafe_code)]

pub mod constraints;
pub mod novelty;
pub mod regime;
pub mod residual;
pub mod scheduler;
pub mod sweep;

pub use constraints::{check_step, ConstraintSample, ConstraintViolation};
pub use novelty::{FluxNovelty, FluxSample};
pub use regime::{RegimeDetector, RegimeProbe, RegimeSignal};
pub use residual::Residual;
pub use scheduler::{run, Antclock, Assessment, RunOutcome, StepOutcome};
pub use sweep::run_sweep;
