// ─────────────────────────────────────────────────────────────────────
// Antclock — Coupled-Field Engine Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, run configuration, and error hierarchy for the
//! Antclock engine: the semantic-time scheduler over the coupled
//! bulk/interface integrator.

pub mod config;
pub mod error;
pub mod event;

pub use config::{
    ConstraintTolerances, CouplingParams, RegimeThresholds, ResidualWeights, RunConfig,
};
pub use error::{AntclockError, AntclockResult};
pub use event::{finite_clamp, RunStatus, RunSummary, StepRecord, TickEvent, TickKind};
