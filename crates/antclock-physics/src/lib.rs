// ─────────────────────────────────────────────────────────────────────
// Antclock — Coupled-Field Physics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Periodic 1-D bulk fields (ρ, φ, ψ) joined by a moving dissipative
//! interface: grid and state, finite-difference operators, the coupled
//! equation evaluator, a fixed-step RK4 integrator, diagnostics and the
//! two canonical scenarios.

#![deny(unsafe_code)]

pub mod diagnostics;
pub mod equations;
pub mod grid;
pub mod ops;
pub mod rk4;
pub mod scenario;

pub use diagnostics::{
    energy_rate, entropy_production_rate, expansion_from_history, field_residuals, junction_residual,
    spectral_centroid, total_energy, EnergyBreakdown, SpectralWindow,
};
pub use equations::{CoupledEquations, InterfaceProbe, InterfaceRate, StateRate};
pub use grid::{Field, FieldSet, Grid, InterfaceState, NonFinite, SystemState};
pub use rk4::Rk4Stepper;
pub use scenario::{scenario_by_name, CliffScenario, ScenarioFactory, SmoothScenario};
