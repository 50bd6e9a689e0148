// ─────────────────────────────────────────────────────────────────────
// Antclock — Composite Residual
// ─────────────────────────────────────────────────────────────────────
//! ℜ = w_field·Σ field + w_junction·junction + w_conservation·conservation
//!
//! - field: RMS truncation residual (dx²/12)·Δ(Δf) per bulk field
//! - junction: |J_meas − 8π·E_Σ(s)|
//! - conservation: |dE/dt| / max(E, 1e-12)

use serde::{Deserialize, Serialize};

use antclock_physics::{energy_rate, field_residuals, junction_residual, total_energy, StateRate, SystemState};
use antclock_types::{CouplingParams, ResidualWeights};

/// Named residual magnitudes plus the weighted total. Derived, never
/// stored on the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    /// Per-field residuals ordered ρ, φ, ψ.
    pub field: [f64; 3],
    pub junction: f64,
    pub conservation: f64,
    pub total: f64,
}

impl Residual {
    /// Evaluate every component for `state`, reusing its already
    /// computed right-hand side.
    pub fn evaluate(state: &SystemState, rate: &StateRate, params: &CouplingParams, weights: &ResidualWeights) -> Self {
        let field = field_residuals(state);
        let junction = junction_residual(&rate.probe);
        let energy = total_energy(state, params).total;
        let conservation = energy_rate(state, rate, params).abs() / energy.abs().max(1e-12);
        Self::from_parts(field, junction, conservation, weights)
    }

    pub fn from_parts(field: [f64; 3], junction: f64, conservation: f64, weights: &ResidualWeights) -> Self {
        let field_sum: f64 = field.iter().sum();
        Self {
            field,
            junction,
            conservation,
            total: weights.field * field_sum + weights.junction * junction + weights.conservation * conservation,
        }
    }

    pub fn field_sum(&self) -> f64 {
        self.field.iter().sum()
    }
}
