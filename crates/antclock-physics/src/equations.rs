// ─────────────────────────────────────────────────────────────────────
// Antclock — Coupled Equation Evaluator
// ─────────────────────────────────────────────────────────────────────
//! Right-hand side of the coupled bulk/interface system.
//!
//! Bulk (potential V = ½Λρ² + ½m_φ²φ² + ½ψ²(μ² + g_ρρ + g_φφ)):
//!
//!   ρ_tt = Δρ − Λρ − ½g_ρψ² + δ_{i,i_b}·J/dx,   J = −8π·σ_E·s
//!   φ_tt = Δφ − m_φ²φ − ½g_φψ²
//!   ψ_tt = Δψ − (μ² + g_ρρ + g_φφ)ψ
//!
//! Interface (all sampled at x_b):
//!
//!   dx_b/dt = v_b
//!   dv_b/dt = (λ_flux·S + λ_jump·(J_meas − 8πσ_E·s)) / m_eff
//!   dθ/dt   = v_b·ρ_x
//!   ds/dt   = c·(λ_flux·|S| − κs) / T_Σ
//!   dτ/dt   = c = e^{ρ}·sqrt(max(0, 1 − v_b²))
//!
//! θ is a one-step proxy for the proper-time log-derivative of the
//! clock-stretch factor; it is not exact. See
//! `diagnostics::expansion_from_history` for the history-aware estimate.

use serde::{Deserialize, Serialize};

use antclock_types::CouplingParams;

use crate::grid::{FieldSet, SystemState};
use crate::ops::{gradient_jump, laplacian_into, sample_at, sample_gradient_at};

const EIGHT_PI: f64 = 8.0 * std::f64::consts::PI;

/// Interface quantities sampled from a state. Pure function of the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceProbe {
    pub psi_t: f64,
    pub psi_x: f64,
    pub rho: f64,
    pub rho_x: f64,
    pub rho_t: f64,
    /// Matter energy flux S = −ψ_t·ψ_x.
    pub energy_flux: f64,
    /// Matter momentum flux Π = ½(ψ_t² + ψ_x²).
    pub momentum_flux: f64,
    /// Measured ρ gradient jump across cell i_b.
    pub gradient_jump: f64,
    /// Junction target 8π·E_Σ(s).
    pub target_jump: f64,
    /// Clock rate dτ/dt.
    pub clock_rate: f64,
}

impl InterfaceProbe {
    /// Signed junction mismatch J_meas − target.
    #[inline]
    pub fn junction_mismatch(&self) -> f64 {
        self.gradient_jump - self.target_jump
    }

    /// Trapping scalar ρ_t² − ρ_x² (null-expansion product proxy).
    #[inline]
    pub fn trapping_scalar(&self) -> f64 {
        self.rho_t * self.rho_t - self.rho_x * self.rho_x
    }
}

/// Time derivative of the interface scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRate {
    pub x_b: f64,
    pub v_b: f64,
    pub s: f64,
    pub tau: f64,
    pub theta: f64,
}

/// Full right-hand side of a state.
///
/// `bulk` holds d/dt of each `FieldSet` slot: `bulk.rho` is ρ_t,
/// `bulk.rho_t` is ρ_tt, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRate {
    pub bulk: FieldSet,
    pub interface: InterfaceRate,
    pub probe: InterfaceProbe,
}

/// Evaluator of the coupled equations for a fixed parameter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoupledEquations {
    pub params: CouplingParams,
}

impl CoupledEquations {
    pub fn new(params: CouplingParams) -> Self {
        Self { params }
    }

    /// Junction target 8π·E_Σ(s), E_Σ(s) = σ_E·s.
    #[inline]
    pub fn target_jump(&self, s: f64) -> f64 {
        EIGHT_PI * self.params.sigma_energy * s
    }

    /// Weight J of the localized ρ source at i_b.
    #[inline]
    pub fn source_weight(&self, s: f64) -> f64 {
        -self.target_jump(s)
    }

    /// Sample the interface quantities. No allocation.
    pub fn probe(&self, state: &SystemState) -> InterfaceProbe {
        let g = &state.grid;
        let b = &state.bulk;
        let ifc = &state.interface;
        let x = ifc.x_b;

        let psi_t = sample_at(&b.psi_t, x, g.length, g.dx);
        let psi_x = sample_gradient_at(&b.psi, x, g.length, g.dx);
        let rho = sample_at(&b.rho, x, g.length, g.dx);
        let rho_x = sample_gradient_at(&b.rho, x, g.length, g.dx);
        let rho_t = sample_at(&b.rho_t, x, g.length, g.dx);

        let lorentz = (1.0 - ifc.v_b * ifc.v_b).max(0.0).sqrt();

        InterfaceProbe {
            psi_t,
            psi_x,
            rho,
            rho_x,
            rho_t,
            energy_flux: -psi_t * psi_x,
            momentum_flux: 0.5 * (psi_t * psi_t + psi_x * psi_x),
            gradient_jump: gradient_jump(&b.rho, ifc.i_b(), g.dx),
            target_jump: self.target_jump(ifc.s),
            clock_rate: rho.exp() * lorentz,
        }
    }

    /// Interface right-hand side from a probe.
    pub fn interface_rate(&self, state: &SystemState, probe: &InterfaceProbe) -> InterfaceRate {
        let p = &self.params;
        let ifc = &state.interface;
        let force = p.lambda_flux * probe.energy_flux + p.lambda_jump * probe.junction_mismatch();
        let flux_in = p.lambda_flux * probe.energy_flux.abs();
        InterfaceRate {
            x_b: ifc.v_b,
            v_b: force / p.m_eff,
            s: probe.clock_rate * (flux_in - p.kappa * ifc.s) / p.t_sigma,
            tau: probe.clock_rate,
            theta: ifc.v_b * probe.rho_x,
        }
    }

    /// Evaluate the full right-hand side of `state`.
    pub fn evaluate(&self, state: &SystemState) -> StateRate {
        let p = &self.params;
        let dx = state.grid.dx;
        let b = &state.bulk;
        let n = b.len();

        let mut rate = FieldSet {
            rho: b.rho_t.clone(),
            rho_t: vec![0.0; n],
            phi: b.phi_t.clone(),
            phi_t: vec![0.0; n],
            psi: b.psi_t.clone(),
            psi_t: vec![0.0; n],
        };

        // Laplacians land directly in the acceleration slots
        laplacian_into(&b.rho, dx, &mut rate.rho_t);
        laplacian_into(&b.phi, dx, &mut rate.phi_t);
        laplacian_into(&b.psi, dx, &mut rate.psi_t);

        for i in 0..n {
            let psi2 = b.psi[i] * b.psi[i];
            rate.rho_t[i] -= p.lambda * b.rho[i] + 0.5 * p.matter_coupling * psi2;
            rate.phi_t[i] -= p.dilaton_mass2 * b.phi[i] + 0.5 * p.dilaton_coupling * psi2;
            let mass = p.matter_mass2 + p.matter_coupling * b.rho[i] + p.dilaton_coupling * b.phi[i];
            rate.psi_t[i] -= mass * b.psi[i];
        }

        let i_b = state.interface.i_b();
        if i_b < n {
            rate.rho_t[i_b] += self.source_weight(state.interface.s) / dx;
        }

        let probe = self.probe(state);
        let interface = self.interface_rate(state, &probe);
        StateRate {
            bulk: rate,
            interface,
            probe,
        }
    }
}
