// ─────────────────────────────────────────────────────────────────────
// Antclock — Diagnostics
// ─────────────────────────────────────────────────────────────────────
//! Energy, entropy production, residual components and spectral
//! signals, all pure functions of state (plus a small rolling window
//! for the spectral acceleration).
//!
//! E = E_bulk + E_coupling + σ_E·s + ½m_eff·v_b²
//!
//! - E_bulk = dx·Σ[½(f_t²) + ½(D⁺f)² + V] over ρ, φ, ψ
//! - E_coupling = −J·ρ[i_b], J = −8πσ_E·s
//!
//! With forward-difference gradients the semi-discrete bulk flow
//! conserves E_bulk + E_coupling up to the ṡ and v̇ exchange terms.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use antclock_types::CouplingParams;

use crate::equations::{CoupledEquations, InterfaceProbe, StateRate};
use crate::grid::{Field, SystemState};
use crate::ops::{forward_difference, fourth_difference, sample_at};

const EIGHT_PI: f64 = 8.0 * std::f64::consts::PI;

/// Energy split into its contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    pub kinetic: f64,
    pub gradient: f64,
    pub potential: f64,
    pub coupling: f64,
    /// E_Σ(s) = σ_E·s.
    pub interface_entropy: f64,
    pub interface_kinetic: f64,
    pub total: f64,
}

#[inline]
fn potential_density(p: &CouplingParams, rho: f64, phi: f64, psi: f64) -> f64 {
    0.5 * p.lambda * rho * rho
        + 0.5 * p.dilaton_mass2 * phi * phi
        + 0.5 * psi * psi * (p.matter_mass2 + p.matter_coupling * rho + p.dilaton_coupling * phi)
}

/// Total energy of a state.
pub fn total_energy(state: &SystemState, params: &CouplingParams) -> EnergyBreakdown {
    let b = &state.bulk;
    let dx = state.grid.dx;
    let n = b.len();

    let mut kinetic = 0.0;
    let mut potential = 0.0;
    for i in 0..n {
        kinetic += 0.5 * (b.rho_t[i].powi(2) + b.phi_t[i].powi(2) + b.psi_t[i].powi(2));
        potential += potential_density(params, b.rho[i], b.phi[i], b.psi[i]);
    }

    let gradient: f64 = Field::ALL
        .iter()
        .map(|&f| {
            let d = forward_difference(b.field(f), dx);
            0.5 * d.iter().map(|v| v * v).sum::<f64>()
        })
        .sum();

    let s = state.interface.s;
    let j = -EIGHT_PI * params.sigma_energy * s;
    let coupling = if n > 0 {
        -j * b.rho[state.interface.i_b()]
    } else {
        0.0
    };
    let interface_entropy = params.sigma_energy * s;
    let interface_kinetic = 0.5 * params.m_eff * state.interface.v_b.powi(2);

    let kinetic = kinetic * dx;
    let gradient = gradient * dx;
    let potential = potential * dx;
    EnergyBreakdown {
        kinetic,
        gradient,
        potential,
        coupling,
        interface_entropy,
        interface_kinetic,
        total: kinetic + gradient + potential + coupling + interface_entropy + interface_kinetic,
    }
}

/// dE/dt by the chain rule from the evaluator's rates. i_b is held
/// fixed (it is piecewise constant in time).
pub fn energy_rate(state: &SystemState, rate: &StateRate, params: &CouplingParams) -> f64 {
    let b = &state.bulk;
    let r = &rate.bulk;
    let dx = state.grid.dx;
    let n = b.len();
    if n == 0 {
        return 0.0;
    }

    let mut bulk = 0.0;
    for i in 0..n {
        let psi2 = b.psi[i] * b.psi[i];
        let v_rho = params.lambda * b.rho[i] + 0.5 * params.matter_coupling * psi2;
        let v_phi = params.dilaton_mass2 * b.phi[i] + 0.5 * params.dilaton_coupling * psi2;
        let v_psi = b.psi[i]
            * (params.matter_mass2 + params.matter_coupling * b.rho[i] + params.dilaton_coupling * b.phi[i]);
        bulk += b.rho_t[i] * r.rho_t[i] + b.phi_t[i] * r.phi_t[i] + b.psi_t[i] * r.psi_t[i];
        bulk += v_rho * b.rho_t[i] + v_phi * b.phi_t[i] + v_psi * b.psi_t[i];
    }
    // Σ D⁺f·D⁺f_t
    for f in Field::ALL {
        let df = forward_difference(b.field(f), dx);
        let dft = forward_difference(b.rate(f), dx);
        bulk += df.iter().zip(&dft).map(|(a, c)| a * c).sum::<f64>();
    }
    bulk *= dx;

    let ifc = &state.interface;
    let i_b = ifc.i_b();
    let s_dot = rate.interface.s;
    let j = -EIGHT_PI * params.sigma_energy * ifc.s;
    let j_dot = -EIGHT_PI * params.sigma_energy * s_dot;
    let coupling = -j * b.rho_t[i_b] - j_dot * b.rho[i_b];

    bulk + coupling + params.sigma_energy * s_dot + params.m_eff * ifc.v_b * rate.interface.v_b
}

/// Instantaneous ds/dt of a state.
pub fn entropy_production_rate(state: &SystemState, equations: &CoupledEquations) -> f64 {
    let probe = equations.probe(state);
    equations.interface_rate(state, &probe).s
}

/// |J_meas − 8π·E_Σ(s)|.
#[inline]
pub fn junction_residual(probe: &InterfaceProbe) -> f64 {
    probe.junction_mismatch().abs()
}

/// Per-field truncation residual: RMS of (dx²/12)·Δ(Δf), ordered
/// as `Field::ALL`.
pub fn field_residuals(state: &SystemState) -> [f64; 3] {
    let dx = state.grid.dx;
    let scale = dx * dx / 12.0;
    let mut out = [0.0; 3];
    for (slot, f) in out.iter_mut().zip(Field::ALL) {
        let d4 = fourth_difference(state.bulk.field(f), dx);
        if d4.is_empty() {
            continue;
        }
        let ms = d4.iter().map(|v| (scale * v).powi(2)).sum::<f64>() / d4.len() as f64;
        *slot = ms.sqrt();
    }
    out
}

/// Power-weighted mean wavenumber of a periodic field (naive DFT,
/// DC excluded). Zero for a flat field.
pub fn spectral_centroid(field: &[f64], length: f64) -> f64 {
    let n = field.len();
    if n < 2 {
        return 0.0;
    }
    let base = std::f64::consts::TAU / n as f64;
    let mut weighted = 0.0;
    let mut total = 0.0;
    for k in 1..=n / 2 {
        let (mut re, mut im) = (0.0, 0.0);
        for (j, &v) in field.iter().enumerate() {
            let arg = base * (k * j % n) as f64;
            re += v * arg.cos();
            im -= v * arg.sin();
        }
        let power = re * re + im * im;
        weighted += power * std::f64::consts::TAU * k as f64 / length;
        total += power;
    }
    // Parseval bound: below this the spectrum is rounding noise
    let floor = 1e-20 * n as f64 * field.iter().map(|v| v * v).sum::<f64>();
    if total <= floor {
        0.0
    } else {
        weighted / total
    }
}

/// Rolling window of (t, centroid) samples for the spectral
/// acceleration signal.
#[derive(Debug, Clone)]
pub struct SpectralWindow {
    capacity: usize,
    samples: VecDeque<(f64, f64)>,
}

impl SpectralWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(3);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Record the ρ centroid of `state`.
    pub fn push_state(&mut self, state: &SystemState) {
        self.push(state.t, spectral_centroid(&state.bulk.rho, state.grid.length));
    }

    pub fn push(&mut self, t: f64, centroid: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((t, centroid));
    }

    /// Non-uniform second difference across oldest, middle and newest
    /// samples. Zero until three samples with distinct times exist.
    pub fn acceleration(&self) -> f64 {
        let n = self.samples.len();
        if n < 3 {
            return 0.0;
        }
        let (t0, c0) = self.samples[0];
        let (t1, c1) = self.samples[n / 2];
        let (t2, c2) = self.samples[n - 1];
        let (h0, h1) = (t1 - t0, t2 - t1);
        if h0 <= 0.0 || h1 <= 0.0 {
            return 0.0;
        }
        2.0 * ((c2 - c1) / h1 - (c1 - c0) / h0) / (h0 + h1)
    }
}

/// History-aware expansion: Δρ(x_b)/Δτ between consecutive states,
/// τ being the interface proper time. One entry per pair; pairs with
/// no proper-time progress give 0.
pub fn expansion_from_history(trajectory: &[SystemState]) -> Vec<f64> {
    trajectory
        .windows(2)
        .map(|w| {
            let rho_at = |s: &SystemState| sample_at(&s.bulk.rho, s.interface.x_b, s.grid.length, s.grid.dx);
            let d_tau = w[1].interface.tau - w[0].interface.tau;
            if d_tau > 0.0 {
                (rho_at(&w[1]) - rho_at(&w[0])) / d_tau
            } else {
                0.0
            }
        })
        .collect()
}
