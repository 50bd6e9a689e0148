// ─────────────────────────────────────────────────────────────────────
// Antclock — Fixed-Step RK4 Integrator
// ─────────────────────────────────────────────────────────────────────
//! Classical four-stage Runge-Kutta applied jointly to the six bulk
//! sequences and the five interface scalars.
//!
//! Stages are built by scaled addition into fresh states; the input is
//! never mutated. No constraint checking happens here.

use antclock_types::{AntclockError, AntclockResult, CouplingParams};

use crate::equations::{CoupledEquations, StateRate};
use crate::grid::SystemState;

/// Pure fixed-step stepper. Holds no per-run state.
#[derive(Debug, Clone, Default)]
pub struct Rk4Stepper {
    pub equations: CoupledEquations,
}

/// base + Σ w_k·rate_k, with x_b wrapped and i_b recomputed.
fn combine(base: &SystemState, terms: &[(&StateRate, f64)], dt: f64) -> SystemState {
    let n = base.bulk.len();
    let mut bulk = base.bulk.clone();

    for (rate, w) in terms {
        let r = &rate.bulk;
        for i in 0..n {
            bulk.rho[i] += w * r.rho[i];
            bulk.rho_t[i] += w * r.rho_t[i];
            bulk.phi[i] += w * r.phi[i];
            bulk.phi_t[i] += w * r.phi_t[i];
            bulk.psi[i] += w * r.psi[i];
            bulk.psi_t[i] += w * r.psi_t[i];
        }
    }

    let mut interface = base.interface.clone();
    for (rate, w) in terms {
        let r = &rate.interface;
        interface.x_b += w * r.x_b;
        interface.v_b += w * r.v_b;
        interface.s += w * r.s;
        interface.tau += w * r.tau;
        interface.theta += w * r.theta;
    }
    interface.relocate(&base.grid);

    SystemState {
        grid: base.grid,
        bulk,
        interface,
        t: base.t + dt,
    }
}

impl Rk4Stepper {
    pub fn new(params: CouplingParams) -> Self {
        Self {
            equations: CoupledEquations::new(params),
        }
    }

    /// Advance `state` by one coordinate step `dt`.
    pub fn step(&self, state: &SystemState, dt: f64) -> SystemState {
        let eq = &self.equations;
        let half = 0.5 * dt;

        let k1 = eq.evaluate(state);
        let s2 = combine(state, &[(&k1, half)], half);
        let k2 = eq.evaluate(&s2);
        let s3 = combine(state, &[(&k2, half)], half);
        let k3 = eq.evaluate(&s3);
        let s4 = combine(state, &[(&k3, dt)], dt);
        let k4 = eq.evaluate(&s4);

        let sixth = dt / 6.0;
        combine(
            state,
            &[(&k1, sixth), (&k2, 2.0 * sixth), (&k3, 2.0 * sixth), (&k4, sixth)],
            dt,
        )
    }

    /// `step`, failing with `AntclockError::Numerical` if the result
    /// holds a NaN/Inf. `step_index` is reported in the error.
    pub fn checked_step(&self, state: &SystemState, dt: f64, step_index: usize) -> AntclockResult<SystemState> {
        let next = self.step(state, dt);
        match next.find_non_finite() {
            Some(bad) => Err(AntclockError::Numerical {
                step: step_index,
                quantity: bad.describe(),
            }),
            None => Ok(next),
        }
    }

    /// Run `steps` fixed steps and return the final state.
    pub fn run(&self, initial: &SystemState, dt: f64, steps: usize) -> AntclockResult<SystemState> {
        validate_dt(dt)?;
        log::debug!("rk4: fixed run dt={dt:.4e} steps={steps}");
        let mut state = initial.clone();
        for k in 1..=steps {
            state = self.checked_step(&state, dt, k)?;
        }
        Ok(state)
    }

    /// Run `steps` fixed steps, returning every state including the
    /// initial one.
    pub fn trajectory(&self, initial: &SystemState, dt: f64, steps: usize) -> AntclockResult<Vec<SystemState>> {
        validate_dt(dt)?;
        log::debug!("rk4: fixed trajectory dt={dt:.4e} steps={steps}");
        let mut out = Vec::with_capacity(steps + 1);
        out.push(initial.clone());
        for k in 1..=steps {
            let next = self.checked_step(&out[k - 1], dt, k)?;
            out.push(next);
        }
        Ok(out)
    }
}

fn validate_dt(dt: f64) -> AntclockResult<()> {
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(AntclockError::Config(format!(
            "fixed step dt must be finite and > 0, got {dt}"
        )));
    }
    Ok(())
}
