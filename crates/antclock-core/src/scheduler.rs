// ─────────────────────────────────────────────────────────────────────
// Antclock — Adaptive Semantic-Time Scheduler
// ─────────────────────────────────────────────────────────────────────
//! Per accepted step:
//!   1. Residual ℜ of the accepted state (cached from acceptance)
//!   2. Flux novelty ΔF (cached)
//!   3. Regime detectors (cached)
//!   4. dτ = boost·ε/(ℜ+δ) clamped to [τ_min_step, τ_max_step]
//!   5. dt = dτ/c clamped to [dt_min, min(dt_max, cfl·dx)]
//!   6. Tentative RK4 step
//!   7. Monotonicity checks; halve dt and retry, bounded
//!   8. Accept: project s, assess the new state, log its regime ticks
//!      and any violation, τ_sched += dτ·dt/dt_plan
//!
//! Regime ticks carry the index of the state they were detected on;
//! signals of the initial state are logged as step 0. A signal boosts
//! the step that follows its state.
//!
//! The run ends when τ_sched ≥ τ_max (ok), the accepted-step ceiling is
//! hit (did_not_converge) or a tentative step goes non-finite
//! (numerical_failure). Partial results survive every outcome.

use serde::{Deserialize, Serialize};

use antclock_physics::{
    total_energy, InterfaceProbe, Rk4Stepper, SpectralWindow, StateRate, SystemState,
};
use antclock_types::{
    finite_clamp, AntclockError, AntclockResult, RunConfig, RunStatus, RunSummary, StepRecord,
    TickEvent, TickKind,
};

use crate::constraints::{check_step, ConstraintSample, ConstraintViolation};
use crate::novelty::{FluxNovelty, FluxSample};
use crate::regime::{RegimeDetector, RegimeProbe, RegimeSignal};
use crate::residual::Residual;

/// Everything the scheduler knows about the current accepted state.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub residual: Residual,
    pub probe: InterfaceProbe,
    pub entropy_rate: f64,
    pub flux_novelty: f64,
    pub energy: f64,
    pub spectral_acceleration: f64,
    /// Detectors that fired on this state; they boost the next step.
    pub signals: Vec<RegimeSignal>,
}

/// Result of one `Antclock::step` call.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// A step was accepted; the run can continue.
    Accepted(StepRecord),
    /// The run is over.
    Finished(RunStatus),
}

/// Complete output of a run. `trajectory[0]` is the initial state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub trajectory: Vec<SystemState>,
    pub events: Vec<TickEvent>,
    pub records: Vec<StepRecord>,
    pub summary: RunSummary,
}

/// Residual-driven adaptive scheduler wrapping the RK4 stepper.
pub struct Antclock {
    config: RunConfig,
    stepper: Rk4Stepper,
    trajectory: Vec<SystemState>,
    events: Vec<TickEvent>,
    records: Vec<StepRecord>,
    summary: RunSummary,
    status: Option<RunStatus>,
    current: Assessment,
    novelty: FluxNovelty,
    detector: RegimeDetector,
    spectral: SpectralWindow,
}

impl Antclock {
    /// Validate `config` against `initial` and assess the initial state.
    pub fn new(config: RunConfig, initial: SystemState) -> AntclockResult<Self> {
        config.validate()?;
        initial.validate()?;
        let cfl_limit = config.cfl * initial.grid.dx;
        if config.dt_min > cfl_limit {
            return Err(AntclockError::Config(format!(
                "dt_min {:.4e} exceeds the CFL limit cfl*dx = {:.4e}",
                config.dt_min, cfl_limit
            )));
        }

        let stepper = Rk4Stepper::new(config.coupling.clone());
        let mut novelty = FluxNovelty::new();
        let mut detector = RegimeDetector::new(config.thresholds.clone());
        let mut spectral = SpectralWindow::new(config.spectral_window);

        let current = assess(&config, &stepper, &initial, &mut novelty, &mut detector, &mut spectral);

        let mut summary = RunSummary::default();
        let events: Vec<TickEvent> = current
            .signals
            .iter()
            .map(|sig| TickEvent {
                step: 0,
                tau_sched: 0.0,
                t: initial.t,
                kind: sig.kind,
                residual_before: current.residual.total,
                residual_after: current.residual.total,
                dt_before: 0.0,
                dt_after: 0.0,
                detail: sig.detail.clone(),
            })
            .collect();
        summary.regime_events = events.len();

        log::info!(
            "antclock: start N={} L={} tau_max={} max_steps={}",
            initial.grid.n,
            initial.grid.length,
            config.tau_max,
            config.max_steps
        );

        Ok(Self {
            config,
            stepper,
            trajectory: vec![initial],
            events,
            records: Vec::new(),
            summary,
            status: None,
            current,
            novelty,
            detector,
            spectral,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Latest accepted state.
    pub fn state(&self) -> &SystemState {
        // trajectory always holds at least the initial state
        &self.trajectory[self.trajectory.len() - 1]
    }

    pub fn trajectory(&self) -> &[SystemState] {
        &self.trajectory
    }

    pub fn events(&self) -> &[TickEvent] {
        &self.events
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn assessment(&self) -> &Assessment {
        &self.current
    }

    /// Terminal status, once the run has ended.
    pub fn status(&self) -> Option<&RunStatus> {
        self.status.as_ref()
    }

    pub fn tau_sched(&self) -> f64 {
        self.summary.tau_sched
    }

    // ------------------------------------------------------------------
    // Step-size law
    // ------------------------------------------------------------------

    /// Semantic increment from the current residual and regime state.
    pub fn semantic_step(&self) -> f64 {
        let cfg = &self.config;
        let boost = if self.current.signals.is_empty() {
            1.0
        } else {
            cfg.regime_boost
        };
        let raw = boost * cfg.epsilon / (self.current.residual.total + cfg.delta);
        finite_clamp(raw, cfg.tau_min_step, cfg.tau_max_step)
    }

    /// Coordinate step for a semantic increment, via the clock rate.
    pub fn coordinate_step(&self, d_tau: f64) -> f64 {
        let cfg = &self.config;
        let ceiling = cfg.dt_max.min(cfg.cfl * self.state().grid.dx);
        let c = self.current.probe.clock_rate;
        let raw = if c > 0.0 && c.is_finite() { d_tau / c } else { ceiling };
        finite_clamp(raw, cfg.dt_min, ceiling)
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    fn finish(&mut self, status: RunStatus) -> StepOutcome {
        let s = &self.summary;
        log::info!(
            "antclock: {} after {} accepted / {} rejected steps (tau_sched={:.4}, t={:.4})",
            status.as_str(),
            s.accepted_steps,
            s.rejected_steps,
            s.tau_sched,
            s.t
        );
        self.status = Some(status.clone());
        StepOutcome::Finished(status)
    }

    /// Advance by one accepted step, or report the terminal status.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(status) = &self.status {
            return StepOutcome::Finished(status.clone());
        }
        if self.summary.tau_sched >= self.config.tau_max {
            return self.finish(RunStatus::Ok);
        }
        if self.summary.accepted_steps >= self.config.max_steps {
            let reason = format!(
                "step ceiling {} reached at tau_sched={:.4e} < tau_max={:.4e}",
                self.config.max_steps, self.summary.tau_sched, self.config.tau_max
            );
            return self.finish(RunStatus::DidNotConverge { reason });
        }

        let step_index = self.summary.accepted_steps + 1;
        let d_tau = self.semantic_step();
        let dt_plan = self.coordinate_step(d_tau);
        let tol = self.config.tolerances.clone();

        let before = constraint_sample(self.state(), &self.current.probe, self.config.coupling.m_eff);

        let mut dt = dt_plan;
        let mut retries: u32 = 0;
        let (candidate, violation) = loop {
            let candidate = self.stepper.step(self.state(), dt);
            if let Some(bad) = candidate.find_non_finite() {
                let quantity = bad.describe();
                log::error!("antclock: non-finite {quantity} at step {step_index} (dt={dt:.4e})");
                return self.finish(RunStatus::NumericalFailure {
                    step: step_index,
                    quantity,
                });
            }

            let probe = self.stepper.equations.probe(&candidate);
            let after = constraint_sample(&candidate, &probe, self.config.coupling.m_eff);
            let violation = check_step(&before, &after, &tol);
            let Some(v) = violation else {
                break (candidate, None);
            };

            let halved = 0.5 * dt;
            if retries >= self.config.max_retries || halved < self.config.dt_min {
                break (candidate, Some(v));
            }
            log::debug!("antclock: step {step_index} rejected ({v}), dt {dt:.4e} -> {halved:.4e}");
            self.summary.rejected_steps += 1;
            retries += 1;
            dt = halved;
        };

        self.accept(candidate, violation, step_index, d_tau, dt_plan, dt, retries)
    }

    #[allow(clippy::too_many_arguments)]
    fn accept(
        &mut self,
        mut candidate: SystemState,
        violation: Option<ConstraintViolation>,
        step_index: usize,
        d_tau: f64,
        dt_plan: f64,
        dt: f64,
        retries: u32,
    ) -> StepOutcome {
        // Hard projection: stored entropy never decreases.
        let s_prev = self.state().interface.s;
        if candidate.interface.s < s_prev {
            candidate.interface.s = s_prev;
        }

        let boosted = !self.current.signals.is_empty();
        let residual_before = self.current.residual.total;

        let next = assess(
            &self.config,
            &self.stepper,
            &candidate,
            &mut self.novelty,
            &mut self.detector,
            &mut self.spectral,
        );

        self.summary.accepted_steps = step_index;
        self.summary.tau_sched += d_tau * (dt / dt_plan);
        self.summary.t = candidate.t;

        let tick = |kind: TickKind, detail: String| TickEvent {
            step: step_index,
            tau_sched: self.summary.tau_sched,
            t: candidate.t,
            kind,
            residual_before,
            residual_after: next.residual.total,
            dt_before: dt_plan,
            dt_after: dt,
            detail,
        };

        let mut new_events: Vec<TickEvent> = next
            .signals
            .iter()
            .map(|sig| tick(sig.kind, sig.detail.clone()))
            .collect();
        if let Some(v) = &violation {
            log::warn!(
                "antclock: step {step_index} accepted with monotonicity violation after {retries} retries: {v}"
            );
            new_events.push(tick(TickKind::MonotonicityViolation, v.to_string()));
        }
        self.summary.regime_events += next.signals.len();
        self.summary.violations += usize::from(violation.is_some());
        self.events.extend(new_events);

        let record = StepRecord {
            step: step_index,
            t: candidate.t,
            tau_sched: self.summary.tau_sched,
            dt,
            dt_plan,
            d_tau,
            retries,
            residual: next.residual.total,
            flux_novelty: next.flux_novelty,
            energy: next.energy,
            entropy: candidate.interface.s,
            energy_flux: next.probe.energy_flux,
            spectral_acceleration: next.spectral_acceleration,
            boosted,
            regime_fired: !next.signals.is_empty(),
            violation: violation.is_some(),
        };
        self.records.push(record.clone());
        self.trajectory.push(candidate);
        self.current = next;
        StepOutcome::Accepted(record)
    }

    /// Step until a terminal status, then hand back everything.
    pub fn run(mut self) -> RunOutcome {
        let status = loop {
            if let StepOutcome::Finished(status) = self.step() {
                break status;
            }
        };
        RunOutcome {
            status,
            trajectory: self.trajectory,
            events: self.events,
            records: self.records,
            summary: self.summary,
        }
    }
}

/// Construct and run in one call.
pub fn run(config: RunConfig, initial: SystemState) -> AntclockResult<RunOutcome> {
    Ok(Antclock::new(config, initial)?.run())
}

fn constraint_sample(state: &SystemState, probe: &InterfaceProbe, m_eff: f64) -> ConstraintSample {
    ConstraintSample {
        entropy: state.interface.s,
        junction_residual: probe.junction_mismatch().abs(),
        interface_kinetic: 0.5 * m_eff * state.interface.v_b.powi(2),
    }
}

/// Residual, novelty, detectors and spectral window for a newly
/// accepted state. Advances the stateful trackers.
fn assess(
    config: &RunConfig,
    stepper: &Rk4Stepper,
    state: &SystemState,
    novelty: &mut FluxNovelty,
    detector: &mut RegimeDetector,
    spectral: &mut SpectralWindow,
) -> Assessment {
    let rate: StateRate = stepper.equations.evaluate(state);
    let residual = Residual::evaluate(state, &rate, &config.coupling, &config.weights);
    let probe = rate.probe;
    let entropy_rate = rate.interface.s;

    let flux_novelty = novelty.observe(FluxSample {
        t: state.t,
        energy_flux: probe.energy_flux,
        momentum_flux: probe.momentum_flux,
        entropy_rate,
    });

    let signals = detector.detect(RegimeProbe {
        t: state.t,
        trapping: probe.trapping_scalar(),
        entropy_rate,
        flux_novelty,
        gradient_jump: probe.gradient_jump,
        junction_mismatch: probe.junction_mismatch(),
    });

    spectral.push_state(state);

    Assessment {
        residual,
        probe,
        entropy_rate,
        flux_novelty,
        energy: total_energy(state, &config.coupling).total,
        spectral_acceleration: spectral.acceleration(),
        signals,
    }
}
