// ─────────────────────────────────────────────────────────────────────
// Antclock — Run-Level Properties
// ─────────────────────────────────────────────────────────────────────
//! End-to-end properties of the integrator and scheduler on the two
//! canonical scenarios (N = 32, L = 2).

use antclock_core::{run, run_sweep, RunOutcome};
use antclock_physics::{
    expansion_from_history, total_energy, CliffScenario, Rk4Stepper, ScenarioFactory, SmoothScenario,
    SystemState,
};
use antclock_types::{ConstraintTolerances, CouplingParams, RunConfig, RunStatus, TickKind};

fn smooth() -> SystemState {
    SmoothScenario::new(32, 2.0).build().unwrap()
}

fn cliff() -> SystemState {
    CliffScenario::new(32, 2.0).build().unwrap()
}

/// Fixed step budget with the semantic target out of reach.
fn budget(steps: usize) -> RunConfig {
    RunConfig {
        tau_max: 1e9,
        max_steps: steps,
        ..Default::default()
    }
}

fn energy(state: &SystemState) -> f64 {
    total_energy(state, &CouplingParams::default()).total
}

fn max_drift(traj: &[SystemState]) -> f64 {
    let e0 = energy(&traj[0]);
    traj.iter().map(|s| ((energy(s) - e0) / e0).abs()).fold(0.0, f64::max)
}

fn regime_events(out: &RunOutcome) -> usize {
    out.events.iter().filter(|e| e.kind.is_regime()).count()
}

// ── Determinism ──────────────────────────────────────────────────────

#[test]
fn test_runs_are_bit_identical() {
    for initial in [smooth(), cliff()] {
        let a = run(budget(120), initial.clone()).unwrap();
        let b = run(budget(120), initial).unwrap();
        assert_eq!(a.trajectory, b.trajectory);
        assert_eq!(a.events, b.events);
        assert_eq!(a.records, b.records);
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.status, b.status);
    }
}

#[test]
fn test_sweep_matches_sequential() {
    let configs: Vec<RunConfig> = [1e-3, 3e-3]
        .iter()
        .map(|&eps| RunConfig {
            epsilon: eps,
            ..budget(40)
        })
        .collect();
    let swept = run_sweep(&CliffScenario::new(32, 2.0), &configs);
    for (cfg, result) in configs.iter().zip(swept) {
        let direct = run(cfg.clone(), cliff()).unwrap();
        let swept = result.unwrap();
        assert_eq!(swept.trajectory, direct.trajectory);
        assert_eq!(swept.events, direct.events);
    }
}

// ── Conservation ─────────────────────────────────────────────────────

#[test]
fn test_energy_drift_fixed_step_both_scenarios() {
    let stepper = Rk4Stepper::default();
    let smooth_traj = stepper.trajectory(&smooth(), 0.01, 200).unwrap();
    let cliff_traj = stepper.trajectory(&cliff(), 0.002, 200).unwrap();
    assert!(max_drift(&smooth_traj) < 0.03);
    assert!(max_drift(&cliff_traj) < 0.03);
}

#[test]
fn test_energy_drift_bounded_on_long_smooth_run() {
    let stepper = Rk4Stepper::default();
    let traj = stepper.trajectory(&smooth(), 0.01, 1000).unwrap();
    assert!(max_drift(&traj[..201]) < 0.03);
    assert!(max_drift(&traj) < 0.03);
}

#[test]
fn test_energy_drift_under_scheduler() {
    for initial in [smooth(), cliff()] {
        let out = run(budget(300), initial).unwrap();
        assert!(max_drift(&out.trajectory) < 0.03);
    }
}

// ── Monotonic entropy ────────────────────────────────────────────────

#[test]
fn test_entropy_never_decreases() {
    for initial in [smooth(), cliff()] {
        let out = run(budget(400), initial).unwrap();
        for pair in out.trajectory.windows(2) {
            assert!(pair[1].interface.s >= pair[0].interface.s);
        }
        for pair in out.records.windows(2) {
            assert!(pair[1].entropy >= pair[0].entropy);
        }
    }
}

// ── No blow-up ───────────────────────────────────────────────────────

#[test]
fn test_no_blow_up_over_1000_steps() {
    for initial in [smooth(), cliff()] {
        let out = run(budget(1000), initial).unwrap();
        assert!(matches!(out.status, RunStatus::DidNotConverge { .. }));
        assert_eq!(out.summary.accepted_steps, 1000);
        assert_eq!(out.trajectory.len(), 1001);
        assert!(out.trajectory.iter().all(|s| s.find_non_finite().is_none()));
        assert!(out.records.iter().all(|r| r.residual.is_finite() && r.energy.is_finite()));
    }
}

// ── Coercion ordering ────────────────────────────────────────────────

#[test]
fn test_cliff_coerces_harder_than_smooth() {
    let s = run(budget(400), smooth()).unwrap();
    let c = run(budget(400), cliff()).unwrap();

    let produced = |o: &RunOutcome| {
        o.trajectory[o.trajectory.len() - 1].interface.s - o.trajectory[0].interface.s
    };
    let peak_flux = |o: &RunOutcome| o.records.iter().map(|r| r.energy_flux.abs()).fold(0.0, f64::max);

    assert!(produced(&c) > produced(&s));
    assert!(peak_flux(&c) > peak_flux(&s));
    assert!(regime_events(&c) > regime_events(&s));
}

#[test]
fn test_smooth_is_quiet() {
    let out = run(budget(400), smooth()).unwrap();
    assert_eq!(regime_events(&out), 0);
    assert_eq!(out.summary.regime_events, 0);
}

#[test]
fn test_cliff_bursts_immediately() {
    let out = run(budget(5), cliff()).unwrap();
    let first = &out.events[0];
    assert_eq!(first.step, 0);
    assert_eq!(first.kind, TickKind::EntropyBurst);
    assert_eq!(first.t, 0.0);
    assert!(first.residual_before > 1.0);
    assert!(out.records[0].boosted);
}

#[test]
fn test_every_detection_reaches_the_log() {
    let out = run(budget(400), cliff()).unwrap();
    let fired: Vec<usize> = out.records.iter().filter(|r| r.regime_fired).map(|r| r.step).collect();
    assert!(!fired.is_empty());
    for step in &fired {
        assert!(out.events.iter().any(|e| e.step == *step && e.kind.is_regime()));
    }
    // a detection boosts the step right after it
    for step in fired.iter().filter(|&&k| k < out.records.len()) {
        assert!(out.records[*step].boosted);
    }
}

// ── Constraint enforcement ───────────────────────────────────────────

#[test]
fn test_strict_junction_violations_are_recoverable() {
    let cfg = RunConfig {
        tolerances: ConstraintTolerances {
            junction: 0.0,
            junction_growth: 0.0,
            ..Default::default()
        },
        ..budget(200)
    };
    let out = run(cfg, cliff()).unwrap();

    assert!(matches!(out.status, RunStatus::DidNotConverge { .. }));
    assert_eq!(out.summary.accepted_steps, 200);
    assert!(out.summary.rejected_steps > 0);
    assert!(out.summary.violations > 0);
    let retries: u32 = out.records.iter().map(|r| r.retries).sum();
    assert_eq!(out.summary.rejected_steps, retries as usize);

    for rec in &out.records {
        assert_eq!(rec.dt, rec.dt_plan / f64::from(1u32 << rec.retries));
    }
    let violations = out
        .events
        .iter()
        .filter(|e| e.kind == TickKind::MonotonicityViolation)
        .count();
    assert_eq!(violations, out.summary.violations);
    assert!(max_drift(&out.trajectory) < 0.03);
    for pair in out.trajectory.windows(2) {
        assert!(pair[1].interface.s >= pair[0].interface.s);
    }
}

// ── Adaptive speedup ─────────────────────────────────────────────────

#[test]
fn test_adaptive_beats_fixed_minimum_step() {
    let cfg = RunConfig {
        tau_max: 0.5,
        ..Default::default()
    };
    let dt_min = cfg.dt_min;
    let out = run(cfg, smooth()).unwrap();
    assert!(out.status.is_ok());
    assert!(out.summary.tau_sched >= 0.5);

    let span = out.summary.t;
    let fixed_steps = (span / dt_min).ceil() as usize;
    assert!(out.summary.accepted_steps < fixed_steps);
    assert!(out.summary.accepted_steps <= 20);
}

// ── Worked example ───────────────────────────────────────────────────

#[test]
fn test_worked_example_fixed_steps() {
    let stepper = Rk4Stepper::default();
    let s0 = smooth();
    let traj = stepper.trajectory(&s0, 0.01, 50).unwrap();
    let last = &traj[traj.len() - 1];
    let (e0, e1) = (energy(&s0), energy(last));
    assert!(((e1 - e0) / e0).abs() < 0.03);
    assert!(last.interface.s >= s0.interface.s);
    assert!(traj.iter().all(|s| s.find_non_finite().is_none()));
}

// ── Outcomes & logs ──────────────────────────────────────────────────

#[test]
fn test_semantic_target_reached() {
    let out = run(RunConfig::default(), smooth()).unwrap();
    assert_eq!(out.status, RunStatus::Ok);
    assert!(out.summary.tau_sched >= 1.0);
    assert_eq!(out.records.len(), out.summary.accepted_steps);
    assert_eq!(out.trajectory.len(), out.summary.accepted_steps + 1);
    let last = &out.records[out.records.len() - 1];
    assert_eq!(last.tau_sched, out.summary.tau_sched);
}

#[test]
fn test_tick_log_is_ordered() {
    let out = run(budget(300), cliff()).unwrap();
    assert!(!out.events.is_empty());
    for pair in out.events.windows(2) {
        assert!(pair[1].step >= pair[0].step);
        assert!(pair[1].tau_sched >= pair[0].tau_sched);
    }
    for e in &out.events {
        assert!(e.dt_after <= e.dt_before);
        assert!(e.residual_before >= 0.0 && e.residual_after >= 0.0);
    }
    assert_eq!(
        out.summary.regime_events + out.summary.violations,
        out.events.len()
    );
}

#[test]
fn test_misconfiguration_rejected_before_first_step() {
    let cfg = RunConfig {
        dt_min: 0.5,
        dt_max: 0.1,
        ..Default::default()
    };
    assert!(run(cfg, smooth()).is_err());

    let cfg = RunConfig {
        tau_min_step: 1.0,
        tau_max_step: 0.1,
        ..Default::default()
    };
    assert!(run(cfg, cliff()).is_err());
}

#[test]
fn test_outcome_serializes() {
    let out = run(budget(3), cliff()).unwrap();
    let json = serde_json::to_string(&out).unwrap();
    assert!(json.contains("\"status\":\"did_not_converge\""));
    assert!(json.contains("entropy_burst"));
}

#[test]
fn test_history_expansion_along_trajectory() {
    let out = run(budget(20), cliff()).unwrap();
    let exp = expansion_from_history(&out.trajectory);
    assert_eq!(exp.len(), out.trajectory.len() - 1);
    assert!(exp.iter().all(|v| v.is_finite()));
    // ρ at the cusp is pulled up by the junction source
    assert!(exp[0] > 0.0);
}
