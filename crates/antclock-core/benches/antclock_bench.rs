// ─────────────────────────────────────────────────────────────────────
// Antclock — Criterion Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Hot-path components of the coupled-field engine:
//!   - Finite-difference operators and off-grid sampling
//!   - Equation evaluator (one RHS) and one RK4 step
//!   - Composite residual
//!   - Short scheduler runs on both canonical scenarios

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use antclock_core::{run, Antclock, Residual};
use antclock_physics::ops::{derivative, laplacian, sample_at, sample_gradient_at};
use antclock_physics::{CliffScenario, CoupledEquations, Rk4Stepper, ScenarioFactory, SmoothScenario, SystemState};
use antclock_types::RunConfig;

const N: usize = 128;
const L: f64 = 2.0;

// ── Helpers ───────────────────────────────────────────────────────────

fn cliff(n: usize) -> SystemState {
    CliffScenario::new(n, L).build().expect("cliff scenario")
}

fn smooth(n: usize) -> SystemState {
    SmoothScenario::new(n, L).build().expect("smooth scenario")
}

// ── Operator benchmarks ──────────────────────────────────────────────

fn bench_laplacian(c: &mut Criterion) {
    let state = cliff(N);
    c.bench_function("laplacian_128", |b| {
        b.iter(|| laplacian(black_box(&state.bulk.psi), state.grid.dx))
    });
}

fn bench_derivative(c: &mut Criterion) {
    let state = cliff(N);
    c.bench_function("derivative_128", |b| {
        b.iter(|| derivative(black_box(&state.bulk.psi), state.grid.dx))
    });
}

fn bench_sample_at(c: &mut Criterion) {
    let state = cliff(N);
    c.bench_function("sample_at_interface", |b| {
        b.iter(|| {
            sample_at(black_box(&state.bulk.rho), black_box(1.013), L, state.grid.dx)
                + sample_gradient_at(black_box(&state.bulk.psi), black_box(1.013), L, state.grid.dx)
        })
    });
}

// ── Integrator benchmarks ────────────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let state = cliff(N);
    let eq = CoupledEquations::default();
    c.bench_function("evaluate_rhs_128", |b| b.iter(|| eq.evaluate(black_box(&state))));
}

fn bench_rk4_step(c: &mut Criterion) {
    let state = cliff(N);
    let stepper = Rk4Stepper::default();
    c.bench_function("rk4_step_128", |b| b.iter(|| stepper.step(black_box(&state), 1e-3)));
}

fn bench_residual(c: &mut Criterion) {
    let state = cliff(N);
    let cfg = RunConfig::default();
    let eq = CoupledEquations::new(cfg.coupling.clone());
    c.bench_function("composite_residual_128", |b| {
        b.iter(|| {
            let rate = eq.evaluate(black_box(&state));
            Residual::evaluate(&state, &rate, &cfg.coupling, &cfg.weights)
        })
    });
}

// ── Scheduler benchmarks ─────────────────────────────────────────────

fn bench_scheduler_init(c: &mut Criterion) {
    c.bench_function("antclock_init_cliff_32", |b| {
        b.iter(|| Antclock::new(RunConfig::default(), black_box(cliff(32))))
    });
}

fn bench_scheduler_smooth_run(c: &mut Criterion) {
    let cfg = RunConfig {
        tau_max: 0.5,
        ..Default::default()
    };
    c.bench_function("antclock_run_smooth_tau_0.5", |b| {
        b.iter(|| run(cfg.clone(), black_box(smooth(32))))
    });
}

fn bench_scheduler_cliff_50_steps(c: &mut Criterion) {
    let cfg = RunConfig {
        tau_max: 1e9,
        max_steps: 50,
        ..Default::default()
    };
    c.bench_function("antclock_cliff_50_steps", |b| {
        b.iter(|| run(cfg.clone(), black_box(cliff(32))))
    });
}

criterion_group!(operators, bench_laplacian, bench_derivative, bench_sample_at);

criterion_group!(integrator, bench_evaluate, bench_rk4_step, bench_residual);

criterion_group!(
    scheduler,
    bench_scheduler_init,
    bench_scheduler_smooth_run,
    bench_scheduler_cliff_50_steps,
);

criterion_main!(operators, integrator, scheduler);
