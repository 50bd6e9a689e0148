// ─────────────────────────────────────────────────────────────────────
// Antclock — Parameter Sweep
// ─────────────────────────────────────────────────────────────────────
//! Whole-run parallelism: one independent scheduler per configuration.
//! Runs share nothing, so results are identical with or without the
//! `parallel` feature.

use antclock_physics::ScenarioFactory;
use antclock_types::{AntclockResult, RunConfig};

use crate::scheduler::{run, RunOutcome};

fn run_one(scenario: &dyn ScenarioFactory, config: &RunConfig) -> AntclockResult<RunOutcome> {
    let initial = scenario.build()?;
    run(config.clone(), initial)
}

/// Run `scenario` once per configuration, preserving input order.
pub fn run_sweep(scenario: &dyn ScenarioFactory, configs: &[RunConfig]) -> Vec<AntclockResult<RunOutcome>> {
    log::info!("antclock sweep: scenario={} runs={}", scenario.name(), configs.len());

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        configs.par_iter().map(|cfg| run_one(scenario, cfg)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        configs.iter().map(|cfg| run_one(scenario, cfg)).collect()
    }
}
