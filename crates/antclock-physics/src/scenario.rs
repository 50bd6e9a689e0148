// ─────────────────────────────────────────────────────────────────────
// Antclock — Canonical Scenarios
// ─────────────────────────────────────────────────────────────────────
//! Initial-condition factories. The integrator treats these as black
//! boxes returning a well-formed `SystemState`.
//!
//! - `smooth`: standing low-amplitude matter pulse, flat ρ and φ, idle
//!   interface.
//! - `cliff`: steep right-moving matter pulse about to hit a
//!   pre-stressed interface (cusp in ρ, s(0) > 0).

use antclock_types::{AntclockError, AntclockResult};

use crate::grid::{FieldSet, Grid, InterfaceState, SystemState};

/// Factory for an initial state.
pub trait ScenarioFactory: Send + Sync {
    fn name(&self) -> &str;
    fn build(&self) -> AntclockResult<SystemState>;
}

/// Gaussian A·e^{−(d/w)²} with periodic separation d.
#[inline]
fn gaussian(grid: &Grid, x: f64, centre: f64, amplitude: f64, width: f64) -> f64 {
    let d = grid.separation(x, centre);
    amplitude * (-(d / width).powi(2)).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothScenario {
    pub n: usize,
    pub length: f64,
    pub amplitude: f64,
}

impl SmoothScenario {
    pub fn new(n: usize, length: f64) -> Self {
        Self {
            n,
            length,
            amplitude: 0.2,
        }
    }
}

impl Default for SmoothScenario {
    fn default() -> Self {
        Self::new(32, 2.0)
    }
}

impl ScenarioFactory for SmoothScenario {
    fn name(&self) -> &str {
        "smooth"
    }

    fn build(&self) -> AntclockResult<SystemState> {
        let grid = Grid::new(self.n, self.length)?;
        let l = grid.length;
        let mut bulk = FieldSet::zeros(grid.n);
        for i in 0..grid.n {
            bulk.psi[i] = gaussian(&grid, grid.x(i), 0.3 * l, self.amplitude, 0.2 * l);
        }
        let interface = InterfaceState::at_rest(&grid, 0.5 * l);
        log::debug!("scenario smooth: N={} L={}", grid.n, grid.length);
        SystemState::new(grid, bulk, interface, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliffScenario {
    pub n: usize,
    pub length: f64,
    pub amplitude: f64,
    /// Initial stored entropy.
    pub entropy: f64,
}

impl CliffScenario {
    pub fn new(n: usize, length: f64) -> Self {
        Self {
            n,
            length,
            amplitude: 1.0,
            entropy: 0.5,
        }
    }
}

impl Default for CliffScenario {
    fn default() -> Self {
        Self::new(32, 2.0)
    }
}

impl ScenarioFactory for CliffScenario {
    fn name(&self) -> &str {
        "cliff"
    }

    fn build(&self) -> AntclockResult<SystemState> {
        let grid = Grid::new(self.n, self.length)?;
        let l = grid.length;
        let x_b = 0.5 * l;
        let centre = x_b - 0.05 * l;
        let width = 0.075 * l;
        let mut bulk = FieldSet::zeros(grid.n);
        for i in 0..grid.n {
            let x = grid.x(i);
            let psi = gaussian(&grid, x, centre, self.amplitude, width);
            let d = grid.separation(x, centre);
            bulk.psi[i] = psi;
            // right-moving: ψ_t = −ψ_x
            bulk.psi_t[i] = 2.0 * d / (width * width) * psi;
            bulk.rho[i] = -0.3 * (-grid.separation(x, x_b).abs() / (0.1 * l)).exp();
            bulk.phi[i] = 0.1 * (2.0 * std::f64::consts::TAU * x / l).cos();
        }
        let interface = InterfaceState::new(&grid, x_b, 0.0, self.entropy, 0.0, 0.0);
        log::debug!("scenario cliff: N={} L={} s0={}", grid.n, grid.length, self.entropy);
        SystemState::new(grid, bulk, interface, 0.0)
    }
}

/// Look up a canonical scenario by name.
pub fn scenario_by_name(name: &str, n: usize, length: f64) -> AntclockResult<Box<dyn ScenarioFactory>> {
    match name {
        "smooth" => Ok(Box::new(SmoothScenario::new(n, length))),
        "cliff" => Ok(Box::new(CliffScenario::new(n, length))),
        other => Err(AntclockError::Scenario(format!("unknown scenario '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::total_energy;
    use antclock_types::CouplingParams;

    #[test]
    fn test_smooth_well_formed() {
        let s = SmoothScenario::default().build().unwrap();
        assert_eq!(s.grid.n, 32);
        assert_eq!(s.interface.i_b(), 16);
        assert_eq!(s.interface.s, 0.0);
        assert!(s.bulk.psi_t.iter().all(|&v| v == 0.0));
        assert!(s.bulk.rho.iter().all(|&v| v == 0.0));
        let peak = s.bulk.psi.iter().cloned().fold(f64::MIN, f64::max);
        assert!((peak - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_cliff_well_formed() {
        let s = CliffScenario::default().build().unwrap();
        assert_eq!(s.interface.s, 0.5);
        assert!((s.bulk.rho[16] + 0.3).abs() < 1e-12);
        assert!(s.bulk.rho.iter().all(|&v| v < 0.0));
    }

    #[test]
    fn test_cliff_more_energetic() {
        let p = CouplingParams::default();
        let smooth = total_energy(&SmoothScenario::default().build().unwrap(), &p);
        let cliff = total_energy(&CliffScenario::default().build().unwrap(), &p);
        assert!(cliff.kinetic > 100.0 * smooth.kinetic.max(1e-6));
        assert!(cliff.total > smooth.total);
    }

    #[test]
    fn test_scenario_by_name() {
        assert_eq!(scenario_by_name("cliff", 16, 1.0).unwrap().name(), "cliff");
        assert_eq!(scenario_by_name("smooth", 16, 1.0).unwrap().name(), "smooth");
        assert!(matches!(
            scenario_by_name("volcano", 16, 1.0),
            Err(AntclockError::Scenario(_))
        ));
    }

    #[test]
    fn test_invalid_grid_propagates() {
        assert!(SmoothScenario::new(2, 1.0).build().is_err());
    }
}
