// ─────────────────────────────────────────────────────────────────────
// Antclock — Run Configuration
// ─────────────────────────────────────────────────────────────────────
//! Flat set of named numeric parameters for one run.
//!
//! Every field has a safe default; none are required. `validate()` is
//! called eagerly before the first step so misconfiguration never
//! surfaces mid-simulation.

use serde::{Deserialize, Serialize};

use crate::error::{AntclockError, AntclockResult};

/// Coupling constants of the bulk/interface equations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingParams {
    /// λ_flux: matter energy flux → interface force and entropy source.
    /// Default: 0.05.
    pub lambda_flux: f64,
    /// λ_jump: soft junction penalty stiffness.
    /// Default: 0.1.
    pub lambda_jump: f64,
    /// Effective interface mass. Default: 5.0.
    pub m_eff: f64,
    /// T_Σ: interface temperature. Default: 1.0.
    pub t_sigma: f64,
    /// κ: entropy relaxation rate toward zero. Default: 1e-3.
    pub kappa: f64,
    /// Λ: mass term of the conformal field ρ. Default: 1.0.
    pub lambda: f64,
    /// m_φ²: dilaton mass term. Default: 0.5.
    pub dilaton_mass2: f64,
    /// μ²: bare matter mass term. Default: 1.0.
    pub matter_mass2: f64,
    /// g_ρ: matter ↔ conformal field coupling. Default: 0.2.
    pub matter_coupling: f64,
    /// g_φ: matter ↔ dilaton coupling. Default: 0.1.
    pub dilaton_coupling: f64,
    /// σ_E: interface energy per unit stored entropy, E_Σ(s) = σ_E·s.
    /// Default: 0.01.
    pub sigma_energy: f64,
}

impl Default for CouplingParams {
    fn default() -> Self {
        Self {
            lambda_flux: 0.05,
            lambda_jump: 0.1,
            m_eff: 5.0,
            t_sigma: 1.0,
            kappa: 1e-3,
            lambda: 1.0,
            dilaton_mass2: 0.5,
            matter_mass2: 1.0,
            matter_coupling: 0.2,
            dilaton_coupling: 0.1,
            sigma_energy: 0.01,
        }
    }
}

impl CouplingParams {
    pub fn validate(&self) -> AntclockResult<()> {
        if !(self.m_eff > 0.0) {
            return Err(AntclockError::Config(format!(
                "m_eff must be > 0, got {}",
                self.m_eff
            )));
        }
        if !(self.t_sigma > 0.0) {
            return Err(AntclockError::Config(format!(
                "t_sigma must be > 0, got {}",
                self.t_sigma
            )));
        }
        let non_negative = [
            ("lambda_flux", self.lambda_flux),
            ("lambda_jump", self.lambda_jump),
            ("kappa", self.kappa),
            ("lambda", self.lambda),
            ("dilaton_mass2", self.dilaton_mass2),
            ("matter_mass2", self.matter_mass2),
            ("sigma_energy", self.sigma_energy),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(AntclockError::Config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if !self.matter_coupling.is_finite() || !self.dilaton_coupling.is_finite() {
            return Err(AntclockError::Config(
                "matter/dilaton couplings must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Weights of the composite residual ℜ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidualWeights {
    /// Weight of the summed bulk field-equation residuals. Default: 1.0.
    pub field: f64,
    /// Weight of the junction-condition residual. Default: 1.0.
    pub junction: f64,
    /// Weight of the conservation (flux-balance) residual. Default: 1.0.
    pub conservation: f64,
}

impl Default for ResidualWeights {
    fn default() -> Self {
        Self {
            field: 1.0,
            junction: 1.0,
            conservation: 1.0,
        }
    }
}

/// Tolerances for the monotonicity checks on a tentative step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintTolerances {
    /// Allowed entropy decrease per step (numerical noise). Default: 1e-4.
    pub entropy: f64,
    /// Junction residual below this always passes. Default: 0.5.
    pub junction: f64,
    /// Relative growth of an above-tolerance junction residual that is
    /// still accepted. Default: 0.05.
    pub junction_growth: f64,
    /// Interface kinetic-energy gain that counts as coherent work when
    /// entropy falls at the same time. Default: 1e-6.
    pub work: f64,
}

impl Default for ConstraintTolerances {
    fn default() -> Self {
        Self {
            entropy: 1e-4,
            junction: 0.5,
            junction_growth: 0.05,
            work: 1e-6,
        }
    }
}

/// Thresholds of the regime-change detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeThresholds {
    /// Trapping scalar ρ_t² − ρ_x² crossing level. Default: 0.5.
    pub trapped: f64,
    /// Entropy-rate level for a burst. Default: 0.2.
    pub entropy_burst: f64,
    /// Flux-novelty spike level. Default: 0.5.
    pub novelty: f64,
    /// Gradient-jump rate (per unit t) counted as a curvature spike.
    /// Default: 50.0.
    pub curvature_rate: f64,
    /// Junction mismatch magnitude below which sign flips are noise.
    /// Default: 0.1.
    pub junction_flip_floor: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            trapped: 0.5,
            entropy_burst: 0.2,
            novelty: 0.5,
            curvature_rate: 50.0,
            junction_flip_floor: 0.1,
        }
    }
}

/// Runtime configuration for one Antclock run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// ε: target residual scale, dτ = boost·ε/(ℜ+δ). Default: 1e-3.
    pub epsilon: f64,
    /// δ: regulariser of the step law. Default: 1e-3.
    pub delta: f64,
    /// Coordinate step floor. Default: 1e-4.
    pub dt_min: f64,
    /// Coordinate step ceiling. Default: 0.02.
    pub dt_max: f64,
    /// Courant limit, dt ≤ cfl·dx. Default: 0.5.
    pub cfl: f64,
    /// Semantic step floor. Default: 1e-5.
    pub tau_min_step: f64,
    /// Semantic step ceiling. Default: 0.05.
    pub tau_max_step: f64,
    /// Target semantic time; the run ends once reached. Default: 1.0.
    pub tau_max: f64,
    /// Accepted-step ceiling (runaway-refinement valve). Default: 10 000.
    pub max_steps: usize,
    /// Halvings per step before accepting with a violation. Default: 4.
    pub max_retries: u32,
    /// γ > 1 applied to dτ when a regime detector fires. Default: 2.0.
    pub regime_boost: f64,
    /// Number of spectral-centroid samples in the acceleration window.
    /// Default: 3.
    pub spectral_window: usize,
    pub weights: ResidualWeights,
    pub coupling: CouplingParams,
    pub tolerances: ConstraintTolerances,
    pub thresholds: RegimeThresholds,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-3,
            delta: 1e-3,
            dt_min: 1e-4,
            dt_max: 0.02,
            cfl: 0.5,
            tau_min_step: 1e-5,
            tau_max_step: 0.05,
            tau_max: 1.0,
            max_steps: 10_000,
            max_retries: 4,
            regime_boost: 2.0,
            spectral_window: 3,
            weights: ResidualWeights::default(),
            coupling: CouplingParams::default(),
            tolerances: ConstraintTolerances::default(),
            thresholds: RegimeThresholds::default(),
        }
    }
}

impl RunConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> AntclockResult<()> {
        if !(self.epsilon > 0.0) || !self.epsilon.is_finite() {
            return Err(AntclockError::Config(format!(
                "epsilon must be finite and > 0, got {}",
                self.epsilon
            )));
        }
        if !(self.delta > 0.0) || !self.delta.is_finite() {
            return Err(AntclockError::Config(format!(
                "delta must be finite and > 0, got {}",
                self.delta
            )));
        }
        if !(self.dt_min > 0.0) {
            return Err(AntclockError::Config(format!(
                "dt_min must be > 0, got {}",
                self.dt_min
            )));
        }
        if !(self.dt_min <= self.dt_max) || !self.dt_max.is_finite() {
            return Err(AntclockError::Config(format!(
                "dt_min must be <= dt_max, got {} > {}",
                self.dt_min, self.dt_max
            )));
        }
        if !(self.cfl > 0.0 && self.cfl <= 2.0) {
            return Err(AntclockError::Config(format!(
                "cfl must be in (0, 2], got {}",
                self.cfl
            )));
        }
        if !(self.tau_min_step > 0.0) {
            return Err(AntclockError::Config(format!(
                "tau_min_step must be > 0, got {}",
                self.tau_min_step
            )));
        }
        if !(self.tau_min_step <= self.tau_max_step) || !self.tau_max_step.is_finite() {
            return Err(AntclockError::Config(format!(
                "tau_min_step must be <= tau_max_step, got {} > {}",
                self.tau_min_step, self.tau_max_step
            )));
        }
        if !(self.tau_max > 0.0) {
            return Err(AntclockError::Config(format!(
                "tau_max must be > 0, got {}",
                self.tau_max
            )));
        }
        if self.max_steps == 0 {
            return Err(AntclockError::Config(
                "max_steps must be >= 1".to_string(),
            ));
        }
        if !(self.regime_boost >= 1.0) || !self.regime_boost.is_finite() {
            return Err(AntclockError::Config(format!(
                "regime_boost must be finite and >= 1, got {}",
                self.regime_boost
            )));
        }
        if self.spectral_window < 3 {
            return Err(AntclockError::Config(format!(
                "spectral_window must be >= 3, got {}",
                self.spectral_window
            )));
        }

        let w = &self.weights;
        if !(w.field >= 0.0 && w.junction >= 0.0 && w.conservation >= 0.0) {
            return Err(AntclockError::Config(format!(
                "residual weights must be >= 0, got ({}, {}, {})",
                w.field, w.junction, w.conservation
            )));
        }
        if w.field + w.junction + w.conservation <= 0.0 {
            return Err(AntclockError::Config(
                "at least one residual weight must be > 0".to_string(),
            ));
        }

        let tol = &self.tolerances;
        if !(tol.entropy >= 0.0 && tol.junction >= 0.0 && tol.junction_growth >= 0.0 && tol.work >= 0.0)
        {
            return Err(AntclockError::Config(
                "constraint tolerances must be >= 0".to_string(),
            ));
        }

        let th = &self.thresholds;
        if !(th.entropy_burst > 0.0
            && th.novelty > 0.0
            && th.curvature_rate > 0.0
            && th.junction_flip_floor >= 0.0)
            || !th.trapped.is_finite()
        {
            return Err(AntclockError::Config(
                "regime thresholds must be positive and finite".to_string(),
            ));
        }

        self.coupling.validate()
    }

    /// Load from JSON string. Missing keys fall back to defaults.
    pub fn from_json(json: &str) -> AntclockResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| AntclockError::Config(format!("JSON parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_dt_min_above_dt_max_rejected() {
        let cfg = RunConfig {
            dt_min: 0.1,
            dt_max: 0.01,
            ..RunConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("dt_min"));
    }

    #[test]
    fn test_tau_bounds_rejected() {
        let cfg = RunConfig {
            tau_min_step: 1.0,
            tau_max_step: 0.5,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_boost_below_one_rejected() {
        let cfg = RunConfig {
            regime_boost: 0.5,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_nan_epsilon_rejected() {
        let cfg = RunConfig {
            epsilon: f64::NAN,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_infinite_delta_rejected() {
        let cfg = RunConfig {
            delta: f64::INFINITY,
            ..RunConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("delta"));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let cfg = RunConfig {
            weights: ResidualWeights {
                field: 0.0,
                junction: 0.0,
                conservation: 0.0,
            },
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_non_positive_mass_rejected() {
        let mut cfg = RunConfig::default();
        cfg.coupling.m_eff = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("m_eff"));
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = RunConfig::from_json(r#"{"epsilon": 0.01, "coupling": {"kappa": 0.5}}"#).unwrap();
        assert!((cfg.epsilon - 0.01).abs() < 1e-15);
        assert!((cfg.coupling.kappa - 0.5).abs() < 1e-15);
        assert!((cfg.coupling.m_eff - 5.0).abs() < 1e-15);
        assert_eq!(cfg.max_steps, 10_000);
    }

    #[test]
    fn test_from_json_invalid_values() {
        assert!(RunConfig::from_json(r#"{"dt_min": 1.0, "dt_max": 0.1}"#).is_err());
    }

    #[test]
    fn test_from_json_garbage() {
        let err = RunConfig::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }
}
