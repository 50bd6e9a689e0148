// ─────────────────────────────────────────────────────────────────────
// Antclock — Monotonicity Constraints
// ─────────────────────────────────────────────────────────────────────
//! Checks run on a tentative step before it may be accepted. A
//! violation triggers dt halving in the scheduler; the hard entropy
//! projection happens after acceptance regardless.

use std::fmt;

use serde::{Deserialize, Serialize};

use antclock_types::ConstraintTolerances;

/// Quantities compared between the accepted state n and a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstraintSample {
    pub entropy: f64,
    pub junction_residual: f64,
    /// ½m_eff·v_b².
    pub interface_kinetic: f64,
}

/// Which constraint a candidate broke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintViolation {
    /// s fell by more than the noise tolerance.
    EntropyDecrease { before: f64, after: f64 },
    /// Junction residual above tolerance and growing.
    JunctionGrowth { before: f64, after: f64 },
    /// Interface gained kinetic energy while entropy fell.
    WorkExtraction { kinetic_gain: f64, entropy_drop: f64 },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::EntropyDecrease { before, after } => {
                write!(f, "entropy decreased {before:.6e} -> {after:.6e}")
            }
            ConstraintViolation::JunctionGrowth { before, after } => {
                write!(f, "junction residual grew {before:.4e} -> {after:.4e}")
            }
            ConstraintViolation::WorkExtraction {
                kinetic_gain,
                entropy_drop,
            } => write!(
                f,
                "coherent work extraction: kinetic +{kinetic_gain:.4e} with entropy -{entropy_drop:.4e}"
            ),
        }
    }
}

/// First violated constraint, checked in order entropy, junction, work.
pub fn check_step(
    accepted: &ConstraintSample,
    candidate: &ConstraintSample,
    tol: &ConstraintTolerances,
) -> Option<ConstraintViolation> {
    if candidate.entropy < accepted.entropy - tol.entropy {
        return Some(ConstraintViolation::EntropyDecrease {
            before: accepted.entropy,
            after: candidate.entropy,
        });
    }

    if candidate.junction_residual > tol.junction
        && candidate.junction_residual > accepted.junction_residual * (1.0 + tol.junction_growth)
    {
        return Some(ConstraintViolation::JunctionGrowth {
            before: accepted.junction_residual,
            after: candidate.junction_residual,
        });
    }

    let kinetic_gain = candidate.interface_kinetic - accepted.interface_kinetic;
    let entropy_drop = accepted.entropy - candidate.entropy;
    if kinetic_gain > tol.work && entropy_drop > 0.0 {
        return Some(ConstraintViolation::WorkExtraction {
            kinetic_gain,
            entropy_drop,
        });
    }

    None
}
