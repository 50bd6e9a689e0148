// ─────────────────────────────────────────────────────────────────────
// Antclock — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Antclock failures.
///
/// Run-level outcomes (numerical failure mid-run, step ceiling) are
/// reported through `RunStatus`, not here: an `Err` means the run never
/// started.
#[derive(Error, Debug)]
pub enum AntclockError {
    /// Invalid run configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed state or input (grid, field lengths, interface).
    #[error("validation error: {0}")]
    Validation(String),

    /// Scenario factory could not build an initial state.
    #[error("scenario error: {0}")]
    Scenario(String),

    /// Numerical error (NaN/Inf in a field or interface scalar).
    #[error("numerical error at step {step}: non-finite {quantity}")]
    Numerical { step: usize, quantity: String },
}

pub type AntclockResult<T> = Result<T, AntclockError>;
