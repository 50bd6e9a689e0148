// ─────────────────────────────────────────────────────────────────────
// Antclock — Field Grid & State
// ─────────────────────────────────────────────────────────────────────
//! Uniform periodic 1-D grid, the three bulk fields with their rates,
//! and the moving interface.
//!
//! States are values: the integrator builds a fresh `SystemState` per
//! step and never mutates one that has been handed out.

use serde::{Deserialize, Serialize};

use antclock_types::{AntclockError, AntclockResult};

/// Uniform periodic grid metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of samples N.
    pub n: usize,
    /// Domain length L.
    pub length: f64,
    /// Spatial step dx = L/N.
    pub dx: f64,
}

impl Grid {
    pub const MIN_POINTS: usize = 4;

    pub fn new(n: usize, length: f64) -> AntclockResult<Self> {
        if n < Self::MIN_POINTS {
            return Err(AntclockError::Validation(format!(
                "grid needs at least {} points, got {n}",
                Self::MIN_POINTS
            )));
        }
        if !(length > 0.0) || !length.is_finite() {
            return Err(AntclockError::Validation(format!(
                "domain length must be finite and > 0, got {length}"
            )));
        }
        Ok(Self {
            n,
            length,
            dx: length / n as f64,
        })
    }

    /// Coordinate of grid point i.
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        i as f64 * self.dx
    }

    /// Map x into [0, L).
    #[inline]
    pub fn wrap(&self, x: f64) -> f64 {
        let w = x.rem_euclid(self.length);
        // rem_euclid can round up to L for tiny negative inputs
        if w >= self.length {
            0.0
        } else {
            w
        }
    }

    /// Nearest grid index of x, periodic.
    #[inline]
    pub fn nearest_index(&self, x: f64) -> usize {
        let u = (self.wrap(x) / self.dx).round();
        (u as usize) % self.n
    }

    /// Signed periodic separation x − x0 mapped into [−L/2, L/2).
    #[inline]
    pub fn separation(&self, x: f64, x0: f64) -> f64 {
        let half = 0.5 * self.length;
        (x - x0 + half).rem_euclid(self.length) - half
    }
}

/// The three bulk fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Conformal-metric field ρ.
    Rho,
    /// Dilaton φ.
    Phi,
    /// Matter field ψ.
    Psi,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Rho, Field::Phi, Field::Psi];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Rho => "rho",
            Field::Phi => "phi",
            Field::Psi => "psi",
        }
    }

    pub fn rate_name(&self) -> &'static str {
        match self {
            Field::Rho => "rho_t",
            Field::Phi => "phi_t",
            Field::Psi => "psi_t",
        }
    }
}

/// Three fields and their time derivatives, all of length N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    pub rho: Vec<f64>,
    pub rho_t: Vec<f64>,
    pub phi: Vec<f64>,
    pub phi_t: Vec<f64>,
    pub psi: Vec<f64>,
    pub psi_t: Vec<f64>,
}

impl FieldSet {
    /// All six sequences zeroed.
    pub fn zeros(n: usize) -> Self {
        Self {
            rho: vec![0.0; n],
            rho_t: vec![0.0; n],
            phi: vec![0.0; n],
            phi_t: vec![0.0; n],
            psi: vec![0.0; n],
            psi_t: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.rho.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rho.is_empty()
    }

    pub fn field(&self, f: Field) -> &[f64] {
        match f {
            Field::Rho => &self.rho,
            Field::Phi => &self.phi,
            Field::Psi => &self.psi,
        }
    }

    pub fn rate(&self, f: Field) -> &[f64] {
        match f {
            Field::Rho => &self.rho_t,
            Field::Phi => &self.phi_t,
            Field::Psi => &self.psi_t,
        }
    }

    /// True when all six sequences have length n.
    pub fn has_len(&self, n: usize) -> bool {
        [
            &self.rho,
            &self.rho_t,
            &self.phi,
            &self.phi_t,
            &self.psi,
            &self.psi_t,
        ]
        .iter()
        .all(|v| v.len() == n)
    }
}

/// Moving interface (worldline) state.
///
/// `i_b` is a read-only cache of `round(x_b/dx) mod N`; it is only ever
/// written by `relocate`, never advanced on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceState {
    /// Position in [0, L).
    pub x_b: f64,
    /// Velocity.
    pub v_b: f64,
    /// Stored entropy, s ≥ 0.
    pub s: f64,
    /// Proper time along the worldline.
    pub tau: f64,
    /// Expansion scalar (one-step proxy, see `CoupledEquations`).
    pub theta: f64,
    i_b: usize,
}

impl InterfaceState {
    pub fn new(grid: &Grid, x_b: f64, v_b: f64, s: f64, tau: f64, theta: f64) -> Self {
        let x_b = grid.wrap(x_b);
        Self {
            x_b,
            v_b,
            s,
            tau,
            theta,
            i_b: grid.nearest_index(x_b),
        }
    }

    /// Interface at rest at x_b with zero entropy and clocks.
    pub fn at_rest(grid: &Grid, x_b: f64) -> Self {
        Self::new(grid, x_b, 0.0, 0.0, 0.0, 0.0)
    }

    /// Cached nearest grid index.
    #[inline]
    pub fn i_b(&self) -> usize {
        self.i_b
    }

    /// Wrap x_b into the domain and recompute the index cache.
    pub fn relocate(&mut self, grid: &Grid) {
        self.x_b = grid.wrap(self.x_b);
        self.i_b = grid.nearest_index(self.x_b);
    }
}

/// A non-finite value found in a state.
#[derive(Debug, Clone, PartialEq)]
pub struct NonFinite {
    pub quantity: &'static str,
    /// Grid index for bulk sequences, `None` for interface scalars.
    pub index: Option<usize>,
    pub value: f64,
}

impl NonFinite {
    pub fn describe(&self) -> String {
        match self.index {
            Some(i) => format!("{}[{i}] = {}", self.quantity, self.value),
            None => format!("{} = {}", self.quantity, self.value),
        }
    }
}

/// Bulk fields + interface + grid metadata + coordinate time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    pub grid: Grid,
    pub bulk: FieldSet,
    pub interface: InterfaceState,
    /// Coordinate time t.
    pub t: f64,
}

impl SystemState {
    /// Assemble a state, checking the FieldSet invariant and s ≥ 0.
    pub fn new(grid: Grid, bulk: FieldSet, interface: InterfaceState, t: f64) -> AntclockResult<Self> {
        let state = Self {
            grid,
            bulk,
            interface,
            t,
        };
        state.validate()?;
        Ok(state)
    }

    /// Check the structural invariants of a well-formed state.
    pub fn validate(&self) -> AntclockResult<()> {
        if !self.bulk.has_len(self.grid.n) {
            return Err(AntclockError::Validation(format!(
                "all six field sequences must have length N={}",
                self.grid.n
            )));
        }
        if !(self.interface.s >= 0.0) {
            return Err(AntclockError::Validation(format!(
                "stored entropy must be >= 0, got {}",
                self.interface.s
            )));
        }
        if !(self.interface.x_b >= 0.0 && self.interface.x_b < self.grid.length) {
            return Err(AntclockError::Validation(format!(
                "interface position {} outside [0, {})",
                self.interface.x_b, self.grid.length
            )));
        }
        if self.interface.i_b() != self.grid.nearest_index(self.interface.x_b) {
            return Err(AntclockError::Validation(
                "interface index cache out of sync with position".to_string(),
            ));
        }
        if let Some(bad) = self.find_non_finite() {
            return Err(AntclockError::Validation(format!(
                "non-finite value in state: {}",
                bad.describe()
            )));
        }
        Ok(())
    }

    /// First NaN/Inf in any field or interface scalar.
    pub fn find_non_finite(&self) -> Option<NonFinite> {
        for f in Field::ALL {
            for (name, seq) in [(f.name(), self.bulk.field(f)), (f.rate_name(), self.bulk.rate(f))] {
                if let Some((i, &v)) = seq.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                    return Some(NonFinite {
                        quantity: name,
                        index: Some(i),
                        value: v,
                    });
                }
            }
        }
        let ifc = &self.interface;
        let scalars = [
            ("x_b", ifc.x_b),
            ("v_b", ifc.v_b),
            ("s", ifc.s),
            ("tau", ifc.tau),
            ("theta", ifc.theta),
            ("t", self.t),
        ];
        scalars
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|&(quantity, value)| NonFinite {
                quantity,
                index: None,
                value,
            })
    }
}
