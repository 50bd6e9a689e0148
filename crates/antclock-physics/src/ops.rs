// ─────────────────────────────────────────────────────────────────────
// Antclock — Periodic Finite-Difference Operators
// ─────────────────────────────────────────────────────────────────────
//! Centered stencils on a uniform periodic grid, plus off-grid sampling
//! at the interface position.
//!
//! All operators are total: NaN/Inf inputs propagate to the output and
//! are detected by the caller.

/// Neighbour indices (i−1, i+1) with periodic wrap.
#[inline]
fn neighbours(i: usize, n: usize) -> (usize, usize) {
    ((i + n - 1) % n, (i + 1) % n)
}

/// Centered first derivative, (f[i+1] − f[i−1]) / 2dx.
pub fn derivative(field: &[f64], dx: f64) -> Vec<f64> {
    let n = field.len();
    let inv = 0.5 / dx;
    (0..n)
        .map(|i| {
            let (l, r) = neighbours(i, n);
            (field[r] - field[l]) * inv
        })
        .collect()
}

/// Centered second difference, (f[i+1] − 2f[i] + f[i−1]) / dx².
pub fn laplacian(field: &[f64], dx: f64) -> Vec<f64> {
    let mut out = vec![0.0; field.len()];
    laplacian_into(field, dx, &mut out);
    out
}

/// `laplacian` writing into a caller-owned buffer of the same length.
pub fn laplacian_into(field: &[f64], dx: f64, out: &mut [f64]) {
    let n = field.len();
    debug_assert_eq!(out.len(), n);
    let inv2 = 1.0 / (dx * dx);
    for (i, o) in out.iter_mut().enumerate() {
        let (l, r) = neighbours(i, n);
        *o = (field[r] - 2.0 * field[i] + field[l]) * inv2;
    }
}

/// Forward difference, (f[i+1] − f[i]) / dx.
pub fn forward_difference(field: &[f64], dx: f64) -> Vec<f64> {
    let n = field.len();
    (0..n).map(|i| (field[(i + 1) % n] - field[i]) / dx).collect()
}

/// Five-point fourth difference Δ(Δf), the leading truncation term of
/// the three-point Laplacian up to a factor dx²/12.
pub fn fourth_difference(field: &[f64], dx: f64) -> Vec<f64> {
    let n = field.len();
    let inv4 = 1.0 / dx.powi(4);
    (0..n)
        .map(|i| {
            let (l1, r1) = neighbours(i, n);
            let (l2, _) = neighbours(l1, n);
            let (_, r2) = neighbours(r1, n);
            (field[r2] - 4.0 * field[r1] + 6.0 * field[i] - 4.0 * field[l1] + field[l2]) * inv4
        })
        .collect()
}

/// Bracketing indices and lerp weight for position x.
#[inline]
fn bracket(n: usize, x: f64, length: f64, dx: f64) -> (usize, usize, f64) {
    let xw = x.rem_euclid(length);
    let u = xw / dx;
    let base = u.floor();
    let frac = u - base;
    let i0 = (base as usize) % n;
    (i0, (i0 + 1) % n, frac)
}

/// Linear interpolation of a grid field at arbitrary x (periodic).
/// Two lookups and one lerp, no allocation.
#[inline]
pub fn sample_at(field: &[f64], x: f64, length: f64, dx: f64) -> f64 {
    let n = field.len();
    if n == 0 {
        return 0.0;
    }
    if !x.is_finite() {
        return f64::NAN;
    }
    let (i0, i1, w) = bracket(n, x, length, dx);
    field[i0] + w * (field[i1] - field[i0])
}

/// Centered derivative at the two bracketing points, lerped to x.
/// Equivalent to `sample_at(&derivative(field, dx), ..)` without the
/// intermediate vector.
#[inline]
pub fn sample_gradient_at(field: &[f64], x: f64, length: f64, dx: f64) -> f64 {
    let n = field.len();
    if n == 0 {
        return 0.0;
    }
    if !x.is_finite() {
        return f64::NAN;
    }
    let (i0, i1, w) = bracket(n, x, length, dx);
    let d = |i: usize| {
        let (l, r) = neighbours(i, n);
        (field[r] - field[l]) * (0.5 / dx)
    };
    let d0 = d(i0);
    d0 + w * (d(i1) - d0)
}

/// Gradient jump across grid cell i, (f[i+1] − 2f[i] + f[i−1]) / dx.
/// A delta source of weight J at i produces a jump of J in steady state.
#[inline]
pub fn gradient_jump(field: &[f64], i: usize, dx: f64) -> f64 {
    let n = field.len();
    let (l, r) = neighbours(i, n);
    (field[r] - 2.0 * field[i] + field[l]) / dx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn sine(n: usize, length: f64, k: f64) -> (Vec<f64>, f64) {
        let dx = length / n as f64;
        let f = (0..n).map(|i| (k * TAU * i as f64 * dx / length).sin()).collect();
        (f, dx)
    }

    #[test]
    fn test_derivative_of_sine() {
        let (f, dx) = sine(128, 2.0, 1.0);
        let d = derivative(&f, dx);
        let k = TAU / 2.0;
        for (i, &v) in d.iter().enumerate() {
            let exact = k * (k * i as f64 * dx).cos();
            assert!((v - exact).abs() < 1e-2, "i={i} got {v} want {exact}");
        }
    }

    #[test]
    fn test_laplacian_of_sine() {
        let (f, dx) = sine(128, 2.0, 1.0);
        let lap = laplacian(&f, dx);
        let k2 = (TAU / 2.0).powi(2);
        for (i, &v) in lap.iter().enumerate() {
            assert!((v + k2 * f[i]).abs() < 1e-2);
        }
    }

    #[test]
    fn test_laplacian_periodic_wrap() {
        let mut f = vec![0.0; 8];
        f[0] = 1.0;
        let lap = laplacian(&f, 1.0);
        assert_eq!(lap[7], 1.0);
        assert_eq!(lap[0], -2.0);
        assert_eq!(lap[1], 1.0);
        assert!(lap.iter().sum::<f64>().abs() < 1e-15);
    }

    #[test]
    fn test_forward_difference_sums_to_zero() {
        let (f, dx) = sine(16, 1.0, 2.0);
        let fd = forward_difference(&f, dx);
        assert!(fd.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn test_fourth_difference_of_constant() {
        let f = vec![3.0; 10];
        assert!(fourth_difference(&f, 0.1).iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_sample_at_grid_points_and_midpoint() {
        let f = vec![0.0, 1.0, 2.0, 3.0];
        assert_eq!(sample_at(&f, 1.0, 4.0, 1.0), 1.0);
        assert!((sample_at(&f, 1.5, 4.0, 1.0) - 1.5).abs() < 1e-15);
        // between last point and wrapped first point
        assert!((sample_at(&f, 3.5, 4.0, 1.0) - 1.5).abs() < 1e-15);
        assert!((sample_at(&f, -0.5, 4.0, 1.0) - 1.5).abs() < 1e-15);
    }

    #[test]
    fn test_sample_at_propagates_nan() {
        let f = vec![0.0, f64::NAN, 0.0, 0.0];
        assert!(sample_at(&f, 0.5, 4.0, 1.0).is_nan());
        assert!(sample_at(&[0.0; 4], f64::NAN, 4.0, 1.0).is_nan());
    }

    #[test]
    fn test_sample_gradient_matches_derivative() {
        let (f, dx) = sine(32, 2.0, 1.0);
        let d = derivative(&f, dx);
        for &x in &[0.0, 0.33, 1.0, 1.97] {
            let a = sample_gradient_at(&f, x, 2.0, dx);
            let b = sample_at(&d, x, 2.0, dx);
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gradient_jump_of_kink() {
        // |x| kink at i=2 with unit slopes: jump = 2
        let f = vec![2.0, 1.0, 0.0, 1.0, 2.0, 1.0];
        assert!((gradient_jump(&f, 2, 1.0) - 2.0).abs() < 1e-15);
    }
}
