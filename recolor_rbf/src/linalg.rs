/////////////////////////////////////////////////////////////////////////////////////////////
//
// Adds the regularized Cholesky solve for the per-channel kernel coefficients.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # linalg
//!
//! Solves `(K_D + delta * N * I) a = F` for the `N x 3` coefficient matrix `a`.

use crate::recolorizer::RecolorError;
use faer::{Mat, MatRef, Side, linalg::solvers::Solve};

/// Tikhonov-regularized Cholesky solver for the training system.
#[derive(Debug, Clone, Copy)]
pub struct CoefficientSolver {
    delta: f64,
}

impl CoefficientSolver {
    pub fn new(delta: f64) -> Self {
        Self { delta }
    }

    /// Solves for one coefficient column per color channel.
    ///
    /// # Arguments
    /// * `k_d` - Symmetric `N x N` training kernel matrix.
    /// * `colors` - `N x C` matrix of known channel values.
    ///
    /// # Errors
    /// [`RecolorError::Numerical`] when the factorization fails, when `delta == 0`
    /// and the factor is numerically singular, or when the solution is not finite.
    pub fn solve(&self, k_d: MatRef<'_, f64>, colors: MatRef<'_, f64>) -> Result<Mat<f64>, RecolorError> {
        let n = k_d.nrows();
        debug_assert_eq!(k_d.ncols(), n);
        debug_assert_eq!(colors.nrows(), n);

        let numerical = |reason: String| RecolorError::Numerical {
            num_samples: n,
            delta: self.delta,
            reason,
        };

        let shift = self.delta * n as f64;
        let mut system = k_d.to_owned();
        for i in 0..n {
            system[(i, i)] += shift;
        }

        let llt = system
            .llt(Side::Lower)
            .map_err(|e| numerical(format!("Cholesky factorization failed: {e:?}")))?;

        // Without regularization, duplicated or near-duplicated samples give a
        // factor that succeeds but is useless.
        if self.delta == 0.0 {
            let ratio = pivot_ratio(llt.L());
            if ratio < f64::EPSILON {
                return Err(numerical(format!(
                    "system is numerically singular (pivot ratio {ratio:.3e})"
                )));
            }
        }

        let coefficients = llt.solve(&colors);

        if coefficients.col_iter().any(|c| c.iter().any(|v| !v.is_finite())) {
            return Err(numerical("solution contains non-finite values".to_string()));
        }

        Ok(coefficients)
    }
}

/// Ratio of the smallest to the largest squared diagonal entry of a Cholesky factor.
///
/// Approximates the reciprocal condition of the factored matrix along its pivots.
#[allow(non_snake_case)]
fn pivot_ratio(L: MatRef<'_, f64>) -> f64 {
    let (min, max) = (0..L.nrows())
        .map(|i| {
            let d = L[(i, i)];
            d * d
        })
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), d2| (lo.min(d2), hi.max(d2)));

    if max > 0.0 { min / max } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::utils::approx::*;

    /// Deterministic SPD matrix: A = M M^T + alpha I.
    fn make_spd(n: usize, alpha: f64) -> Mat<f64> {
        let mut m = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let x = (i as f64 + 1.0) * (j as f64 + 2.0);
                m[(i, j)] = (x.sin() + 2.0 * x.cos()) / (1.0 + (i + j + 1) as f64);
            }
        }
        let mut a = &m * m.transpose();
        for i in 0..n {
            a[(i, i)] += alpha;
        }
        a
    }

    fn colors(n: usize) -> Mat<f64> {
        Mat::<f64>::from_fn(n, 3, |i, j| ((7 * i + 31 * j) % 256) as f64)
    }

    #[test]
    fn unregularized_solve_satisfies_system() {
        let n = 7usize;
        let a = make_spd(n, 1e-1);
        let f = colors(n);

        let x = CoefficientSolver::new(0.0).solve(a.as_ref(), f.as_ref()).unwrap();

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * (n as f64) * 255.0);
        assert!(&a * &x ~ f);
    }

    #[test]
    fn regularization_shifts_the_diagonal_by_delta_n() {
        let n = 6usize;
        let delta = 0.05;
        let a = make_spd(n, 1e-1);
        let f = colors(n);

        let x = CoefficientSolver::new(delta).solve(a.as_ref(), f.as_ref()).unwrap();

        let mut shifted = a.clone();
        for i in 0..n {
            shifted[(i, i)] += delta * n as f64;
        }

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * (n as f64) * 255.0);
        assert!(&shifted * &x ~ f);
    }

    #[test]
    fn single_sample_closed_form() {
        let k = Mat::<f64>::from_fn(1, 1, |_, _| 1.0);
        let f = Mat::<f64>::from_fn(1, 3, |_, j| [200.0, 50.0, 10.0][j]);

        let x = CoefficientSolver::new(2e-4).solve(k.as_ref(), f.as_ref()).unwrap();

        for (j, v) in [200.0, 50.0, 10.0].iter().enumerate() {
            assert!((x[(0, j)] - v / (1.0 + 2e-4)).abs() < 1e-12);
        }
    }

    #[test]
    fn duplicates_need_regularization() {
        // Two identical samples produce a rank-one kernel matrix.
        let k = Mat::<f64>::from_fn(2, 2, |_, _| 1.0);
        let f = Mat::<f64>::from_fn(2, 3, |_, _| 100.0);

        let err = CoefficientSolver::new(0.0).solve(k.as_ref(), f.as_ref()).unwrap_err();
        match err {
            RecolorError::Numerical { num_samples, delta, .. } => {
                assert_eq!(num_samples, 2);
                assert_eq!(delta, 0.0);
            }
            other => panic!("unexpected error: {other}"),
        }

        let x = CoefficientSolver::new(1e-3).solve(k.as_ref(), f.as_ref()).unwrap();
        // Symmetric split: each coefficient is 100 / (2 + 2e-3).
        for j in 0..3 {
            assert!((x[(0, j)] - x[(1, j)]).abs() < 1e-9);
            assert!((x[(0, j)] - 100.0 / 2.002).abs() < 1e-9);
        }
    }

    #[test]
    fn regularization_below_rounding_is_reported() {
        // Three identical samples: the shift must outlive 1.0 + delta * 3.
        let k = Mat::<f64>::from_fn(3, 3, |_, _| 1.0);
        let f = Mat::<f64>::from_fn(3, 3, |_, j| [10.0, 20.0, 30.0][j]);

        let x = CoefficientSolver::new(1e-10).solve(k.as_ref(), f.as_ref()).unwrap();
        for j in 0..3 {
            let predicted: f64 = (0..3).map(|i| x[(i, j)]).sum();
            assert!((predicted - f[(0, j)]).abs() < 1e-6);
        }

        match CoefficientSolver::new(1e-17).solve(k.as_ref(), f.as_ref()) {
            Err(RecolorError::Numerical { num_samples, delta, .. }) => {
                assert_eq!(num_samples, 3);
                assert_eq!(delta, 1e-17);
            }
            other => panic!("expected a numerical error, got {other:?}"),
        }
    }

    #[test]
    fn indefinite_matrix_is_reported() {
        let k = Mat::<f64>::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 2.0 });
        let f = Mat::<f64>::zeros(2, 3);
        assert!(matches!(
            CoefficientSolver::new(0.0).solve(k.as_ref(), f.as_ref()),
            Err(RecolorError::Numerical { .. })
        ));
    }

    #[test]
    fn pivot_ratio_of_identity_is_one() {
        let eye = Mat::<f64>::identity(4, 4);
        assert_eq!(pivot_ratio(eye.as_ref()), 1.0);
    }
}
