use num_traits::Float;

use newtonic::dense::{axpy, dot, is_square, mat_vec, norm};
use newtonic::Preconditioner;

use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::{OptimError, Stage};

/// Parameters for the preconditioned conjugate-gradient solver.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgConfig<F> {
    /// Residual tolerance: stop once `‖A y − b‖ <= tolerance` (default: 1e-6).
    pub tolerance: F,
    /// Iteration cap (default: 30).
    pub max_iter: usize,
}

impl Default for PcgConfig<f64> {
    fn default() -> Self {
        PcgConfig {
            tolerance: 1e-6,
            max_iter: 30,
        }
    }
}

impl Default for PcgConfig<f32> {
    fn default() -> Self {
        PcgConfig {
            tolerance: 1e-4,
            max_iter: 30,
        }
    }
}

impl<F: Float> PcgConfig<F> {
    pub fn validate(&self) -> Result<(), OptimError> {
        if !(self.tolerance > F::zero()) {
            return Err(OptimError::InvalidParameter {
                name: "delta",
                reason: "PCG tolerance must be positive",
            });
        }
        Ok(())
    }
}

/// Why a PCG solve stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcgTermination {
    /// Residual norm fell below tolerance.
    Converged,
    /// The iteration cap was reached first.
    IterationBound,
    /// `d^T A d` was non-positive or not finite: `A` is not SPD along `d`.
    CurvatureBreakdown,
}

/// Outcome of [`pcg_solve`]. `y` is always the best iterate available.
#[derive(Debug, Clone)]
pub struct PcgSolution<F> {
    /// Approximate solution.
    pub y: Vec<F>,
    /// `‖A y − b‖` as tracked by the recurrence.
    pub residual_norm: F,
    /// CG steps taken.
    pub iterations: usize,
    pub termination: PcgTermination,
}

impl<F> PcgSolution<F> {
    /// `true` when the residual tolerance was met.
    pub fn converged(&self) -> bool {
        self.termination == PcgTermination::Converged
    }

    /// Convert a non-converged solution into an error, for callers that
    /// cannot use a best-effort answer.
    pub fn into_result(self, max_iter: usize) -> Result<Vec<F>, OptimError> {
        match self.termination {
            PcgTermination::Converged => Ok(self.y),
            PcgTermination::IterationBound | PcgTermination::CurvatureBreakdown => {
                Err(OptimError::IterationBoundExceeded {
                    stage: Stage::ConjugateGradient,
                    limit: max_iter,
                })
            }
        }
    }
}

/// Solve the symmetric system `A y = b` by preconditioned conjugate gradients.
///
/// Starts from `y = 0`, `r = −b`, `z = M^{-1} r`, `d = −z`, where `M^{-1}` is
/// applied through `preconditioner`. Non-convergence (iteration cap or a
/// curvature breakdown on a non-SPD `A`) is reported through
/// [`PcgSolution::termination`], never as a panic; the returned `y` is the last
/// iterate. Errors are limited to invalid configuration and mismatched shapes.
pub fn pcg_solve<F: Float, P: Preconditioner<F>>(
    a: &[Vec<F>],
    b: &[F],
    preconditioner: &P,
    config: &PcgConfig<F>,
    diag: &mut dyn Diagnostics,
) -> Result<PcgSolution<F>, OptimError> {
    config.validate()?;
    let n = b.len();
    if !is_square(a, n) {
        return Err(OptimError::DimensionMismatch {
            expected: n,
            found: a.len(),
        });
    }

    let factor = preconditioner.factorize(a);
    let mut y = vec![F::zero(); n];
    let mut r: Vec<F> = b.iter().map(|&bi| -bi).collect();
    let mut z = preconditioner.solve(&factor, &r);
    let mut d: Vec<F> = z.iter().map(|&zi| -zi).collect();
    let mut rz = dot(&r, &z);
    let mut r_norm = norm(&r);
    let mut iterations = 0;

    let termination = loop {
        if r_norm <= config.tolerance {
            break PcgTermination::Converged;
        }
        if iterations == config.max_iter {
            break PcgTermination::IterationBound;
        }

        let ad = mat_vec(a, &d);
        let curvature = dot(&d, &ad);
        if !(curvature > F::zero()) || !curvature.is_finite() {
            break PcgTermination::CurvatureBreakdown;
        }

        let t = rz / curvature;
        axpy(&mut y, t, &d);
        axpy(&mut r, t, &ad);
        z = preconditioner.solve(&factor, &r);
        let rz_new = dot(&r, &z);
        let beta = if rz != F::zero() { rz_new / rz } else { F::zero() };
        for (di, &zi) in d.iter_mut().zip(&z) {
            *di = beta * *di - zi;
        }
        rz = rz_new;
        r_norm = norm(&r);
        iterations += 1;
    };

    match termination {
        PcgTermination::Converged => emit!(
            diag,
            Level::TRACE,
            "pcg converged after {} steps, residual {:e}",
            iterations,
            r_norm.to_f64().unwrap_or(f64::NAN)
        ),
        PcgTermination::IterationBound | PcgTermination::CurvatureBreakdown => emit!(
            diag,
            Level::DEBUG,
            "pcg stopped ({:?}) after {} steps, residual {:e}",
            termination,
            iterations,
            r_norm.to_f64().unwrap_or(f64::NAN)
        ),
    }

    Ok(PcgSolution {
        y,
        residual_norm: r_norm,
        iterations,
        termination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Silent;
    use approx::assert_relative_eq;
    use newtonic::{Identity, IncompleteCholesky, Jacobi};

    fn solve(a: &[Vec<f64>], b: &[f64]) -> PcgSolution<f64> {
        pcg_solve(
            a,
            b,
            &IncompleteCholesky::default(),
            &PcgConfig::default(),
            &mut Silent,
        )
        .unwrap()
    }

    #[test]
    fn solves_small_spd_system() {
        let a = vec![
            vec![4.0, 1.0, 0.0],
            vec![1.0, 7.0, 0.0],
            vec![0.0, 0.0, 3.0],
        ];
        let sol = solve(&a, &[5.0, 8.0, 3.0]);
        assert!(sol.converged());
        for yi in &sol.y {
            assert_relative_eq!(*yi, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn solves_dense_5x5_system() {
        let a = vec![
            vec![484.0, 374.0, 286.0, 176.0, 88.0],
            vec![374.0, 458.0, 195.0, 84.0, 3.0],
            vec![286.0, 195.0, 462.0, -7.0, -6.0],
            vec![176.0, 84.0, -7.0, 453.0, -10.0],
            vec![88.0, 3.0, -6.0, -10.0, 443.0],
        ];
        let b = [1320.0, 773.0, 1192.0, 132.0, 1405.0];
        let sol = solve(&a, &b);
        assert!(sol.converged());
        let expected = [1.0, 0.0, 2.0, 0.0, 3.0];
        for (yi, ei) in sol.y.iter().zip(expected) {
            assert_relative_eq!(*yi, ei, epsilon = 1e-6);
        }
    }

    #[test]
    fn diagonal_system_takes_one_step() {
        let a = vec![vec![2.0, 0.0], vec![0.0, 8.0]];
        let sol = pcg_solve(&a, &[2.0, 4.0], &Jacobi, &PcgConfig::default(), &mut Silent).unwrap();
        assert_eq!(sol.iterations, 1);
        assert_relative_eq!(sol.y[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(sol.y[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn zero_rhs_returns_zero_without_iterating() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let sol = solve(&a, &[0.0, 0.0]);
        assert_eq!(sol.iterations, 0);
        assert_eq!(sol.y, vec![0.0, 0.0]);
    }

    #[test]
    fn indefinite_matrix_breaks_down_without_panicking() {
        let a = vec![vec![1.0, 0.0], vec![0.0, -1.0]];
        let sol = pcg_solve(&a, &[0.0, 1.0], &Identity, &PcgConfig::default(), &mut Silent).unwrap();
        assert_eq!(sol.termination, PcgTermination::CurvatureBreakdown);
        assert!(sol.clone().into_result(30).unwrap_err().is_bound_exceeded());
    }

    #[test]
    fn iteration_cap_is_reported() {
        let a = vec![
            vec![10.0, 1.0, 0.0],
            vec![1.0, 5.0, 1.0],
            vec![0.0, 1.0, 1.0],
        ];
        let config = PcgConfig {
            tolerance: 1e-12,
            max_iter: 1,
        };
        let sol = pcg_solve(&a, &[1.0, 1.0, 1.0], &Identity, &config, &mut Silent).unwrap();
        assert_eq!(sol.termination, PcgTermination::IterationBound);
        assert_eq!(sol.iterations, 1);
    }

    #[test]
    fn rejects_bad_inputs() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let bad = PcgConfig {
            tolerance: 0.0,
            max_iter: 30,
        };
        assert!(matches!(
            pcg_solve(&a, &[1.0, 1.0], &Identity, &bad, &mut Silent),
            Err(OptimError::InvalidParameter { .. })
        ));
        assert!(matches!(
            pcg_solve(&a, &[1.0, 1.0, 1.0], &Identity, &PcgConfig::default(), &mut Silent),
            Err(OptimError::DimensionMismatch { .. })
        ));
    }
}
