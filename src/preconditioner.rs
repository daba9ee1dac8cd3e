//! Preconditioners for conjugate-gradient solves.
//!
//! A preconditioner approximates `A^{-1}`: `factorize` builds a factor once
//! per linear system and `solve` applies it to each residual.

use num_traits::Float;

use crate::dense::constant;

/// Factorize a symmetric matrix and apply the approximate inverse.
pub trait Preconditioner<F: Float> {
    /// Factor built from `A` and reused for every residual.
    type Factor;

    /// Build the factor for the `n x n` symmetric matrix `a`.
    fn factorize(&self, a: &[Vec<F>]) -> Self::Factor;

    /// Return `z ≈ A^{-1} r`.
    fn solve(&self, factor: &Self::Factor, r: &[F]) -> Vec<F>;
}

/// No preconditioning: `z = r`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<F: Float> Preconditioner<F> for Identity {
    type Factor = ();

    fn factorize(&self, _a: &[Vec<F>]) -> Self::Factor {}

    fn solve(&self, _factor: &(), r: &[F]) -> Vec<F> {
        r.to_vec()
    }
}

/// Diagonal (Jacobi) preconditioner `M = diag(A)`.
///
/// Non-positive or non-finite diagonal entries fall back to 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jacobi;

impl<F: Float> Preconditioner<F> for Jacobi {
    type Factor = Vec<F>;

    fn factorize(&self, a: &[Vec<F>]) -> Vec<F> {
        a.iter()
            .enumerate()
            .map(|(i, row)| {
                let d = row[i];
                if d > F::zero() && d.is_finite() {
                    F::one() / d
                } else {
                    F::one()
                }
            })
            .collect()
    }

    fn solve(&self, factor: &Vec<F>, r: &[F]) -> Vec<F> {
        factor.iter().zip(r).map(|(&inv, &ri)| inv * ri).collect()
    }
}

/// Zero-fill incomplete Cholesky `L L^T ≈ A + βI`.
///
/// The factorization keeps the sparsity pattern of the lower triangle of `A`
/// (on a dense matrix it is the exact Cholesky factor). If a pivot turns
/// non-positive the diagonal shift `β` is grown and the factorization
/// restarted, starting from `-min(diag A) + shift` when the diagonal is not
/// positive.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncompleteCholesky<F> {
    /// Minimal diagonal shift tried after a failed factorization (default: 1e-3).
    pub shift: F,
    /// Number of restarts before giving up on the pattern (default: 64).
    pub max_restarts: usize,
}

impl Default for IncompleteCholesky<f64> {
    fn default() -> Self {
        IncompleteCholesky {
            shift: 1e-3,
            max_restarts: 64,
        }
    }
}

impl Default for IncompleteCholesky<f32> {
    fn default() -> Self {
        IncompleteCholesky {
            shift: 1e-3,
            max_restarts: 64,
        }
    }
}

/// Factor produced by [`IncompleteCholesky`].
#[derive(Debug, Clone)]
pub enum CholeskyFactor<F> {
    /// Lower-triangular factor `L`, stored row-major.
    Lower(Vec<Vec<F>>),
    /// The shifted factorization never succeeded; the diagonal is used instead.
    Diagonal(Vec<F>),
}

impl<F: Float> IncompleteCholesky<F> {
    /// Diagonal shift `β` for the first factorization attempt.
    fn initial_shift(&self, a: &[Vec<F>]) -> F {
        let min_diag = a
            .iter()
            .enumerate()
            .map(|(i, row)| row[i])
            .fold(F::infinity(), F::min);
        if min_diag > F::zero() {
            F::zero()
        } else {
            self.shift - min_diag
        }
    }
}

// Explicit indexing mirrors the left-looking update over the lower triangle
#[allow(clippy::needless_range_loop)]
fn ic0<F: Float>(a: &[Vec<F>], beta: F) -> Option<Vec<Vec<F>>> {
    let n = a.len();
    let mut l = vec![vec![F::zero(); n]; n];
    for i in 0..n {
        for j in 0..=i {
            l[i][j] = a[i][j];
        }
        l[i][i] = l[i][i] + beta;
    }

    for k in 0..n {
        let pivot = l[k][k];
        if !(pivot > F::zero()) || !pivot.is_finite() {
            return None;
        }
        let lkk = pivot.sqrt();
        l[k][k] = lkk;
        for i in (k + 1)..n {
            if l[i][k] != F::zero() {
                l[i][k] = l[i][k] / lkk;
            }
        }
        for j in (k + 1)..n {
            let ljk = l[j][k];
            if ljk == F::zero() {
                continue;
            }
            for i in j..n {
                if l[i][j] != F::zero() || i == j {
                    l[i][j] = l[i][j] - l[i][k] * ljk;
                }
            }
        }
    }
    Some(l)
}

impl<F: Float> Preconditioner<F> for IncompleteCholesky<F> {
    type Factor = CholeskyFactor<F>;

    fn factorize(&self, a: &[Vec<F>]) -> CholeskyFactor<F> {
        let two = constant::<F>(2.0);
        let mut beta = self.initial_shift(a);
        for _ in 0..=self.max_restarts {
            if let Some(l) = ic0(a, beta) {
                return CholeskyFactor::Lower(l);
            }
            beta = (two * beta).max(self.shift);
        }
        CholeskyFactor::Diagonal(Jacobi.factorize(a))
    }

    fn solve(&self, factor: &CholeskyFactor<F>, r: &[F]) -> Vec<F> {
        match factor {
            CholeskyFactor::Lower(l) => lower_upper_solve(l, r),
            CholeskyFactor::Diagonal(inv) => Jacobi.solve(inv, r),
        }
    }
}

/// Solve `L L^T z = r` by forward then backward substitution.
#[allow(clippy::needless_range_loop)]
fn lower_upper_solve<F: Float>(l: &[Vec<F>], r: &[F]) -> Vec<F> {
    let n = r.len();
    let mut w = r.to_vec();
    for i in 0..n {
        let mut sum = w[i];
        for j in 0..i {
            sum = sum - l[i][j] * w[j];
        }
        w[i] = sum / l[i][i];
    }
    for i in (0..n).rev() {
        let mut sum = w[i];
        for j in (i + 1)..n {
            sum = sum - l[j][i] * w[j];
        }
        w[i] = sum / l[i][i];
    }
    w
}
