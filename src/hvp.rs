use num_traits::Float;

use crate::dense::{add_scaled, constant, mat_vec, norm};
use crate::objective::{Objective, TwiceDifferentiable};

/// Directional second derivative `H(x)·d` of an objective.
///
/// `grad_x` is `∇f(x)`, already known by every caller, so approximations can
/// skip one gradient evaluation.
pub trait DirectionalHessian<F: Float, O: ?Sized> {
    /// Approximate `H(x)·d`.
    fn apply(&self, objective: &O, x: &[F], grad_x: &[F], d: &[F]) -> Vec<F>;

    /// Gradient evaluations performed by one call to [`apply`](Self::apply).
    fn gradient_evals(&self) -> usize {
        1
    }
}

/// Forward-difference Hessian-vector product.
///
/// `H(x)·d ≈ ‖d‖ / δ · (∇f(x + δ d/‖d‖) − ∇f(x))`; the probe step has length
/// `δ` regardless of the scale of `d`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiniteDifference<F> {
    /// Probe step length (default: 1e-6).
    pub delta: F,
}

impl Default for FiniteDifference<f64> {
    fn default() -> Self {
        FiniteDifference { delta: 1e-6 }
    }
}

impl Default for FiniteDifference<f32> {
    fn default() -> Self {
        FiniteDifference { delta: 1e-3 }
    }
}

impl<F: Float, O: Objective<F> + ?Sized> DirectionalHessian<F, O> for FiniteDifference<F> {
    fn apply(&self, objective: &O, x: &[F], grad_x: &[F], d: &[F]) -> Vec<F> {
        let d_norm = norm(d);
        if d_norm == F::zero() {
            return vec![F::zero(); d.len()];
        }
        let h = self.delta / d_norm;
        let probe = objective.gradient(&add_scaled(x, h, d));
        probe
            .iter()
            .zip(grad_x)
            .map(|(&gp, &g)| (gp - g) / h)
            .collect()
    }
}

/// Exact product through [`TwiceDifferentiable::hessian`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactHessian;

impl<F: Float, O: TwiceDifferentiable<F> + ?Sized> DirectionalHessian<F, O> for ExactHessian {
    fn apply(&self, objective: &O, x: &[F], _grad_x: &[F], d: &[F]) -> Vec<F> {
        mat_vec(&objective.hessian(x), d)
    }

    fn gradient_evals(&self) -> usize {
        0
    }
}

/// Central-difference variant, twice the cost of [`FiniteDifference`] with
/// `O(δ²)` truncation error.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CentralDifference<F> {
    /// Probe step length (default: 1e-5).
    pub delta: F,
}

impl Default for CentralDifference<f64> {
    fn default() -> Self {
        CentralDifference { delta: 1e-5 }
    }
}

impl Default for CentralDifference<f32> {
    fn default() -> Self {
        CentralDifference { delta: 1e-2 }
    }
}

impl<F: Float, O: Objective<F> + ?Sized> DirectionalHessian<F, O> for CentralDifference<F> {
    fn apply(&self, objective: &O, x: &[F], _grad_x: &[F], d: &[F]) -> Vec<F> {
        let d_norm = norm(d);
        if d_norm == F::zero() {
            return vec![F::zero(); d.len()];
        }
        let h = self.delta / d_norm;
        let forward = objective.gradient(&add_scaled(x, h, d));
        let backward = objective.gradient(&add_scaled(x, -h, d));
        let two_h = constant::<F>(2.0) * h;
        forward
            .iter()
            .zip(&backward)
            .map(|(&gf, &gb)| (gf - gb) / two_h)
            .collect()
    }

    fn gradient_evals(&self) -> usize {
        2
    }
}
