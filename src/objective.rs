use num_traits::Float;

/// Trait for differentiable objectives `f: R^n -> R`.
///
/// Objectives are immutable: every method takes `&self`, so one objective can
/// be shared by independent runs. Solvers count evaluations themselves.
pub trait Objective<F: Float> {
    /// Number of input variables.
    fn dim(&self) -> usize;

    /// Evaluate `f(x)`.
    fn value(&self, x: &[F]) -> F;

    /// Evaluate `∇f(x)`.
    fn gradient(&self, x: &[F]) -> Vec<F>;

    /// Evaluate the objective and its gradient at `x`.
    ///
    /// Returns `(f(x), ∇f(x))`. Override when both share work.
    fn eval_grad(&self, x: &[F]) -> (F, Vec<F>) {
        (self.value(x), self.gradient(x))
    }
}

/// An objective that also provides its exact Hessian.
pub trait TwiceDifferentiable<F: Float>: Objective<F> {
    /// Evaluate `H(x)` where `H[i][j] = ∂²f/∂x_i∂x_j`.
    fn hessian(&self, x: &[F]) -> Vec<Vec<F>>;
}

/// A nonlinear least-squares model `p -> r(p)` with `m` residuals.
///
/// The objective minimized by Levenberg-Marquardt is `Σ r_i(p)²`.
pub trait Model<F: Float> {
    /// Number of parameters.
    fn dim(&self) -> usize;

    /// Residual vector `r(p)` of length `m`.
    fn residual(&self, p: &[F]) -> Vec<F>;

    /// Jacobian `J(p)` as an `m x n` matrix, `J[i][k] = ∂r_i/∂p_k`.
    fn jacobian(&self, p: &[F]) -> Vec<Vec<F>>;
}

impl<F: Float, O: Objective<F> + ?Sized> Objective<F> for &O {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn value(&self, x: &[F]) -> F {
        (**self).value(x)
    }

    fn gradient(&self, x: &[F]) -> Vec<F> {
        (**self).gradient(x)
    }

    fn eval_grad(&self, x: &[F]) -> (F, Vec<F>) {
        (**self).eval_grad(x)
    }
}

impl<F: Float, O: TwiceDifferentiable<F> + ?Sized> TwiceDifferentiable<F> for &O {
    fn hessian(&self, x: &[F]) -> Vec<Vec<F>> {
        (**self).hessian(x)
    }
}
