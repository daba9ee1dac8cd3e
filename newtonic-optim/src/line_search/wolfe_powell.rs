use num_traits::Float;

use newtonic::dense::{add_scaled, dot};
use newtonic::Objective;

use super::{bracket_and_bisect, LineSearchResult, StepTests, WolfePowellParams};
use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::OptimError;

struct AlongLine<'a, F, O: ?Sized> {
    obj: &'a O,
    x: &'a [F],
    d: &'a [F],
    f_x: F,
    slope: F,
    sigma: F,
    rho: F,
    func_evals: usize,
    grad_evals: usize,
}

impl<F: Float, O: Objective<F> + ?Sized> StepTests<F> for AlongLine<'_, F, O> {
    fn sufficient_decrease(&mut self, t: F) -> bool {
        self.func_evals += 1;
        let f_t = self.obj.value(&add_scaled(self.x, t, self.d));
        f_t <= self.f_x + t * self.sigma * self.slope
    }

    fn curvature(&mut self, t: F) -> bool {
        self.grad_evals += 1;
        let g_t = self.obj.gradient(&add_scaled(self.x, t, self.d));
        dot(&g_t, self.d) >= self.rho * self.slope
    }
}

/// Wolfe-Powell line search on `R^n`.
///
/// Finds `t > 0` with
///
/// - W1: `f(x + t d) <= f(x) + t·sigma·∇f(x)^T d`
/// - W2: `∇f(x + t d)^T d >= rho·∇f(x)^T d`
///
/// `f_x` and `grad_x` are `f(x)` and `∇f(x)`. Fails with
/// [`OptimError::NotADescentDirection`] unless `∇f(x)^T d < 0`, and with
/// [`OptimError::IterationBoundExceeded`] when a bracketing or bisection
/// phase exceeds `params.max_iter`.
pub fn wolfe_powell<F: Float, O: Objective<F> + ?Sized>(
    obj: &O,
    x: &[F],
    d: &[F],
    f_x: F,
    grad_x: &[F],
    params: &WolfePowellParams<F>,
    diag: &mut dyn Diagnostics,
) -> Result<LineSearchResult<F>, OptimError> {
    params.validate()?;
    OptimError::check_dim(x.len(), d.len())?;
    OptimError::check_dim(x.len(), grad_x.len())?;

    let slope = dot(grad_x, d);
    if !(slope < F::zero()) {
        return Err(OptimError::NotADescentDirection {
            slope: slope.to_f64().unwrap_or(f64::NAN),
        });
    }

    let mut tests = AlongLine {
        obj,
        x,
        d,
        f_x,
        slope,
        sigma: params.sigma,
        rho: params.rho,
        func_evals: 0,
        grad_evals: 0,
    };
    let step = bracket_and_bisect(&mut tests, params.max_iter, diag)?;
    emit!(
        diag,
        Level::TRACE,
        "wolfe-powell step {:e} ({} evaluations)",
        step.to_f64().unwrap_or(f64::NAN),
        tests.func_evals + tests.grad_evals
    );

    Ok(LineSearchResult {
        step,
        func_evals: tests.func_evals,
        grad_evals: tests.grad_evals,
    })
}
