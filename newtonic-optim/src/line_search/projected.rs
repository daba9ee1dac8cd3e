use num_traits::Float;

use newtonic::dense::{add_scaled, dot, sub};
use newtonic::{Objective, Projection};

use super::{bracket_and_bisect, LineSearchResult, StepTests, WolfePowellParams};
use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::OptimError;

struct AlongProjectedPath<'a, F, O: ?Sized, P: ?Sized> {
    obj: &'a O,
    proj: &'a P,
    x: &'a [F],
    d: &'a [F],
    f_x: F,
    grad_x: &'a [F],
    slope: F,
    sigma: F,
    rho: F,
    func_evals: usize,
    grad_evals: usize,
}

impl<F, O, P> AlongProjectedPath<'_, F, O, P>
where
    F: Float,
    O: Objective<F> + ?Sized,
    P: Projection<F> + ?Sized,
{
    /// `(x + t d, P(x + t d))`.
    fn trial(&self, t: F) -> (Vec<F>, Vec<F>) {
        let raw = add_scaled(self.x, t, self.d);
        let projected = self.proj.project(&raw);
        (raw, projected)
    }
}

impl<F, O, P> StepTests<F> for AlongProjectedPath<'_, F, O, P>
where
    F: Float,
    O: Objective<F> + ?Sized,
    P: Projection<F> + ?Sized,
{
    fn sufficient_decrease(&mut self, t: F) -> bool {
        let (_, x_t) = self.trial(t);
        let predicted = dot(self.grad_x, &sub(&x_t, self.x));
        // The projected step must itself be a descent step
        if !(predicted < F::zero()) {
            return false;
        }
        self.func_evals += 1;
        self.obj.value(&x_t) <= self.f_x + self.sigma * predicted
    }

    fn curvature(&mut self, t: F) -> bool {
        let (raw, x_t) = self.trial(t);
        if raw != x_t {
            // Arrested by a bound
            return true;
        }
        self.grad_evals += 1;
        dot(&self.obj.gradient(&x_t), self.d) >= self.rho * self.slope
    }

    fn may_expand(&mut self, t: F) -> bool {
        let (raw, x_t) = self.trial(t);
        raw == x_t
    }
}

/// Projected backtracking / Wolfe-Powell search along `t -> P(x + t d)`.
///
/// `f_x = f(x)` and `grad_x = ∇f(x)` are expected at `x`. An infeasible `x`
/// is replaced by `P(x)`, where both are evaluated afresh. The accepted
/// `t` satisfies the projected sufficient decrease
/// `f(P(x + t d)) <= f(x) + sigma·∇f(x)^T (P(x + t d) − x)` and, only while
/// `x + t d` is still feasible, the curvature condition
/// `∇f(x + t d)^T d >= rho·∇f(x)^T d`. The point `P(x + t d)` is feasible by
/// construction.
///
/// Fails with [`OptimError::NotADescentDirection`] unless `∇f(x)^T d < 0` and
/// with [`OptimError::StationaryPointPrecondition`] when `P(x + d) == x`.
#[allow(clippy::too_many_arguments)]
pub fn projected_search<F, O, P>(
    obj: &O,
    proj: &P,
    x: &[F],
    d: &[F],
    f_x: F,
    grad_x: &[F],
    params: &WolfePowellParams<F>,
    diag: &mut dyn Diagnostics,
) -> Result<LineSearchResult<F>, OptimError>
where
    F: Float,
    O: Objective<F> + ?Sized,
    P: Projection<F> + ?Sized,
{
    params.validate()?;
    OptimError::check_dim(x.len(), d.len())?;
    OptimError::check_dim(x.len(), grad_x.len())?;

    // Values supplied for an infeasible x belong to the wrong point
    let feasible = proj.project(x);
    let (x, f_x, grad_x, evals) = if feasible.as_slice() == x {
        (feasible, f_x, grad_x.to_vec(), 0)
    } else {
        let (f, g) = obj.eval_grad(&feasible);
        (feasible, f, g, 1)
    };
    let slope = dot(&grad_x, d);
    if !(slope < F::zero()) {
        return Err(OptimError::NotADescentDirection {
            slope: slope.to_f64().unwrap_or(f64::NAN),
        });
    }
    if proj.project(&add_scaled(&x, F::one(), d)) == x {
        return Err(OptimError::StationaryPointPrecondition);
    }

    let mut tests = AlongProjectedPath {
        obj,
        proj,
        x: &x,
        d,
        f_x,
        grad_x: &grad_x,
        slope,
        sigma: params.sigma,
        rho: params.rho,
        func_evals: evals,
        grad_evals: evals,
    };
    let step = bracket_and_bisect(&mut tests, params.max_iter, diag)?;
    emit!(
        diag,
        Level::TRACE,
        "projected search step {:e} ({} evaluations)",
        step.to_f64().unwrap_or(f64::NAN),
        tests.func_evals + tests.grad_evals
    );

    Ok(LineSearchResult {
        step,
        func_evals: tests.func_evals,
        grad_evals: tests.grad_evals,
    })
}
