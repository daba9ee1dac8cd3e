use num_traits::Float;

use newtonic::dense::{add_scaled, dot, identity, mat_vec, neg, norm, sub};
use newtonic::{IncompleteCholesky, Objective, Preconditioner, Projection};

use super::to_f64;
use crate::convergence::ConvergenceParams;
use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::OptimError;
use crate::line_search::{projected_search, WolfePowellParams};
use crate::linalg::{pcg_solve, PcgConfig};
use crate::result::{OptimResult, TerminationReason};

/// Configuration for projected BFGS descent.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectedBfgsConfig<F, P = IncompleteCholesky<F>> {
    /// Stationarity tolerance and soft iteration cap (defaults: 1e-3, 1000).
    pub convergence: ConvergenceParams<F>,
    /// Solve of `H d = -g`.
    pub pcg: PcgConfig<F>,
    /// Projected line search (defaults: `sigma = 1e-4`, `rho = 1e-2`).
    pub line_search: WolfePowellParams<F>,
    /// Preconditioner for `H d = -g`.
    pub preconditioner: P,
}

impl Default for ProjectedBfgsConfig<f64> {
    fn default() -> Self {
        ProjectedBfgsConfig {
            convergence: ConvergenceParams::default().with_max_iter(1000),
            pcg: PcgConfig::default(),
            line_search: WolfePowellParams::projected(),
            preconditioner: IncompleteCholesky::default(),
        }
    }
}

impl Default for ProjectedBfgsConfig<f32> {
    fn default() -> Self {
        ProjectedBfgsConfig {
            convergence: ConvergenceParams::default().with_max_iter(1000),
            pcg: PcgConfig::default(),
            line_search: WolfePowellParams::projected(),
            preconditioner: IncompleteCholesky::default(),
        }
    }
}

/// Overwrite rows and columns of `h` at `active` with those of the identity.
fn restrict_to_inactive<F: Float>(h: &mut [Vec<F>], active: &[usize]) {
    for &i in active {
        for (j, hij) in h[i].iter_mut().enumerate() {
            *hij = if i == j { F::one() } else { F::zero() };
        }
    }
    for row in h.iter_mut() {
        for &j in active {
            row[j] = F::zero();
        }
    }
    for &i in active {
        h[i][i] = F::one();
    }
}

/// `‖x − P(x − g)‖`.
fn projected_gradient_norm<F: Float, P: Projection<F> + ?Sized>(proj: &P, x: &[F], g: &[F]) -> F {
    norm(&sub(x, &proj.project(&sub(x, g))))
}

/// Projected BFGS descent for `min f(x)` subject to `x ∈ C`.
///
/// Keeps a Hessian approximation `H` whose rows and columns at active indices
/// are those of the identity, so bound-constrained components move along the
/// projected gradient. Directions come from `H d = -g` by [`pcg_solve`]; a
/// direction that is not a descent direction is replaced by `-g` and `H` reset.
/// When the active set changes, `H` is only re-restricted; otherwise the BFGS
/// update is applied if the curvature `y^T s` exceeds `eps²`, and `H` is reset
/// to the identity if not.
///
/// Returns when `‖x − P(x − ∇f(x))‖ <= tolerance`. The iteration cap is soft:
/// reaching it ends the run with [`TerminationReason::SoftIterationLimit`] and
/// the last iterate. Line-search errors are propagated, including
/// [`OptimError::StationaryPointPrecondition`].
pub fn projected_bfgs<F, O, C, P>(
    obj: &O,
    proj: &C,
    x0: &[F],
    config: &ProjectedBfgsConfig<F, P>,
    diag: &mut dyn Diagnostics,
) -> Result<OptimResult<F>, OptimError>
where
    F: Float,
    O: Objective<F> + ?Sized,
    C: Projection<F> + ?Sized,
    P: Preconditioner<F>,
{
    config.convergence.validate()?;
    config.pcg.validate()?;
    config.line_search.validate()?;
    let n = x0.len();
    OptimError::check_dim(obj.dim(), n)?;

    let eps = config.convergence.tolerance;
    let max_iter = config.convergence.max_iter;
    emit!(
        diag,
        Level::INFO,
        "projected bfgs: n = {}, eps = {:e}",
        n,
        to_f64(eps)
    );

    let mut x = proj.project(x0);
    let mut h = identity::<F>(n);
    let mut active = proj.active_set(&x);
    let (mut value, mut grad) = obj.eval_grad(&x);
    let mut func_evals = 1;
    let mut grad_evals = 1;
    let mut iterations = 0;

    let (stationarity, termination) = loop {
        let stationarity = projected_gradient_norm(proj, &x, &grad);
        if stationarity <= eps {
            break (stationarity, TerminationReason::Stationary);
        }
        if iterations >= max_iter {
            emit!(
                diag,
                Level::WARN,
                "projected bfgs reached {} iterations, stationarity {:e}",
                max_iter,
                to_f64(stationarity)
            );
            break (stationarity, TerminationReason::SoftIterationLimit);
        }

        let step = pcg_solve(&h, &neg(&grad), &config.preconditioner, &config.pcg, diag)?;
        if !step.converged() {
            emit!(
                diag,
                Level::WARN,
                "projected bfgs step {}: using inexact quasi-Newton direction ({:?})",
                iterations,
                step.termination
            );
        }
        let mut d = step.y;
        if !(dot(&grad, &d) < F::zero()) {
            emit!(
                diag,
                Level::WARN,
                "projected bfgs step {}: not a descent direction, resetting H",
                iterations
            );
            d = neg(&grad);
            h = identity(n);
        }

        let ls = projected_search(
            obj,
            proj,
            &x,
            &d,
            value,
            &grad,
            &config.line_search,
            diag,
        )?;
        func_evals += ls.func_evals;
        grad_evals += ls.grad_evals;

        let x_next = proj.project(&add_scaled(&x, ls.step, &d));
        let active_next = proj.active_set(&x_next);
        let (value_next, grad_next) = obj.eval_grad(&x_next);
        func_evals += 1;
        grad_evals += 1;

        if active_next != active {
            restrict_to_inactive(&mut h, &active_next);
        } else {
            let s = sub(&x_next, &x);
            let y = sub(&grad_next, &grad);
            let curvature = dot(&y, &s);
            let hs = mat_vec(&h, &s);
            let s_hs = dot(&s, &hs);
            if !(curvature > eps * eps) || !(s_hs > F::zero()) || !s_hs.is_finite() {
                emit!(
                    diag,
                    Level::WARN,
                    "projected bfgs step {}: curvature {:e} too small, resetting H",
                    iterations,
                    to_f64(curvature)
                );
                h = identity(n);
            } else {
                for (i, row) in h.iter_mut().enumerate() {
                    for (j, hij) in row.iter_mut().enumerate() {
                        *hij = *hij + y[i] * y[j] / curvature - hs[i] * hs[j] / s_hs;
                    }
                }
                restrict_to_inactive(&mut h, &active_next);
            }
        }

        x = x_next;
        active = active_next;
        value = value_next;
        grad = grad_next;
        iterations += 1;
        emit!(
            diag,
            Level::DEBUG,
            "projected bfgs iter {}: f = {:e}, t = {:e}, {} active",
            iterations,
            to_f64(value),
            to_f64(ls.step),
            active.len()
        );
    };

    emit!(
        diag,
        Level::INFO,
        "projected bfgs terminated after {} steps with stationarity {:e}",
        iterations,
        to_f64(stationarity)
    );
    Ok(OptimResult {
        x,
        value,
        gradient: grad,
        stationarity,
        iterations,
        func_evals,
        grad_evals,
        termination,
    })
}
