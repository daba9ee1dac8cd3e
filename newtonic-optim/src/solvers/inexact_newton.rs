use num_traits::Float;

use newtonic::dense::{add_scaled, axpy, dot, neg, norm};
use newtonic::{DirectionalHessian, Objective};

use super::to_f64;
use crate::convergence::ConvergenceParams;
use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::{OptimError, Stage};
use crate::line_search::{wolfe_powell, WolfePowellParams};
use crate::result::{OptimResult, TerminationReason};

/// Configuration for inexact (truncated) Newton-CG.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InexactNewtonConfig<F> {
    /// Gradient-norm tolerance and outer iteration cap (defaults: 1e-3, 30).
    pub convergence: ConvergenceParams<F>,
    /// Upper bound on the forcing factor: the inner solve stops once
    /// `‖r‖ <= min(forcing_cap, sqrt(‖g‖))·‖g‖` (default: 0.5).
    pub forcing_cap: F,
    /// Search directions and displacements shorter than this count as
    /// collapsed (default: 1e-12).
    pub collapse_tol: F,
    /// Inner CG step cap. If 0, uses `10 * n`.
    pub max_cg_iter: usize,
    /// Outer line search.
    pub line_search: WolfePowellParams<F>,
}

impl Default for InexactNewtonConfig<f64> {
    fn default() -> Self {
        InexactNewtonConfig {
            convergence: ConvergenceParams::default(),
            forcing_cap: 0.5,
            collapse_tol: 1e-12,
            max_cg_iter: 0,
            line_search: WolfePowellParams::default(),
        }
    }
}

impl Default for InexactNewtonConfig<f32> {
    fn default() -> Self {
        InexactNewtonConfig {
            convergence: ConvergenceParams::default(),
            forcing_cap: 0.5,
            collapse_tol: 1e-6,
            max_cg_iter: 0,
            line_search: WolfePowellParams::default(),
        }
    }
}

impl<F: Float> InexactNewtonConfig<F> {
    pub fn validate(&self) -> Result<(), OptimError> {
        self.convergence.validate()?;
        self.line_search.validate()?;
        if !(self.forcing_cap > F::zero() && self.forcing_cap < F::one()) {
            return Err(OptimError::InvalidParameter {
                name: "forcing_cap",
                reason: "must lie in (0, 1)",
            });
        }
        if !(self.collapse_tol >= F::zero()) {
            return Err(OptimError::InvalidParameter {
                name: "collapse_tol",
                reason: "must be non-negative",
            });
        }
        Ok(())
    }
}

/// Why the inner CG loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InnerStop {
    Forcing,
    Collapsed,
    Curvature,
    StepCap,
}

/// Truncated CG on `H(x) p = -g`, started from `p = 0`.
///
/// Returns the displacement and the number of Hessian-vector products.
#[allow(clippy::too_many_arguments)]
fn truncated_cg<F, O, H>(
    obj: &O,
    hvp: &H,
    x: &[F],
    grad: &[F],
    eta: F,
    eps: F,
    config: &InexactNewtonConfig<F>,
    max_steps: usize,
) -> (Vec<F>, usize, InnerStop)
where
    F: Float,
    O: Objective<F> + ?Sized,
    H: DirectionalHessian<F, O>,
{
    let mut p = vec![F::zero(); x.len()];
    let mut r = grad.to_vec();
    let mut d = neg(&r);
    let mut r_sq = dot(&r, &r);
    let mut products = 0;

    let stop = loop {
        if r_sq.sqrt() <= eta {
            break InnerStop::Forcing;
        }
        if products >= max_steps {
            break InnerStop::StepCap;
        }
        let d_norm = norm(&d);
        if d_norm < config.collapse_tol {
            break InnerStop::Collapsed;
        }
        let hd = hvp.apply(obj, x, grad, &d);
        products += 1;
        let rho = dot(&d, &hd);
        // Negative or vanishing curvature along d
        if !rho.is_finite() || rho <= eps * d_norm * d_norm {
            break InnerStop::Curvature;
        }

        let t = r_sq / rho;
        axpy(&mut p, t, &d);
        axpy(&mut r, t, &hd);
        let r_sq_new = dot(&r, &r);
        let beta = r_sq_new / r_sq;
        for (di, &ri) in d.iter_mut().zip(&r) {
            *di = beta * *di - ri;
        }
        r_sq = r_sq_new;
    };
    (p, products, stop)
}

/// Inexact Newton-CG with a Wolfe-Powell line search.
///
/// Needs only gradients: the Newton system is solved approximately by
/// truncated CG, using `hvp` for Hessian-vector products. The inner solve
/// stops at relative residual `eta_k = min(forcing_cap, sqrt(‖g‖))`, which
/// gives superlinear local convergence, or on negative curvature. When the
/// inner solve yields no usable descent direction, the steepest-descent
/// direction is used instead.
///
/// Returns when `‖∇f(x)‖ <= tolerance`. Running out of outer iterations is an
/// [`OptimError::IterationBoundExceeded`] error; line-search failures are
/// propagated.
pub fn inexact_newton<F, O, H>(
    obj: &O,
    hvp: &H,
    x0: &[F],
    config: &InexactNewtonConfig<F>,
    diag: &mut dyn Diagnostics,
) -> Result<OptimResult<F>, OptimError>
where
    F: Float,
    O: Objective<F> + ?Sized,
    H: DirectionalHessian<F, O>,
{
    config.validate()?;
    let n = x0.len();
    OptimError::check_dim(obj.dim(), n)?;

    let eps = config.convergence.tolerance;
    let max_iter = config.convergence.max_iter;
    let max_cg = if config.max_cg_iter == 0 {
        10 * n
    } else {
        config.max_cg_iter
    };
    emit!(
        diag,
        Level::INFO,
        "inexact newton-cg: n = {}, eps = {:e}",
        n,
        to_f64(eps)
    );

    let mut x = x0.to_vec();
    let (mut value, mut grad) = obj.eval_grad(&x);
    let mut func_evals = 1;
    let mut grad_evals = 1;
    let mut iterations = 0;

    loop {
        let grad_norm = norm(&grad);
        if grad_norm <= eps {
            emit!(
                diag,
                Level::INFO,
                "inexact newton-cg terminated after {} steps with ‖g‖ = {:e}",
                iterations,
                to_f64(grad_norm)
            );
            return Ok(OptimResult {
                x,
                value,
                gradient: grad,
                stationarity: grad_norm,
                iterations,
                func_evals,
                grad_evals,
                termination: TerminationReason::Stationary,
            });
        }
        if iterations >= max_iter {
            return Err(OptimError::IterationBoundExceeded {
                stage: Stage::InexactNewton,
                limit: max_iter,
            });
        }

        let eta = config.forcing_cap.min(grad_norm.sqrt()) * grad_norm;
        let (displacement, products, stop) =
            truncated_cg(obj, hvp, &x, &grad, eta, eps, config, max_cg);
        grad_evals += products * hvp.gradient_evals();

        let usable = !(norm(&displacement) < config.collapse_tol)
            && dot(&grad, &displacement) < F::zero();
        let direction = if usable {
            displacement
        } else {
            emit!(
                diag,
                Level::DEBUG,
                "inexact newton-cg step {}: inner solve stopped ({:?}) without descent, using -g",
                iterations,
                stop
            );
            neg(&grad)
        };

        let ls = wolfe_powell(
            obj,
            &x,
            &direction,
            value,
            &grad,
            &config.line_search,
            diag,
        )?;
        func_evals += ls.func_evals;
        grad_evals += ls.grad_evals;

        x = add_scaled(&x, ls.step, &direction);
        let (f_new, g_new) = obj.eval_grad(&x);
        value = f_new;
        grad = g_new;
        func_evals += 1;
        grad_evals += 1;
        iterations += 1;
        emit!(
            diag,
            Level::DEBUG,
            "inexact newton-cg iter {}: f = {:e}, ‖g‖ = {:e}, t = {:e}, {} cg steps ({:?})",
            iterations,
            to_f64(value),
            to_f64(norm(&grad)),
            to_f64(ls.step),
            products,
            stop
        );
    }
}
