use num_traits::Float;

use newtonic::dense::{add_scaled, dot, gram, neg, norm, transpose_mat_vec};
use newtonic::{IncompleteCholesky, Model, Preconditioner};

use super::to_f64;
use crate::convergence::ConvergenceParams;
use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::{OptimError, Stage};
use crate::linalg::{pcg_solve, PcgConfig};
use crate::result::{OptimResult, TerminationReason};

/// Damping parameter of Levenberg-Marquardt.
///
/// Starts at `alpha0`, is multiplied by `beta` on every rejected step and
/// reset to `alpha0` on every accepted one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damping<F> {
    alpha: F,
    alpha0: F,
    beta: F,
}

impl<F: Float> Damping<F> {
    /// Requires `alpha0 > 0` and `beta > 1`.
    pub fn new(alpha0: F, beta: F) -> Result<Self, OptimError> {
        if !(alpha0 > F::zero()) {
            return Err(OptimError::InvalidParameter {
                name: "alpha0",
                reason: "must be positive",
            });
        }
        if !(beta > F::one()) {
            return Err(OptimError::InvalidParameter {
                name: "beta",
                reason: "must be greater than 1",
            });
        }
        Ok(Damping {
            alpha: alpha0,
            alpha0,
            beta,
        })
    }

    /// Current damping `alpha`.
    pub fn alpha(&self) -> F {
        self.alpha
    }

    pub fn accept(&mut self) {
        self.alpha = self.alpha0;
    }

    pub fn reject(&mut self) {
        self.alpha = self.alpha * self.beta;
    }
}

/// Configuration for Levenberg-Marquardt.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevenbergMarquardtConfig<F, P = IncompleteCholesky<F>> {
    /// Tolerance on `‖J^T r‖` and cap on accepted steps (defaults: 1e-4, 200).
    pub convergence: ConvergenceParams<F>,
    /// Initial damping (default: 1e-3).
    pub alpha0: F,
    /// Damping growth factor on rejection (default: 100).
    pub beta: F,
    /// Cap on consecutive rejected steps (default: 50).
    pub max_rejections: usize,
    /// Solve of the damped normal equations.
    pub pcg: PcgConfig<F>,
    /// Preconditioner for the damped normal equations.
    pub preconditioner: P,
}

impl Default for LevenbergMarquardtConfig<f64> {
    fn default() -> Self {
        LevenbergMarquardtConfig {
            convergence: ConvergenceParams {
                max_iter: 200,
                tolerance: 1e-4,
            },
            alpha0: 1e-3,
            beta: 100.0,
            max_rejections: 50,
            pcg: PcgConfig::default(),
            preconditioner: IncompleteCholesky::default(),
        }
    }
}

impl Default for LevenbergMarquardtConfig<f32> {
    fn default() -> Self {
        LevenbergMarquardtConfig {
            convergence: ConvergenceParams {
                max_iter: 200,
                tolerance: 1e-3,
            },
            alpha0: 1e-3,
            beta: 100.0,
            max_rejections: 20,
            pcg: PcgConfig::default(),
            preconditioner: IncompleteCholesky::default(),
        }
    }
}

/// Levenberg-Marquardt for `min Σ r_i(p)²`.
///
/// Each trial step solves `(J^T J + alpha I) d = -J^T r` with [`pcg_solve`].
/// A step is accepted only if it strictly decreases `‖r‖²`; see [`Damping`]
/// for how `alpha` reacts. Only accepted steps count as iterations.
///
/// Returns when `‖J^T r‖ <= tolerance`. Exceeding the accepted-step cap or
/// `max_rejections` consecutive rejections is an
/// [`OptimError::IterationBoundExceeded`] error with stage
/// [`Stage::LevenbergMarquardt`] or [`Stage::Damping`].
pub fn levenberg_marquardt<F, M, P>(
    model: &M,
    p0: &[F],
    config: &LevenbergMarquardtConfig<F, P>,
    diag: &mut dyn Diagnostics,
) -> Result<OptimResult<F>, OptimError>
where
    F: Float,
    M: Model<F> + ?Sized,
    P: Preconditioner<F>,
{
    config.convergence.validate()?;
    config.pcg.validate()?;
    let mut damping = Damping::new(config.alpha0, config.beta)?;
    let n = p0.len();
    OptimError::check_dim(model.dim(), n)?;

    let eps = config.convergence.tolerance;
    let max_iter = config.convergence.max_iter;
    emit!(
        diag,
        Level::INFO,
        "levenberg-marquardt: n = {}, eps = {:e}",
        n,
        to_f64(eps)
    );

    let mut p = p0.to_vec();
    let mut r = model.residual(&p);
    let mut jac = model.jacobian(&p);
    OptimError::check_dim(r.len(), jac.len())?;
    let mut func_evals = 1;
    let mut grad_evals = 1;
    let mut accepted = 0;
    let mut rejections = 0;

    loop {
        let grad = transpose_mat_vec(&jac, &r);
        let grad_norm = norm(&grad);
        if grad_norm <= eps {
            emit!(
                diag,
                Level::INFO,
                "levenberg-marquardt terminated after {} steps with ‖J^T r‖ = {:e}",
                accepted,
                to_f64(grad_norm)
            );
            return Ok(OptimResult {
                value: dot(&r, &r),
                x: p,
                gradient: grad,
                stationarity: grad_norm,
                iterations: accepted,
                func_evals,
                grad_evals,
                termination: TerminationReason::Stationary,
            });
        }
        if accepted >= max_iter {
            return Err(OptimError::IterationBoundExceeded {
                stage: Stage::LevenbergMarquardt,
                limit: max_iter,
            });
        }

        let mut a = gram(&jac);
        for (i, row) in a.iter_mut().enumerate() {
            row[i] = row[i] + damping.alpha();
        }
        let step = pcg_solve(&a, &neg(&grad), &config.preconditioner, &config.pcg, diag)?;
        if !step.converged() {
            emit!(
                diag,
                Level::WARN,
                "levenberg-marquardt: using inexact step ({:?}, residual {:e})",
                step.termination,
                to_f64(step.residual_norm)
            );
        }

        let trial = add_scaled(&p, F::one(), &step.y);
        let r_trial = model.residual(&trial);
        func_evals += 1;
        let sq = dot(&r, &r);
        let sq_trial = dot(&r_trial, &r_trial);

        if sq_trial < sq {
            p = trial;
            r = r_trial;
            jac = model.jacobian(&p);
            grad_evals += 1;
            damping.accept();
            accepted += 1;
            rejections = 0;
            emit!(
                diag,
                Level::DEBUG,
                "levenberg-marquardt iter {}: ‖r‖² = {:e}",
                accepted,
                to_f64(sq_trial)
            );
        } else {
            damping.reject();
            rejections += 1;
            emit!(
                diag,
                Level::DEBUG,
                "levenberg-marquardt: rejected step ({} in a row), alpha = {:e}",
                rejections,
                to_f64(damping.alpha())
            );
            if rejections >= config.max_rejections {
                return Err(OptimError::IterationBoundExceeded {
                    stage: Stage::Damping,
                    limit: config.max_rejections,
                });
            }
        }
    }
}
