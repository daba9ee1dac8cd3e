use num_traits::Float;

use newtonic::dense::{axpy, neg, norm};
use newtonic::{IncompleteCholesky, Preconditioner, TwiceDifferentiable};

use super::to_f64;
use crate::convergence::ConvergenceParams;
use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::{OptimError, Stage};
use crate::linalg::{pcg_solve, PcgConfig};
use crate::result::{OptimResult, TerminationReason};

/// Configuration for Newton descent.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonConfig<F, P = IncompleteCholesky<F>> {
    /// Gradient-norm tolerance and iteration cap (defaults: 1e-3, 30).
    pub convergence: ConvergenceParams<F>,
    /// Inner solve of the Newton system.
    pub pcg: PcgConfig<F>,
    /// Preconditioner for the Newton system.
    pub preconditioner: P,
}

impl Default for NewtonConfig<f64> {
    fn default() -> Self {
        NewtonConfig {
            convergence: ConvergenceParams::default(),
            pcg: PcgConfig::default(),
            preconditioner: IncompleteCholesky::default(),
        }
    }
}

impl Default for NewtonConfig<f32> {
    fn default() -> Self {
        NewtonConfig {
            convergence: ConvergenceParams::default(),
            pcg: PcgConfig::default(),
            preconditioner: IncompleteCholesky::default(),
        }
    }
}

/// Newton's method with full steps.
///
/// Each iteration solves `H(x) d = -∇f(x)` with [`pcg_solve`] and moves to
/// `x + d`. There is no line search, so `H` should be positive definite along
/// the path. An inner solve that stops short is used as is and reported at
/// WARN level.
///
/// Returns when `‖∇f(x)‖ <= tolerance`; running out of iterations is an
/// [`OptimError::IterationBoundExceeded`] error.
pub fn newton<F, O, P>(
    obj: &O,
    x0: &[F],
    config: &NewtonConfig<F, P>,
    diag: &mut dyn Diagnostics,
) -> Result<OptimResult<F>, OptimError>
where
    F: Float,
    O: TwiceDifferentiable<F> + ?Sized,
    P: Preconditioner<F>,
{
    config.convergence.validate()?;
    config.pcg.validate()?;
    OptimError::check_dim(obj.dim(), x0.len())?;

    let eps = config.convergence.tolerance;
    let max_iter = config.convergence.max_iter;
    emit!(diag, Level::INFO, "newton: n = {}, eps = {:e}", x0.len(), to_f64(eps));

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
                "newton terminated after {} steps with ‖g‖ = {:e}",
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
                stage: Stage::Newton,
                limit: max_iter,
            });
        }

        let hess = obj.hessian(&x);
        let step = pcg_solve(&hess, &neg(&grad), &config.preconditioner, &config.pcg, diag)?;
        if !step.converged() {
            emit!(
                diag,
                Level::WARN,
                "newton step {}: using inexact Newton direction ({:?}, residual {:e})",
                iterations,
                step.termination,
                to_f64(step.residual_norm)
            );
        }
        axpy(&mut x, F::one(), &step.y);

        let (f_new, g_new) = obj.eval_grad(&x);
        value = f_new;
        grad = g_new;
        func_evals += 1;
        grad_evals += 1;
        iterations += 1;
        emit!(
            diag,
            Level::DEBUG,
            "newton iter {}: f = {:e}, ‖g‖ = {:e}",
            iterations,
            to_f64(value),
            to_f64(norm(&grad))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Recorder, Silent};
    use approx::assert_relative_eq;
    use newtonic::Objective;

    /// f(x) = 0.5 x^T A x with a diagonal A.
    struct Diagonal(Vec<f64>);

    impl Objective<f64> for Diagonal {
        fn dim(&self) -> usize {
            self.0.len()
        }

        fn value(&self, x: &[f64]) -> f64 {
            0.5 * x.iter().zip(&self.0).map(|(xi, ai)| ai * xi * xi).sum::<f64>()
        }

        fn gradient(&self, x: &[f64]) -> Vec<f64> {
            x.iter().zip(&self.0).map(|(xi, ai)| ai * xi).collect()
        }
    }

    impl TwiceDifferentiable<f64> for Diagonal {
        fn hessian(&self, _x: &[f64]) -> Vec<Vec<f64>> {
            let n = self.0.len();
            (0..n)
                .map(|i| {
                    let mut row = vec![0.0; n];
                    row[i] = self.0[i];
                    row
                })
                .collect()
        }
    }

    fn config() -> NewtonConfig<f64> {
        NewtonConfig::default()
    }

    #[test]
    fn quadratic_in_one_step() {
        let obj = Diagonal(vec![1.0, 4.0, 9.0]);
        let res = newton(&obj, &[1.0, -2.0, 3.0], &config(), &mut Silent).unwrap();
        assert!(res.converged());
        assert_eq!(res.iterations, 1);
        for xi in &res.x {
            assert_relative_eq!(*xi, 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn already_stationary_start() {
        let obj = Diagonal(vec![2.0, 2.0]);
        let res = newton(&obj, &[0.0, 0.0], &config(), &mut Silent).unwrap();
        assert_eq!(res.iterations, 0);
        assert_eq!(res.func_evals, 1);
    }

    #[test]
    fn rejects_non_positive_eps() {
        let mut config = config();
        config.convergence.tolerance = -1.0;
        let err = newton(&Diagonal(vec![1.0]), &[1.0], &config, &mut Silent).unwrap_err();
        assert_eq!(
            err,
            OptimError::InvalidParameter {
                name: "eps",
                reason: "must be positive"
            }
        );
    }

    #[test]
    fn rejects_wrong_start_dimension() {
        let err = newton(
            &Diagonal(vec![1.0, 1.0]),
            &[1.0],
            &config(),
            &mut Silent,
        )
        .unwrap_err();
        assert!(matches!(err, OptimError::DimensionMismatch { expected: 2, found: 1 }));
    }

    #[test]
    fn zero_iteration_cap_is_fatal() {
        let mut config = config();
        config.convergence.max_iter = 0;
        let err = newton(&Diagonal(vec![1.0]), &[1.0], &config, &mut Silent).unwrap_err();
        assert_eq!(
            err,
            OptimError::IterationBoundExceeded {
                stage: Stage::Newton,
                limit: 0
            }
        );
    }

    #[test]
    fn reports_start_and_termination() {
        let mut rec = Recorder::new(Level::INFO);
        newton(&Diagonal(vec![1.0]), &[5.0], &config(), &mut rec).unwrap();
        let infos: Vec<&str> = rec.messages_at(Level::INFO).collect();
        assert_eq!(infos.len(), 2);
        assert!(infos[1].starts_with("newton terminated after 1 steps"));
    }
}
