//! Step-length selection.
//!
//! Both searches share one bracket-and-bisect scheme over a pair of
//! acceptance tests: a sufficient-decrease test (W1) and a curvature test
//! (W2). [`wolfe_powell`] applies it on `R^n`, [`projected_search`] on a
//! projected path `t -> P(x + t d)`.

mod projected;
mod wolfe_powell;

use num_traits::Float;

use newtonic::dense::constant;

use crate::diagnostics::{emit, Diagnostics, Level};
use crate::error::{OptimError, Stage};

pub use projected::projected_search;
pub use wolfe_powell::wolfe_powell;

/// Parameters for the Wolfe-Powell acceptance tests.
///
/// Requires `0 < sigma < 1/2` and `sigma < rho < 1`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WolfePowellParams<F> {
    /// Sufficient decrease parameter.
    pub sigma: F,
    /// Curvature parameter.
    pub rho: F,
    /// Cap on each of the backtracking, expansion and bisection phases
    /// (default: 30).
    pub max_iter: usize,
}

impl Default for WolfePowellParams<f64> {
    /// `sigma = 1e-3`, `rho = 1e-2`.
    fn default() -> Self {
        WolfePowellParams {
            sigma: 1e-3,
            rho: 1e-2,
            max_iter: 30,
        }
    }
}

impl Default for WolfePowellParams<f32> {
    fn default() -> Self {
        WolfePowellParams {
            sigma: 1e-3,
            rho: 1e-2,
            max_iter: 30,
        }
    }
}

impl<F: Float> WolfePowellParams<F> {
    /// Defaults for [`projected_search`]: `sigma = 1e-4`, `rho = 1e-2`.
    pub fn projected() -> Self {
        WolfePowellParams {
            sigma: constant(1e-4),
            rho: constant(1e-2),
            max_iter: 30,
        }
    }

    pub fn validate(&self) -> Result<(), OptimError> {
        let half = constant::<F>(0.5);
        if !(self.sigma > F::zero() && self.sigma < half) {
            return Err(OptimError::InvalidParameter {
                name: "sigma",
                reason: "must lie in (0, 1/2)",
            });
        }
        if !(self.rho > self.sigma && self.rho < F::one()) {
            return Err(OptimError::InvalidParameter {
                name: "rho",
                reason: "must lie in (sigma, 1)",
            });
        }
        Ok(())
    }
}

/// Result of a successful line search.
#[derive(Debug, Clone)]
pub struct LineSearchResult<F> {
    /// Accepted step length `t > 0`.
    pub step: F,
    /// Objective evaluations used.
    pub func_evals: usize,
    /// Gradient evaluations used.
    pub grad_evals: usize,
}

/// Acceptance tests along one search path.
pub(crate) trait StepTests<F> {
    /// Sufficient decrease (W1) at step `t`.
    fn sufficient_decrease(&mut self, t: F) -> bool;

    /// Curvature condition (W2) at step `t`.
    fn curvature(&mut self, t: F) -> bool;

    /// Whether expansion may continue past `t`.
    fn may_expand(&mut self, _t: F) -> bool {
        true
    }
}

/// Find `t > 0` with W1 and W2 by bracketing from `t = 1` and bisecting.
///
/// If W1 fails at 1, `t` is halved until it holds, giving `[t, 2t]`. If W1
/// holds but W2 fails, `t` is doubled while W1 (and `may_expand`) hold, giving
/// `[t/2, t]`. The bracket is then bisected, keeping W1 at the lower end,
/// until W2 holds at the lower end.
pub(crate) fn bracket_and_bisect<F: Float, T: StepTests<F>>(
    tests: &mut T,
    max_iter: usize,
    diag: &mut dyn Diagnostics,
) -> Result<F, OptimError> {
    let two = constant::<F>(2.0);
    let half = constant::<F>(0.5);
    let mut t = F::one();

    let (mut lower, mut upper) = if !tests.sufficient_decrease(t) {
        t = t * half;
        let mut halvings = 0;
        while !tests.sufficient_decrease(t) {
            halvings += 1;
            if halvings >= max_iter {
                return Err(OptimError::IterationBoundExceeded {
                    stage: Stage::Backtracking,
                    limit: max_iter,
                });
            }
            t = t * half;
        }
        (t, two * t)
    } else if tests.curvature(t) {
        return Ok(t);
    } else {
        t = two * t;
        let mut doublings = 0;
        while tests.sufficient_decrease(t) && tests.may_expand(t) {
            doublings += 1;
            if doublings >= max_iter {
                return Err(OptimError::IterationBoundExceeded {
                    stage: Stage::Expansion,
                    limit: max_iter,
                });
            }
            t = two * t;
        }
        (t * half, t)
    };
    emit!(
        diag,
        Level::TRACE,
        "line search bracket [{:e}, {:e}]",
        lower.to_f64().unwrap_or(f64::NAN),
        upper.to_f64().unwrap_or(f64::NAN)
    );

    let mut bisections = 0;
    while !tests.curvature(lower) {
        if bisections >= max_iter {
            return Err(OptimError::IterationBoundExceeded {
                stage: Stage::Bisection,
                limit: max_iter,
            });
        }
        let mid = (lower + upper) * half;
        if tests.sufficient_decrease(mid) {
            lower = mid;
        } else {
            upper = mid;
        }
        bisections += 1;
    }
    Ok(lower)
}
