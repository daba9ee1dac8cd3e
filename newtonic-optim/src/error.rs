//! Solver errors.

use std::fmt;

use newtonic::ProblemError;
use thiserror::Error;

/// Bounded loop that ran out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Preconditioned conjugate-gradient solve.
    ConjugateGradient,
    /// Line search halving `t` until sufficient decrease holds.
    Backtracking,
    /// Line search doubling `t` while sufficient decrease holds.
    Expansion,
    /// Line search bisecting the bracket until the curvature condition holds.
    Bisection,
    /// Outer loop of Newton descent.
    Newton,
    /// Outer loop of inexact Newton-CG.
    InexactNewton,
    /// Accepted steps of Levenberg-Marquardt.
    LevenbergMarquardt,
    /// Consecutive rejected Levenberg-Marquardt steps.
    Damping,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ConjugateGradient => write!(f, "conjugate-gradient solve"),
            Stage::Backtracking => write!(f, "line-search backtracking"),
            Stage::Expansion => write!(f, "line-search expansion"),
            Stage::Bisection => write!(f, "line-search bisection"),
            Stage::Newton => write!(f, "Newton descent"),
            Stage::InexactNewton => write!(f, "inexact Newton-CG"),
            Stage::LevenbergMarquardt => write!(f, "Levenberg-Marquardt"),
            Stage::Damping => write!(f, "Levenberg-Marquardt damping"),
        }
    }
}

/// Errors returned by the solvers.
///
/// [`InvalidParameter`](OptimError::InvalidParameter) and
/// [`DimensionMismatch`](OptimError::DimensionMismatch) are reported before any
/// iteration. [`IterationBoundExceeded`](OptimError::IterationBoundExceeded)
/// signals ill-conditioning or a pathological problem; callers may retry with
/// relaxed tolerances or larger caps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimError {
    /// A configuration constant is outside its admissible range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },

    /// `∇f(x)^T d >= 0` at the entry of a line search.
    #[error("not a descent direction: gradient^T d = {slope:e}")]
    NotADescentDirection { slope: f64 },

    /// A bounded loop exceeded its cap.
    #[error("{stage} exceeded its bound of {limit} iterations")]
    IterationBoundExceeded { stage: Stage, limit: usize },

    /// Projected search entered at a point that cannot move along `d`.
    #[error("projected line search entered at a point stationary along the search direction")]
    StationaryPointPrecondition,

    /// Input vectors or matrices disagree in size.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Invalid problem collaborator.
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

impl OptimError {
    /// `true` for errors caused by the configuration or inputs rather than by
    /// the iteration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OptimError::InvalidParameter { .. }
                | OptimError::DimensionMismatch { .. }
                | OptimError::Problem(_)
        )
    }

    /// `true` when a bounded loop ran out of iterations.
    pub fn is_bound_exceeded(&self) -> bool {
        matches!(self, OptimError::IterationBoundExceeded { .. })
    }

    pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), OptimError> {
        if expected == found {
            Ok(())
        } else {
            Err(OptimError::DimensionMismatch { expected, found })
        }
    }
}
