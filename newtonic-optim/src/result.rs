use std::fmt;

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimResult<F> {
    /// Solution point.
    pub x: Vec<F>,
    /// Objective value at the solution (`Σ r_i²` for least squares).
    pub value: F,
    /// Gradient at the solution (`J^T r` for least squares).
    pub gradient: Vec<F>,
    /// Stationarity measure the solver tested against its tolerance.
    pub stationarity: F,
    /// Number of counted outer iterations.
    pub iterations: usize,
    /// Total number of objective (or residual) evaluations.
    pub func_evals: usize,
    /// Total number of gradient (or Jacobian) evaluations.
    pub grad_evals: usize,
    /// Reason for termination.
    pub termination: TerminationReason,
}

/// Why a successful run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The stationarity measure fell below tolerance.
    Stationary,
    /// A soft iteration cap was reached; the iterate is the best available.
    SoftIterationLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Stationary => write!(f, "stationarity below tolerance"),
            TerminationReason::SoftIterationLimit => write!(f, "soft iteration limit reached"),
        }
    }
}

impl<F> OptimResult<F> {
    /// `true` when the run ended on its stationarity test.
    pub fn converged(&self) -> bool {
        self.termination == TerminationReason::Stationary
    }
}
