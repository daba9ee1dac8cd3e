//! Second-order descent drivers built on the `newtonic` capability traits.
//!
//! - [`newton`]: Newton's method with full steps and an exact Hessian
//! - [`inexact_newton`]: truncated Newton-CG with Hessian-vector products
//! - [`projected_bfgs`]: BFGS on a feasible set with active-set restriction
//! - [`levenberg_marquardt`]: damped Gauss-Newton for nonlinear least squares
//!
//! All drivers share [`pcg_solve`] and the line searches in [`line_search`],
//! report through an injected [`Diagnostics`] receiver, and return
//! [`OptimError`] instead of panicking on numerical trouble.

pub mod convergence;
pub mod diagnostics;
pub mod error;
pub mod line_search;
pub mod linalg;
pub mod result;
pub mod solvers;

pub use convergence::ConvergenceParams;
pub use diagnostics::{Callback, Diagnostics, Level, Recorder, Silent, Tracing};
pub use error::{OptimError, Stage};
pub use line_search::{projected_search, wolfe_powell, LineSearchResult, WolfePowellParams};
pub use linalg::{pcg_solve, PcgConfig, PcgSolution, PcgTermination};
pub use result::{OptimResult, TerminationReason};
pub use solvers::inexact_newton::{inexact_newton, InexactNewtonConfig};
pub use solvers::levenberg_marquardt::{levenberg_marquardt, Damping, LevenbergMarquardtConfig};
pub use solvers::newton::{newton, NewtonConfig};
pub use solvers::projected_bfgs::{projected_bfgs, ProjectedBfgsConfig};
