//! Capability traits and numeric collaborators for second-order descent.
//!
//! - [`Objective`] / [`TwiceDifferentiable`]: smooth scalar objectives
//! - [`Model`]: residual/Jacobian pairs for nonlinear least squares
//! - [`Projection`]: feasible-set projections ([`BoxProjection`], [`Unconstrained`])
//! - [`Preconditioner`]: approximate inverses for conjugate gradients
//! - [`DirectionalHessian`]: Hessian-vector products, exact or finite-difference
//!
//! The solvers themselves live in the `newtonic-optim` crate.

pub mod dense;
pub mod error;
pub mod hvp;
pub mod objective;
pub mod preconditioner;
pub mod projection;

pub use error::ProblemError;
pub use hvp::{CentralDifference, DirectionalHessian, ExactHessian, FiniteDifference};
pub use objective::{Model, Objective, TwiceDifferentiable};
pub use preconditioner::{CholeskyFactor, Identity, IncompleteCholesky, Jacobi, Preconditioner};
pub use projection::{BoxProjection, Projection, Unconstrained};
