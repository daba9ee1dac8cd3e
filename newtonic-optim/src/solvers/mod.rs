//! Descent drivers.
//!
//! Every driver takes its problem by shared reference, a configuration struct
//! with `Default` impls for `f64` and `f32`, and a `&mut dyn Diagnostics`
//! receiver. Configuration is validated before the first evaluation.

pub mod inexact_newton;
pub mod levenberg_marquardt;
pub mod newton;
pub mod projected_bfgs;

use num_traits::Float;

/// Lossy conversion for diagnostics.
pub(crate) fn to_f64<F: Float>(v: F) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}
