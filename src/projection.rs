use num_traits::Float;

use crate::dense::constant;
use crate::error::ProblemError;

/// Projection onto a closed feasible set.
///
/// `project` must be idempotent: `project(project(x)) == project(x)`.
pub trait Projection<F: Float> {
    /// Map `x` to the closest feasible point.
    fn project(&self, x: &[F]) -> Vec<F>;

    /// Sorted indices of the coordinates of `x` that sit on a bound.
    fn active_set(&self, x: &[F]) -> Vec<usize>;
}

/// The whole of `R^n`: projection is the identity and no index is ever active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unconstrained;

impl<F: Float> Projection<F> for Unconstrained {
    fn project(&self, x: &[F]) -> Vec<F> {
        x.to_vec()
    }

    fn active_set(&self, _x: &[F]) -> Vec<usize> {
        Vec::new()
    }
}

/// Box `[lower, upper]` with componentwise bounds.
///
/// A coordinate is active when it lies within `tolerance` of either bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxProjection<F> {
    lower: Vec<F>,
    upper: Vec<F>,
    tolerance: F,
}

impl<F: Float> BoxProjection<F> {
    /// Create a box from bound vectors, with an active-set tolerance of `1e-6`.
    pub fn new(lower: Vec<F>, upper: Vec<F>) -> Result<Self, ProblemError> {
        if lower.len() != upper.len() {
            return Err(ProblemError::DimensionMismatch {
                expected: lower.len(),
                found: upper.len(),
            });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            // Negated comparison also rejects NaN bounds
            if !(lo <= hi) {
                return Err(ProblemError::InvalidBounds {
                    index,
                    lower: lo.to_f64().unwrap_or(f64::NAN),
                    upper: hi.to_f64().unwrap_or(f64::NAN),
                });
            }
        }
        Ok(BoxProjection {
            lower,
            upper,
            tolerance: constant(1e-6),
        })
    }

    /// Set the distance below which a coordinate counts as sitting on a bound.
    pub fn with_tolerance(mut self, tolerance: F) -> Result<Self, ProblemError> {
        if !(tolerance >= F::zero()) {
            return Err(ProblemError::InvalidParameter {
                name: "tolerance",
                reason: "must be non-negative",
            });
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Number of coordinates.
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[F] {
        &self.lower
    }

    pub fn upper(&self) -> &[F] {
        &self.upper
    }

    /// Returns `true` when every coordinate of `x` lies inside the box.
    pub fn contains(&self, x: &[F]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&xi, (&lo, &hi))| lo <= xi && xi <= hi)
    }
}

impl<F: Float> Projection<F> for BoxProjection<F> {
    fn project(&self, x: &[F]) -> Vec<F> {
        debug_assert_eq!(x.len(), self.dim());
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&xi, (&lo, &hi))| xi.max(lo).min(hi))
            .collect()
    }

    fn active_set(&self, x: &[F]) -> Vec<usize> {
        debug_assert_eq!(x.len(), self.dim());
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .enumerate()
            .filter(|(_, (&xi, (&lo, &hi)))| {
                xi - lo <= self.tolerance || hi - xi <= self.tolerance
            })
            .map(|(i, _)| i)
            .collect()
    }
}
