use num_traits::Float;

use crate::error::OptimError;

/// Parameters controlling an outer iteration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceParams<F> {
    /// Iteration cap. Exceeding it is fatal except where a solver documents a
    /// soft cap.
    pub max_iter: usize,
    /// Stationarity tolerance `eps`: stop once the solver's stationarity
    /// measure is `<= tolerance`.
    pub tolerance: F,
}

impl Default for ConvergenceParams<f64> {
    fn default() -> Self {
        ConvergenceParams {
            max_iter: 30,
            tolerance: 1e-3,
        }
    }
}

impl Default for ConvergenceParams<f32> {
    fn default() -> Self {
        ConvergenceParams {
            max_iter: 30,
            tolerance: 1e-3,
        }
    }
}

impl<F: Float> ConvergenceParams<F> {
    /// Reject a non-positive (or NaN) tolerance.
    pub fn validate(&self) -> Result<(), OptimError> {
        if !(self.tolerance > F::zero()) {
            return Err(OptimError::InvalidParameter {
                name: "eps",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    /// Same parameters with a different iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_tolerance() {
        let params = ConvergenceParams {
            tolerance: 0.0,
            ..ConvergenceParams::default()
        };
        assert!(params.validate().unwrap_err().is_configuration());
        let params = ConvergenceParams {
            tolerance: f64::NAN,
            ..ConvergenceParams::default()
        };
        assert!(params.validate().is_err());
        assert!(ConvergenceParams::<f64>::default().validate().is_ok());
    }
}
