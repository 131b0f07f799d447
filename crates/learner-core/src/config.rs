//! Control options shared by single fits and cross-validation.

use crate::error::{LearnerError, Result};
use crate::types::Scalar;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default iteration budget of a single fit.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Stopping controls for the gradient descent loop.
///
/// Mirrors the recognized options of the public interface: `max_iter`,
/// `threshold` and `max_value`. Unset options keep their defaults
/// (100, 0.001 and 10 respectively).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlConfig<T> {
    /// Maximum number of gradient steps
    pub max_iter: usize,

    /// Objective change below which the fit has converged
    pub threshold: T,

    /// Ratio between consecutive objectives above which the fit has diverged
    pub max_value: T,
}

impl<T: Scalar> Default for ControlConfig<T> {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            threshold: T::DEFAULT_THRESHOLD,
            max_value: T::DEFAULT_MAX_VALUE,
        }
    }
}

impl<T: Scalar> ControlConfig<T> {
    /// Creates a control configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence threshold.
    pub fn with_threshold(mut self, threshold: T) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the divergence ratio.
    pub fn with_max_value(mut self, max_value: T) -> Self {
        self.max_value = max_value;
        self
    }

    /// Checks that every option lies in its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(LearnerError::invalid_input("max_iter must be at least 1"));
        }
        ensure_positive(self.threshold, "threshold")?;
        ensure_positive(self.max_value, "max_value")?;
        Ok(())
    }
}

/// Rejects values that are not finite and strictly positive.
pub fn ensure_positive<T: Scalar>(value: T, name: &str) -> Result<()> {
    if !value.is_finite() || value <= T::zero() {
        return Err(LearnerError::invalid_input(format!(
            "{name} must be finite and positive, got {value}"
        )));
    }
    Ok(())
}

/// Rejects values that are not finite and non-negative.
pub fn ensure_non_negative<T: Scalar>(value: T, name: &str) -> Result<()> {
    if !value.is_finite() || value < T::zero() {
        return Err(LearnerError::invalid_input(format!(
            "{name} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}
