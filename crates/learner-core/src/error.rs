//! Error types for latent space transfer learning.
//!
//! Every fallible operation in the workspace reports a [`LearnerError`].
//! Validation failures are detected before any numerical work starts;
//! divergence and iteration exhaustion are not errors but convergence
//! statuses attached to a successful result.

use thiserror::Error;

/// Errors that can occur while fitting or cross-validating a factorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnerError {
    /// Input rejected before any computation.
    ///
    /// Covers missing values in the source matrix, a rank below one,
    /// out-of-range hyperparameters and empty candidate lists.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of why the input was rejected
        reason: String,
    },

    /// Dimension mismatch between matrices.
    ///
    /// This error occurs when the source and target matrices (or a matrix and
    /// its observation mask) do not share the same shape.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Numerical failure inside a decomposition.
    #[error("Numerical failure: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// The worker pool for the grid search could not be created.
    #[error("Failed to build worker pool: {reason}")]
    ThreadPool {
        /// Message reported by the pool builder
        reason: String,
    },
}

impl LearnerError {
    /// Create an InvalidInput error with a custom reason.
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create a ThreadPool error from the builder's message.
    pub fn thread_pool<S: std::fmt::Display>(reason: S) -> Self {
        Self::ThreadPool {
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for the validation failures raised before computation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::DimensionMismatch { .. }
        )
    }
}

impl From<rayon::ThreadPoolBuildError> for LearnerError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::thread_pool(err)
    }
}

/// Result type alias for learner operations.
pub type Result<T> = std::result::Result<T, LearnerError>;
