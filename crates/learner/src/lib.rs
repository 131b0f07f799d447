//! Latent space transfer learning for low-rank matrix estimation.
//!
//! Given a fully observed source matrix and a noisy, partially observed
//! target matrix of the same shape, this crate estimates the target's
//! low-rank signal by borrowing the source's singular subspaces.
//!
//! # Estimators
//!
//! - [`fit`]: LEARNER, a penalized gradient-descent factorization
//! - [`cross_validate`]: grid search over LEARNER's two penalty weights
//! - [`direct_projection`]: D-LEARNER, a one-shot subspace projection
//!
//! # Quick Start
//!
//! ```rust
//! use learner::prelude::*;
//! use nalgebra::DMatrix;
//!
//! let source = DMatrix::from_fn(12, 9, |i, j| ((i % 4) as f64 + 1.0) * ((j % 3) as f64 - 1.0));
//! let target = PartialMatrix::fully_observed(source.map(|v| 0.9 * v));
//!
//! let cv = learner::cross_validate(
//!     &source,
//!     &target,
//!     Some(2),
//!     &CrossValidationConfig::new(vec![0.0, 1.0], vec![0.0, 1.0], 0.01),
//! )
//! .unwrap();
//!
//! let fit = learner::fit(
//!     &source,
//!     &target,
//!     Some(cv.rank_used),
//!     &FactorizerConfig::new(cv.best_lambda1, cv.best_lambda2, 0.01),
//! )
//! .unwrap();
//! assert_eq!(fit.estimate.shape(), (12, 9));
//! ```

pub mod api;
pub mod records;

pub use api::{cross_validate, direct_projection, fit, Learner};
pub use learner_core::parallel::max_parallelism;
pub use records::{CrossValidationFit, DirectProjectionFit, LearnerFit};

// Re-export the component crates
pub use learner_core;
pub use learner_optim;

// Re-export nalgebra for convenience
pub use nalgebra;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::api::Learner;
    pub use crate::records::{CrossValidationFit, DirectProjectionFit, LearnerFit};
    pub use learner_core::prelude::*;
    pub use learner_optim::{
        ConvergenceStatus, CrossValidationConfig, FactorizerConfig, FitObserver, IterationInfo, NoOpObserver,
        RecordingObserver,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports() {
        let _learner = Learner::new();
        let _config = learner_optim::FactorizerConfig::<f64>::new(1.0, 1.0, 0.01);
        assert!(max_parallelism() >= 1);
    }
}
