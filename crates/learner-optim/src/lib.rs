//! Learner Optimization - estimators for latent space transfer learning.
//!
//! This crate provides the numerical kernels that transfer low-rank structure
//! from a fully observed source matrix to a noisy, partially observed target.
//!
//! # Available Estimators
//!
//! - **MatrixFactorizer**: penalized gradient-descent factorization with a
//!   scale-normalized step, best-iterate tracking and dual stopping rules
//! - **CrossValidator**: parallel, reproducible grid search over the two
//!   penalty weights
//! - **DirectProjection**: one-shot projection onto the source's singular
//!   subspaces
//!
//! # Examples
//!
//! ```rust
//! use learner_core::matrix::PartialMatrix;
//! use learner_optim::{CrossValidationConfig, CrossValidator};
//! use nalgebra::DMatrix;
//!
//! let source = DMatrix::from_fn(6, 5, |i, j| ((i + 1) * (j + 1)) as f64);
//! let target = PartialMatrix::fully_observed(source.map(|v| v + 0.1));
//!
//! let config = CrossValidationConfig::new(vec![0.0, 1.0], vec![0.0, 1.0], 0.01)
//!     .with_n_folds(2);
//! let result = CrossValidator::new(config).run(&source, &target, 1).unwrap();
//! assert_eq!(result.mse_grid.shape(), (2, 2));
//! ```

pub mod convergence;
pub mod cross_validation;
pub mod factorizer;
pub mod objective;
pub mod observer;
pub mod projection;
pub mod state;
pub mod subspace;

// Re-export main estimators for convenience
pub use convergence::{ConvergenceStatus, StoppingRule};
pub use cross_validation::{
    select_minimum, CrossValidationConfig, CrossValidationResult, CrossValidator, DEFAULT_N_CORES,
    DEFAULT_N_FOLDS,
};
pub use factorizer::{FactorizationResult, FactorizerConfig, MatrixFactorizer};
pub use objective::TransferObjective;
pub use observer::{FitObserver, IterationInfo, NoOpObserver, RecordingObserver};
pub use projection::{DirectProjection, ProjectionResult};
pub use state::BestIterate;
pub use subspace::{FactorPair, SourceSubspace};
