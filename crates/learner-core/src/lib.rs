//! Core types for latent space transfer learning.
//!
//! This crate provides the foundations shared by the factorization kernel
//! and the cross-validation driver: a scalar abstraction, partially observed
//! matrices, error types, control options, rank estimation and the
//! reproducible fold partition used to hold out entries.
//!
//! # Modules
//!
//! - [`config`]: Stopping controls and range checks
//! - [`error`]: Error type and result alias
//! - [`folds`]: Seeded partition of entries into cross-validation folds
//! - [`matrix`]: Matrices with an explicit observation mask
//! - [`parallel`]: Worker pool construction and the parallelism query
//! - [`rank`]: Rank estimation capability and resolution rules
//! - [`types`]: Scalar trait and matrix aliases

pub mod config;
pub mod error;
pub mod folds;
pub mod matrix;
pub mod parallel;
pub mod rank;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{LearnerError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use learner_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ControlConfig, DEFAULT_MAX_ITER};
    pub use crate::error::{LearnerError, Result};
    pub use crate::folds::{FoldPartition, DEFAULT_SEED};
    pub use crate::matrix::{ensure_compatible, ensure_complete, PartialMatrix};
    pub use crate::parallel::max_parallelism;
    pub use crate::rank::{
        default_max_rank, resolve_rank, FixedRank, HardThresholdRankEstimator, RankEstimator,
    };
    pub use crate::types::{linear_to_coords, DMatrix, DVector, Mask, Scalar};
}
