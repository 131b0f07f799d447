//! Public output records.
//!
//! Each record is assembled from the matching estimator result and exposes
//! the field names of the public interface.

use learner_core::types::{DMatrix, Scalar};
use learner_optim::{ConvergenceStatus, CrossValidationResult, FactorizationResult, ProjectionResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a single LEARNER fit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LearnerFit<T: Scalar> {
    /// Estimate of the target's low-rank signal
    pub estimate: DMatrix<T>,

    /// Objective after every completed iteration
    pub objective_trajectory: Vec<T>,

    /// Why the descent stopped
    pub convergence_status: ConvergenceStatus,

    /// Rank actually used
    pub rank_used: usize,

    /// Objective of the returned estimate
    pub best_objective: T,
}

impl<T: Scalar> From<FactorizationResult<T>> for LearnerFit<T> {
    fn from(result: FactorizationResult<T>) -> Self {
        Self {
            estimate: result.estimate,
            objective_trajectory: result.objective_values,
            convergence_status: result.status,
            rank_used: result.rank,
            best_objective: result.best_objective,
        }
    }
}

/// Result of a cross-validated grid search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrossValidationFit<T: Scalar> {
    /// Selected drift penalty weight
    pub best_lambda1: T,

    /// Selected imbalance penalty weight
    pub best_lambda2: T,

    /// Held-out squared error of every grid cell
    pub mse_grid: DMatrix<T>,

    /// Rank actually used
    pub rank_used: usize,

    /// Grid coordinates of the selected cell
    pub best_index: (usize, usize),

    /// Entries held out by each fold
    pub fold_size: usize,

    /// Entries assigned to no fold
    pub unassigned: usize,
}

impl<T: Scalar> From<CrossValidationResult<T>> for CrossValidationFit<T> {
    fn from(result: CrossValidationResult<T>) -> Self {
        Self {
            best_lambda1: result.best_lambda1,
            best_lambda2: result.best_lambda2,
            mse_grid: result.mse_grid,
            rank_used: result.rank,
            best_index: result.best_index,
            fold_size: result.fold_size,
            unassigned: result.unassigned,
        }
    }
}

/// Result of the direct projection estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DirectProjectionFit<T: Scalar> {
    /// Projected target
    pub estimate: DMatrix<T>,

    /// Rank actually used
    pub rank_used: usize,
}

impl<T: Scalar> From<ProjectionResult<T>> for DirectProjectionFit<T> {
    fn from(result: ProjectionResult<T>) -> Self {
        Self {
            estimate: result.estimate,
            rank_used: result.rank,
        }
    }
}
