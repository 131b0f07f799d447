//! Direct projection estimator (D-LEARNER).
//!
//! Projects a fully observed target onto the leading singular subspaces of
//! the source: `Θ̂ = U_r U_rᵗ Y_t V_r V_rᵗ`. No iteration is involved.

use crate::subspace::SourceSubspace;
use learner_core::{
    error::{LearnerError, Result},
    matrix::ensure_complete,
    types::{DMatrix, Scalar},
};
use log::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output of the direct projection estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectionResult<T: Scalar> {
    /// Projected target
    pub estimate: DMatrix<T>,
    /// Working rank `r_use`
    pub rank: usize,
}

/// Direct projection of the target onto the source's singular subspaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectProjection;

impl DirectProjection {
    /// Creates the estimator.
    pub fn new() -> Self {
        Self
    }

    /// Projects `target` at the requested rank.
    ///
    /// Both matrices must share their shape and hold no missing values.
    pub fn estimate<T: Scalar>(
        &self,
        source: &DMatrix<T>,
        target: &DMatrix<T>,
        rank: usize,
    ) -> Result<ProjectionResult<T>> {
        if source.shape() != target.shape() {
            return Err(LearnerError::invalid_input(format!(
                "source and target must have the same dimensions: source is {}x{}, target is {}x{}",
                source.nrows(),
                source.ncols(),
                target.nrows(),
                target.ncols()
            )));
        }
        ensure_complete(source, "source")?;
        ensure_complete(target, "target")?;

        let subspace = SourceSubspace::from_source(source, rank)?;
        let estimate = subspace.project(target);
        info!("direct projection at rank {}", subspace.rank());
        Ok(ProjectionResult {
            estimate,
            rank: subspace.rank(),
        })
    }
}
