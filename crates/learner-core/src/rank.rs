//! Rank estimation.
//!
//! When a caller does not supply the working rank, it is estimated from the
//! source matrix by a [`RankEstimator`]. The estimator is an injected
//! capability so the factorization entry points stay testable without any
//! particular statistical procedure.
//!
//! Resolution rules:
//! - an explicit rank must be at least 1;
//! - an estimated rank is computed with an upper bound of `min(p, q) / 3`
//!   and floored at 1 before use.

use crate::error::{LearnerError, Result};
use crate::types::{DMatrix, Scalar};
use log::debug;
use nalgebra::SVD;
use std::cmp::Ordering;

/// Capability that estimates the rank of a matrix.
pub trait RankEstimator<T: Scalar>: Send + Sync {
    /// Returns the estimated rank of `matrix`, not exceeding `max_rank`.
    ///
    /// A result of zero is permitted; callers floor it at 1.
    fn estimate_rank(&self, matrix: &DMatrix<T>, max_rank: T) -> Result<usize>;
}

impl<T: Scalar, E: RankEstimator<T> + ?Sized> RankEstimator<T> for &E {
    fn estimate_rank(&self, matrix: &DMatrix<T>, max_rank: T) -> Result<usize> {
        (**self).estimate_rank(matrix, max_rank)
    }
}

/// Estimator that always reports the same rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRank(pub usize);

impl<T: Scalar> RankEstimator<T> for FixedRank {
    fn estimate_rank(&self, _matrix: &DMatrix<T>, _max_rank: T) -> Result<usize> {
        Ok(self.0)
    }
}

/// Optimal hard threshold for singular values under unknown noise.
///
/// Counts the singular values above `ω(β) · median(σ)` where `β` is the
/// aspect ratio of the matrix (Gavish and Donoho, 2014) and caps the count at
/// `floor(max_rank)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardThresholdRankEstimator;

impl HardThresholdRankEstimator {
    /// Creates the estimator.
    pub fn new() -> Self {
        Self
    }

    /// Cubic approximation of the threshold coefficient `ω(β)`.
    pub fn omega<T: Scalar>(beta: T) -> T {
        let c = <T as Scalar>::from_f64;
        c(0.56) * beta * beta * beta - c(0.95) * beta * beta + c(1.82) * beta + c(1.43)
    }

    /// Returns the threshold applied to the singular values of a matrix of
    /// the given shape.
    pub fn threshold<T: Scalar>(singular_values: &[T], rows: usize, cols: usize) -> T {
        let (small, large) = if rows <= cols { (rows, cols) } else { (cols, rows) };
        let beta = <T as Scalar>::from_usize(small) / <T as Scalar>::from_usize(large);
        Self::omega(beta) * median(singular_values)
    }
}

impl<T: Scalar> RankEstimator<T> for HardThresholdRankEstimator {
    fn estimate_rank(&self, matrix: &DMatrix<T>, max_rank: T) -> Result<usize> {
        if matrix.is_empty() {
            return Err(LearnerError::invalid_input(
                "cannot estimate the rank of an empty matrix",
            ));
        }
        let svd = SVD::try_new(matrix.clone(), false, false, <T as Scalar>::EPSILON, 0)
            .ok_or_else(|| LearnerError::numerical_error("SVD did not converge during rank estimation"))?;
        let singular_values: Vec<T> = svd.singular_values.iter().copied().collect();
        if singular_values.iter().any(|s| !s.is_finite()) {
            return Err(LearnerError::numerical_error("non-finite singular value"));
        }

        let tau = Self::threshold(&singular_values, matrix.nrows(), matrix.ncols());
        let above = singular_values.iter().filter(|&&s| s > tau).count();
        let cap = floor_to_usize(max_rank);
        debug!("hard threshold {tau}: {above} singular values above, capped at {cap}");
        Ok(above.min(cap))
    }
}

/// Upper bound handed to the estimator: `min(p, q) / 3`.
pub fn default_max_rank<T: Scalar>(rows: usize, cols: usize) -> T {
    <T as Scalar>::from_usize(rows.min(cols)) / <T as Scalar>::from_f64(3.0)
}

/// Resolves the working rank for a fit.
///
/// An explicit rank is validated; otherwise `estimator` is consulted with
/// the default upper bound and its answer floored at 1.
pub fn resolve_rank<T, E>(requested: Option<usize>, source: &DMatrix<T>, estimator: &E) -> Result<usize>
where
    T: Scalar,
    E: RankEstimator<T> + ?Sized,
{
    match requested {
        Some(0) => Err(LearnerError::invalid_input("rank must be at least 1")),
        Some(rank) => Ok(rank),
        None => {
            let max_rank = default_max_rank::<T>(source.nrows(), source.ncols());
            let estimated = estimator.estimate_rank(source, max_rank)?;
            let rank = estimated.max(1);
            debug!("estimated rank {estimated} (bound {max_rank}), using {rank}");
            Ok(rank)
        }
    }
}

fn median<T: Scalar>(values: &[T]) -> T {
    if values.is_empty() {
        return T::zero();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / <T as Scalar>::from_f64(2.0)
    } else {
        sorted[mid]
    }
}

fn floor_to_usize<T: Scalar>(value: T) -> usize {
    if !value.is_finite() || value < T::one() {
        return 0;
    }
    let floor: f64 = nalgebra::try_convert(value.floor()).unwrap_or(0.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = floor as usize;
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_omega_square() {
        assert_relative_eq!(HardThresholdRankEstimator::omega(1.0), 2.86, epsilon = 1e-12);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median::<f64>(&[]), 0.0);
    }

    #[test]
    fn test_floor_to_usize() {
        assert_eq!(floor_to_usize(0.5), 0);
        assert_eq!(floor_to_usize(1.0), 1);
        assert_eq!(floor_to_usize(6.67), 6);
        assert_eq!(floor_to_usize(f64::NAN), 0);
    }

    #[test]
    fn test_default_max_rank() {
        assert_relative_eq!(default_max_rank::<f64>(30, 20), 20.0 / 3.0);
        assert_relative_eq!(default_max_rank::<f64>(2, 9), 2.0 / 3.0);
    }

    #[test]
    fn test_resolve_explicit_rank() {
        let source = DMatrix::<f64>::identity(4, 4);
        assert_eq!(resolve_rank(Some(3), &source, &FixedRank(1)).unwrap(), 3);
        assert!(resolve_rank(Some(0), &source, &FixedRank(1))
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn test_resolve_floors_estimate_at_one() {
        let source = DMatrix::<f64>::identity(4, 4);
        assert_eq!(resolve_rank(None, &source, &FixedRank(0)).unwrap(), 1);
        assert_eq!(resolve_rank(None, &source, &FixedRank(2)).unwrap(), 2);
    }

    #[test]
    fn test_identity_has_no_dominant_components() {
        // Every singular value equals the median, below omega(1) * median.
        let source = DMatrix::<f64>::identity(9, 9);
        let rank = HardThresholdRankEstimator.estimate_rank(&source, 3.0).unwrap();
        assert_eq!(rank, 0);
        assert_eq!(resolve_rank(None, &source, &HardThresholdRankEstimator).unwrap(), 1);
    }
}
