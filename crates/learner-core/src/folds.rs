//! Reproducible partitioning of matrix entries into cross-validation folds.
//!
//! The linear indices `0..N` are shuffled with a seeded generator and cut
//! into `n_folds` contiguous blocks of `floor(N / n_folds)` indices each.
//! The trailing `N mod n_folds` shuffled indices belong to no fold: they are
//! never held out and never scored. They are exposed through
//! [`FoldPartition::unassigned`] so callers can report them.

use crate::error::{LearnerError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seed used by cross-validation when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 1636;

/// A partition of the linear indices of a matrix into disjoint folds.
///
/// Built once per cross-validation call and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldPartition {
    permutation: Vec<usize>,
    n_folds: usize,
    fold_size: usize,
}

impl FoldPartition {
    /// Shuffles `0..total` with `seed` and slices it into `n_folds` folds.
    ///
    /// The same `(total, n_folds, seed)` always yields the same partition.
    pub fn new(total: usize, n_folds: usize, seed: u64) -> Result<Self> {
        if n_folds == 0 {
            return Err(LearnerError::invalid_input("n_folds must be at least 1"));
        }
        let mut permutation: Vec<usize> = (0..total).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        permutation.shuffle(&mut rng);

        Ok(Self {
            permutation,
            n_folds,
            fold_size: total / n_folds,
        })
    }

    /// Number of folds.
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Number of indices in every fold.
    pub fn fold_size(&self) -> usize {
        self.fold_size
    }

    /// Total number of indices that were partitioned.
    pub fn total(&self) -> usize {
        self.permutation.len()
    }

    /// Indices held out by fold `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= self.n_folds()`.
    pub fn fold(&self, k: usize) -> &[usize] {
        assert!(k < self.n_folds, "fold {k} out of range for {} folds", self.n_folds);
        let start = k * self.fold_size;
        &self.permutation[start..start + self.fold_size]
    }

    /// Iterates over the folds in order.
    pub fn folds(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.n_folds).map(move |k| self.fold(k))
    }

    /// Indices assigned to no fold (the `total mod n_folds` remainder).
    pub fn unassigned(&self) -> &[usize] {
        &self.permutation[self.n_folds * self.fold_size..]
    }
}
