//! Partially observed matrices.
//!
//! The target matrix of a transfer problem may contain missing entries. Rather
//! than relying on a NaN sentinel flowing through arithmetic, missingness is
//! carried by an explicit observation mask next to the values. Unobserved
//! positions always hold zero in the value matrix so that accidental use of
//! them can never inject NaN into a computation.
//!
//! Linear indices used throughout this crate address the row-major
//! flattening of a matrix: index `k` refers to row `k / ncols`, column
//! `k % ncols`.

use crate::error::{LearnerError, Result};
use crate::types::{linear_to_coords, DMatrix, Mask, Scalar};

/// A dense matrix with a per-entry observation mask.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialMatrix<T: Scalar> {
    values: DMatrix<T>,
    observed: Mask,
    observed_count: usize,
}

impl<T: Scalar> PartialMatrix<T> {
    /// Wraps a matrix in which every entry is observed.
    pub fn fully_observed(values: DMatrix<T>) -> Self {
        let observed = Mask::from_element(values.nrows(), values.ncols(), true);
        let observed_count = values.len();
        Self {
            values,
            observed,
            observed_count,
        }
    }

    /// Builds a partial matrix from values and an explicit observation mask.
    ///
    /// Values at unobserved positions are discarded.
    pub fn with_mask(values: DMatrix<T>, observed: Mask) -> Result<Self> {
        if values.shape() != observed.shape() {
            return Err(LearnerError::dimension_mismatch(
                format!("{:?}", values.shape()),
                format!("{:?}", observed.shape()),
            ));
        }
        Ok(Self::from_parts(values, observed))
    }

    /// Interprets NaN entries as missing.
    ///
    /// This is the conversion used at boundaries where callers encode
    /// missingness with the floating-point sentinel.
    pub fn from_nan_sentinel(values: DMatrix<T>) -> Self {
        let observed = values.map(|v| !v.is_nan_sentinel());
        Self::from_parts(values, observed)
    }

    /// Builds a partial matrix from row-major optional entries.
    pub fn from_row_options(rows: usize, cols: usize, entries: &[Option<T>]) -> Result<Self> {
        if entries.len() != rows * cols {
            return Err(LearnerError::dimension_mismatch(
                format!("{} entries for a {rows}x{cols} matrix", rows * cols),
                format!("{} entries", entries.len()),
            ));
        }
        let values = DMatrix::from_fn(rows, cols, |i, j| {
            entries[i * cols + j].unwrap_or_else(T::zero)
        });
        let observed = Mask::from_fn(rows, cols, |i, j| entries[i * cols + j].is_some());
        Self::with_mask(values, observed)
    }

    /// Zeroes unobserved values and counts the observed ones.
    ///
    /// Shapes must already agree.
    fn from_parts(mut values: DMatrix<T>, observed: Mask) -> Self {
        let mut observed_count = 0;
        for (value, &seen) in values.iter_mut().zip(observed.iter()) {
            if seen {
                observed_count += 1;
            } else {
                *value = T::zero();
            }
        }
        Self {
            values,
            observed,
            observed_count,
        }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Total number of entries, observed or not.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the matrix has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values with zeros at unobserved positions.
    pub fn values(&self) -> &DMatrix<T> {
        &self.values
    }

    /// The observation mask.
    pub fn mask(&self) -> &Mask {
        &self.observed
    }

    /// Returns the entry at `(row, col)` if it is observed.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.observed[(row, col)].then(|| self.values[(row, col)])
    }

    /// Returns `true` if the entry at `(row, col)` is observed.
    pub fn is_observed(&self, row: usize, col: usize) -> bool {
        self.observed[(row, col)]
    }

    /// Number of observed entries.
    pub fn observed_count(&self) -> usize {
        self.observed_count
    }

    /// Returns `true` if at least one entry is missing.
    pub fn has_missing(&self) -> bool {
        self.observed_count < self.len()
    }

    /// Fraction of entries that are observed.
    pub fn observed_fraction(&self) -> T {
        if self.is_empty() {
            return T::zero();
        }
        <T as Scalar>::from_usize(self.observed_count) / <T as Scalar>::from_usize(self.len())
    }

    /// Returns a copy in which the given row-major linear indices are missing.
    pub fn mask_linear_indices(&self, indices: &[usize]) -> Result<Self> {
        let ncols = self.ncols();
        let mut masked = self.clone();
        for &index in indices {
            if index >= self.len() {
                return Err(LearnerError::invalid_input(format!(
                    "linear index {index} out of range for {} entries",
                    self.len()
                )));
            }
            let coords = linear_to_coords(index, ncols);
            if masked.observed[coords] {
                masked.observed[coords] = false;
                masked.values[coords] = T::zero();
                masked.observed_count -= 1;
            }
        }
        Ok(masked)
    }

    /// Replaces unobserved entries with the corresponding entries of `fill`.
    ///
    /// `fill` must have the same shape as `self`.
    pub fn impute(&self, fill: &DMatrix<T>) -> DMatrix<T> {
        let mut completed = self.values.clone();
        if self.has_missing() {
            for ((value, &seen), &prediction) in completed
                .iter_mut()
                .zip(self.observed.iter())
                .zip(fill.iter())
            {
                if !seen {
                    *value = prediction;
                }
            }
        }
        completed
    }

    /// Computes `estimate - self` with zeros at unobserved positions.
    pub fn masked_residual(&self, estimate: &DMatrix<T>) -> DMatrix<T> {
        let mut residual = estimate - &self.values;
        if self.has_missing() {
            for (value, &seen) in residual.iter_mut().zip(self.observed.iter()) {
                if !seen {
                    *value = T::zero();
                }
            }
        }
        residual
    }

    /// Returns `true` if every observed value is finite.
    pub fn observed_values_finite(&self) -> bool {
        self.values
            .iter()
            .zip(self.observed.iter())
            .all(|(value, &seen)| !seen || value.is_finite())
    }

    /// Converts back to a dense matrix with NaN at unobserved positions.
    pub fn to_nan_sentinel(&self) -> DMatrix<T> {
        let mut dense = self.values.clone();
        for (value, &seen) in dense.iter_mut().zip(self.observed.iter()) {
            if !seen {
                *value = T::nan();
            }
        }
        dense
    }
}

impl<T: Scalar> From<DMatrix<T>> for PartialMatrix<T> {
    fn from(values: DMatrix<T>) -> Self {
        Self::fully_observed(values)
    }
}

/// Checks that a source and target pair can enter a factorization.
///
/// The matrices must be non-empty and share a shape; the source must be
/// fully observed and finite, and the target must have at least one finite
/// observed entry.
pub fn ensure_compatible<T: Scalar>(source: &DMatrix<T>, target: &PartialMatrix<T>) -> Result<()> {
    if source.shape() != target.shape() {
        return Err(LearnerError::invalid_input(format!(
            "source and target must have the same dimensions: source is {}x{}, target is {}x{}",
            source.nrows(),
            source.ncols(),
            target.nrows(),
            target.ncols()
        )));
    }
    if source.is_empty() {
        return Err(LearnerError::invalid_input("matrices must not be empty"));
    }
    ensure_complete(source, "source")?;
    if target.observed_count() == 0 {
        return Err(LearnerError::invalid_input(
            "target must contain at least one observed entry",
        ));
    }
    if !target.observed_values_finite() {
        return Err(LearnerError::invalid_input(
            "target contains non-finite observed values",
        ));
    }
    Ok(())
}

/// Checks that a dense matrix holds no missing or non-finite values.
pub fn ensure_complete<T: Scalar>(matrix: &DMatrix<T>, name: &str) -> Result<()> {
    if matrix.iter().any(|v| v.is_nan_sentinel()) {
        return Err(LearnerError::invalid_input(format!(
            "{name} cannot have missing values"
        )));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(LearnerError::invalid_input(format!(
            "{name} contains non-finite values"
        )));
    }
    Ok(())
}
