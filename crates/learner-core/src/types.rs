//! Type definitions and aliases for latent space transfer learning.
//!
//! This module provides the scalar trait shared by every numerical routine in
//! the workspace, together with the matrix aliases used for source and target
//! data and for the low-rank factors.

use nalgebra::{Dyn, OMatrix, OVector, RealField};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in the factorization (f32 or f64).
///
/// This trait combines all the numeric traits required by the gradient
/// descent kernel and by the decompositions it relies on.
pub trait Scalar: RealField + Display + Debug + Default + Copy + Send + Sync + 'static {
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Guard added to gradient norms before dividing by them.
    const GRADIENT_GUARD: Self;

    /// Default objective change below which a fit is considered converged.
    const DEFAULT_THRESHOLD: Self;

    /// Default ratio between consecutive objectives treated as divergence.
    const DEFAULT_MAX_VALUE: Self;

    /// Convert from f64 (for constants and literals).
    fn from_f64(v: f64) -> Self {
        nalgebra::convert(v)
    }

    /// Convert from usize (for counts).
    fn from_usize(v: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let as_float = v as f64;
        nalgebra::convert(as_float)
    }

    /// Returns `true` when the value is the IEEE not-a-number sentinel.
    #[allow(clippy::eq_op)]
    fn is_nan_sentinel(self) -> bool {
        self != self
    }

    /// Returns the IEEE not-a-number value of this type.
    fn nan() -> Self {
        nalgebra::convert(f64::NAN)
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const GRADIENT_GUARD: Self = 1e-12;
    const DEFAULT_THRESHOLD: Self = 1e-3;
    const DEFAULT_MAX_VALUE: Self = 10.0;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const GRADIENT_GUARD: Self = 1e-12;
    const DEFAULT_THRESHOLD: Self = 1e-3;
    const DEFAULT_MAX_VALUE: Self = 10.0;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Type alias for a dynamically-sized boolean mask.
pub type Mask = OMatrix<bool, Dyn, Dyn>;

/// Converts a row-major linear index into `(row, col)` coordinates.
#[inline]
pub fn linear_to_coords(index: usize, ncols: usize) -> (usize, usize) {
    (index / ncols, index % ncols)
}
