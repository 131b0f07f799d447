//! Truncated singular subspaces of the source matrix.
//!
//! Both estimators start from the thin SVD `Y_s = U D Vᵗ` truncated to the
//! working rank `r_use = min(r, min(p, q))`. The truncated singular vectors
//! anchor the transfer penalty and the projection estimator; the scaled
//! vectors `U √D`, `V √D` give the warm start of the gradient descent.

use learner_core::{
    error::{LearnerError, Result},
    types::{DMatrix, DVector, Scalar},
};
use nalgebra::SVD;
use std::cmp::Ordering;

/// A pair of low-rank factors whose product `U Vᵗ` approximates a matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorPair<T: Scalar> {
    /// Left factor (`rows × r`)
    pub u: DMatrix<T>,
    /// Right factor (`cols × r`)
    pub v: DMatrix<T>,
}

impl<T: Scalar> FactorPair<T> {
    /// Creates a factor pair; both factors must share their column count.
    pub fn new(u: DMatrix<T>, v: DMatrix<T>) -> Result<Self> {
        if u.ncols() != v.ncols() {
            return Err(LearnerError::dimension_mismatch(
                format!("{} factor columns", u.ncols()),
                format!("{} factor columns", v.ncols()),
            ));
        }
        Ok(Self { u, v })
    }

    /// Rank of the factorization.
    pub fn rank(&self) -> usize {
        self.u.ncols()
    }

    /// The reconstructed matrix `U Vᵗ`.
    pub fn product(&self) -> DMatrix<T> {
        &self.u * self.v.transpose()
    }

    /// Scale-normalized gradient step.
    ///
    /// Each factor moves by `step_size · ‖F‖ / (‖∇F‖ + ε)` along its negative
    /// gradient, so the step length tracks the factor's magnitude rather than
    /// the raw gradient magnitude.
    pub fn descend(&self, grad_u: &DMatrix<T>, grad_v: &DMatrix<T>, step_size: T) -> Self {
        let guard = T::GRADIENT_GUARD;
        let scale_u = step_size * self.u.norm() / (grad_u.norm() + guard);
        let scale_v = step_size * self.v.norm() / (grad_v.norm() + guard);
        Self {
            u: &self.u - grad_u * scale_u,
            v: &self.v - grad_v * scale_v,
        }
    }
}

/// Leading singular triplets of the source matrix.
#[derive(Debug, Clone)]
pub struct SourceSubspace<T: Scalar> {
    u_trunc: DMatrix<T>,
    v_trunc: DMatrix<T>,
    u_trunc_t: DMatrix<T>,
    v_trunc_t: DMatrix<T>,
    singular_values: DVector<T>,
    available: usize,
}

impl<T: Scalar> SourceSubspace<T> {
    /// Decomposes `source` and keeps the `min(rank, available)` leading
    /// components.
    pub fn from_source(source: &DMatrix<T>, rank: usize) -> Result<Self> {
        if rank == 0 {
            return Err(LearnerError::invalid_input("rank must be at least 1"));
        }
        if source.is_empty() {
            return Err(LearnerError::invalid_input("source matrix must not be empty"));
        }

        let svd = SVD::try_new(source.clone(), true, true, <T as Scalar>::EPSILON, 0)
            .ok_or_else(|| LearnerError::numerical_error("SVD of the source matrix did not converge"))?;
        let u = svd
            .u
            .ok_or_else(|| LearnerError::numerical_error("SVD failed to compute U"))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| LearnerError::numerical_error("SVD failed to compute V^T"))?;
        let s = &svd.singular_values;
        if s.iter().any(|value| !value.is_finite()) {
            return Err(LearnerError::numerical_error(
                "source matrix has non-finite singular values",
            ));
        }

        // Leading components by descending singular value.
        let available = s.len();
        let mut order: Vec<usize> = (0..available).collect();
        order.sort_by(|&a, &b| s[b].partial_cmp(&s[a]).unwrap_or(Ordering::Equal));
        let keep = &order[..rank.min(available)];

        let u_trunc = DMatrix::from_fn(u.nrows(), keep.len(), |i, k| u[(i, keep[k])]);
        let v_trunc = DMatrix::from_fn(v_t.ncols(), keep.len(), |j, k| v_t[(keep[k], j)]);
        let singular_values = DVector::from_fn(keep.len(), |k, _| s[keep[k]]);

        Ok(Self {
            u_trunc_t: u_trunc.transpose(),
            v_trunc_t: v_trunc.transpose(),
            u_trunc,
            v_trunc,
            singular_values,
            available,
        })
    }

    /// Working rank `r_use`.
    pub fn rank(&self) -> usize {
        self.singular_values.len()
    }

    /// Number of components the decomposition produced (`min(p, q)`).
    pub fn available(&self) -> usize {
        self.available
    }

    /// Truncated left singular vectors (`p × r_use`).
    pub fn u_trunc(&self) -> &DMatrix<T> {
        &self.u_trunc
    }

    /// Truncated right singular vectors (`q × r_use`).
    pub fn v_trunc(&self) -> &DMatrix<T> {
        &self.v_trunc
    }

    /// Retained singular values in descending order.
    pub fn singular_values(&self) -> &DVector<T> {
        &self.singular_values
    }

    /// Warm start `(U_trunc √D, V_trunc √D)`.
    ///
    /// Its product equals the rank-`r_use` truncation of the source.
    pub fn warm_start(&self) -> FactorPair<T> {
        let sqrt_d = DMatrix::from_diagonal(&self.singular_values.map(|s| s.sqrt()));
        FactorPair {
            u: &self.u_trunc * &sqrt_d,
            v: &self.v_trunc * &sqrt_d,
        }
    }

    /// Component of `factor` outside the left singular subspace.
    pub fn left_drift(&self, factor: &DMatrix<T>) -> DMatrix<T> {
        factor - &self.u_trunc * (&self.u_trunc_t * factor)
    }

    /// Component of `factor` outside the right singular subspace.
    pub fn right_drift(&self, factor: &DMatrix<T>) -> DMatrix<T> {
        factor - &self.v_trunc * (&self.v_trunc_t * factor)
    }

    /// Projects `matrix` onto both subspaces: `U_r U_rᵗ M V_r V_rᵗ`.
    pub fn project(&self, matrix: &DMatrix<T>) -> DMatrix<T> {
        let core = &self.u_trunc_t * matrix * &self.v_trunc;
        &self.u_trunc * core * &self.v_trunc_t
    }
}
