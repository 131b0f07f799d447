//! Penalized transfer objective over a pair of factors.
//!
//! For factors `U` (`p × r`) and `V` (`q × r`) the objective is
//!
//! ```text
//! f(U, V) = ‖M ∘ (U Vᵗ − Y_t)‖² / frac
//!         + λ1 ‖U − U_r U_rᵗ U‖²
//!         + λ1 ‖V − V_r V_rᵗ V‖²
//!         + λ2 ‖Uᵗ U − Vᵗ V‖²
//! ```
//!
//! where `M` is the observation mask of the target, `frac` the fraction of
//! observed entries and `U_r`, `V_r` the truncated singular vectors of the
//! source. All norms are Frobenius norms.

use crate::subspace::{FactorPair, SourceSubspace};
use learner_core::{
    error::{LearnerError, Result},
    matrix::PartialMatrix,
    types::{DMatrix, Scalar},
};

/// The objective minimized by [`crate::factorizer::MatrixFactorizer`].
#[derive(Debug, Clone, Copy)]
pub struct TransferObjective<'a, T: Scalar> {
    subspace: &'a SourceSubspace<T>,
    target: &'a PartialMatrix<T>,
    lambda1: T,
    lambda2: T,
    frac: T,
}

impl<'a, T: Scalar> TransferObjective<'a, T> {
    /// Binds the objective to a source subspace and an observed target.
    pub fn new(
        subspace: &'a SourceSubspace<T>,
        target: &'a PartialMatrix<T>,
        lambda1: T,
        lambda2: T,
    ) -> Result<Self> {
        let frac = target.observed_fraction();
        if frac <= T::zero() {
            return Err(LearnerError::invalid_input(
                "target must contain at least one observed entry",
            ));
        }
        Ok(Self {
            subspace,
            target,
            lambda1,
            lambda2,
            frac,
        })
    }

    /// Fraction of observed target entries used to rescale the data term.
    pub fn observed_fraction(&self) -> T {
        self.frac
    }

    /// Evaluates the objective.
    pub fn cost(&self, factors: &FactorPair<T>) -> T {
        let residual = self.target.masked_residual(&factors.product());
        self.cost_with_residual(factors, &residual)
    }

    /// Gradients of the objective with respect to `U` and `V`.
    ///
    /// The data term uses the adjusted target `A`: the observed target with
    /// its missing entries filled by the current `U Vᵗ`.
    pub fn gradient(&self, factors: &FactorPair<T>) -> (DMatrix<T>, DMatrix<T>) {
        let FactorPair { u, v } = factors;
        let two = <T as Scalar>::from_f64(2.0);
        let four = <T as Scalar>::from_f64(4.0);

        let adjusted = self.target.impute(&factors.product());
        let utu = u.transpose() * u;
        let vtv = v.transpose() * v;
        let balance = &utu - &vtv;

        let data_scale = two / self.frac;
        let drift_scale = two * self.lambda1;

        let grad_u = (u * &vtv - &adjusted * v) * data_scale
            + self.subspace.left_drift(u) * drift_scale
            + u * &balance * (four * self.lambda2);
        let grad_v = (v * &utu - adjusted.transpose() * u) * data_scale
            + self.subspace.right_drift(v) * drift_scale
            - v * &balance * (four * self.lambda2);

        (grad_u, grad_v)
    }

    fn cost_with_residual(&self, factors: &FactorPair<T>, residual: &DMatrix<T>) -> T {
        let FactorPair { u, v } = factors;
        let data = residual.norm_squared() / self.frac;
        let drift = self.subspace.left_drift(u).norm_squared() + self.subspace.right_drift(v).norm_squared();
        let balance = (u.transpose() * u - v.transpose() * v).norm_squared();
        data + self.lambda1 * drift + self.lambda2 * balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    fn setup() -> (SourceSubspace<f64>, PartialMatrix<f64>) {
        let source = dmatrix![
            4.0, 1.0, 0.5;
            1.0, 3.0, 0.2;
            0.5, 0.2, 2.0;
            1.0, 1.0, 1.0
        ];
        let subspace = SourceSubspace::from_source(&source, 2).unwrap();
        let target = PartialMatrix::from_row_options(
            4,
            3,
            &[
                Some(3.5),
                None,
                Some(0.4),
                Some(1.2),
                Some(2.5),
                Some(0.1),
                None,
                Some(0.3),
                Some(2.2),
                Some(0.9),
                Some(1.1),
                None,
            ],
        )
        .unwrap();
        (subspace, target)
    }

    fn perturbed(subspace: &SourceSubspace<f64>) -> FactorPair<f64> {
        let start = subspace.warm_start();
        let bump_u = DMatrix::from_fn(start.u.nrows(), start.u.ncols(), |i, k| 0.1 * (i as f64 - k as f64));
        let bump_v = DMatrix::from_fn(start.v.nrows(), start.v.ncols(), |j, k| 0.05 * (j + k) as f64);
        FactorPair::new(&start.u + bump_u, &start.v + bump_v).unwrap()
    }

    #[test]
    fn test_observed_fraction() {
        let (subspace, target) = setup();
        let objective = TransferObjective::new(&subspace, &target, 0.7, 0.3).unwrap();
        assert_relative_eq!(objective.observed_fraction(), 0.75, epsilon = 1e-15);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let (subspace, target) = setup();
        let objective = TransferObjective::new(&subspace, &target, 0.7, 0.3).unwrap();
        let factors = perturbed(&subspace);
        let (grad_u, grad_v) = objective.gradient(&factors);

        let h = 1e-6;
        for i in 0..factors.u.nrows() {
            for k in 0..factors.u.ncols() {
                let mut plus = factors.clone();
                let mut minus = factors.clone();
                plus.u[(i, k)] += h;
                minus.u[(i, k)] -= h;
                let fd = (objective.cost(&plus) - objective.cost(&minus)) / (2.0 * h);
                assert_relative_eq!(grad_u[(i, k)], fd, epsilon = 1e-5, max_relative = 1e-5);
            }
        }
        for j in 0..factors.v.nrows() {
            for k in 0..factors.v.ncols() {
                let mut plus = factors.clone();
                let mut minus = factors.clone();
                plus.v[(j, k)] += h;
                minus.v[(j, k)] -= h;
                let fd = (objective.cost(&plus) - objective.cost(&minus)) / (2.0 * h);
                assert_relative_eq!(grad_v[(j, k)], fd, epsilon = 1e-5, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn test_penalties_vanish_at_warm_start() {
        let (subspace, _) = setup();
        let source_fit = PartialMatrix::fully_observed(subspace.warm_start().product());
        let objective = TransferObjective::new(&subspace, &source_fit, 5.0, 5.0).unwrap();
        assert_relative_eq!(objective.cost(&subspace.warm_start()), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_gradient_vanishes_when_observed_entries_are_fit() {
        let (subspace, target) = setup();
        let factors = perturbed(&subspace);
        let mut values = factors.product();
        for (value, &seen) in values.iter_mut().zip(target.mask().iter()) {
            if !seen {
                *value = 100.0;
            }
        }

        // Missing entries are filled by U Vᵗ, so only observed values matter.
        let fitted = PartialMatrix::with_mask(values, target.mask().clone()).unwrap();
        let objective = TransferObjective::new(&subspace, &fitted, 0.0, 0.0).unwrap();
        let (grad_u, grad_v) = objective.gradient(&factors);

        assert_relative_eq!(grad_u.norm(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(grad_v.norm(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_unobserved_target_rejected() {
        let (subspace, _) = setup();
        let empty = PartialMatrix::from_row_options(4, 3, &[None; 12]).unwrap();
        assert!(TransferObjective::new(&subspace, &empty, 1.0, 1.0).is_err());
    }
}
