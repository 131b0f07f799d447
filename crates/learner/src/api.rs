//! Entry points.
//!
//! Every entry point validates its inputs, resolves the working rank once
//! and delegates to the matching estimator. Invalid input fails before any
//! decomposition or descent starts.

use crate::records::{CrossValidationFit, DirectProjectionFit, LearnerFit};
use learner_core::{
    error::{LearnerError, Result},
    matrix::{ensure_compatible, ensure_complete, PartialMatrix},
    rank::{resolve_rank, HardThresholdRankEstimator, RankEstimator},
    types::{DMatrix, Scalar},
};
use learner_optim::{
    CrossValidationConfig, CrossValidator, DirectProjection, FactorizerConfig, FitObserver, MatrixFactorizer,
    NoOpObserver,
};

/// Transfer learning estimators parameterized by a rank estimator.
///
/// The estimator is consulted only when a call leaves the rank unset.
///
/// # Examples
///
/// ```rust
/// use learner::prelude::*;
/// use nalgebra::dmatrix;
///
/// let source = dmatrix![1.0, 2.0, 3.0; 2.0, 4.0, 6.0; 3.0, 6.0, 9.0];
/// let target = PartialMatrix::from_nan_sentinel(dmatrix![1.1, 2.0, 2.9; 2.0, f64::NAN, 6.1; 3.0, 6.0, 9.0]);
///
/// let learner = Learner::new();
/// let fit = learner
///     .fit(&source, &target, Some(1), &FactorizerConfig::new(1.0, 1.0, 0.01))
///     .unwrap();
/// assert_eq!(fit.rank_used, 1);
/// assert_eq!(fit.estimate.shape(), (3, 3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Learner<E = HardThresholdRankEstimator> {
    estimator: E,
}

impl Learner {
    /// Creates a learner with the hard-threshold rank estimator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> Learner<E> {
    /// Creates a learner with a custom rank estimator.
    pub fn with_estimator(estimator: E) -> Self {
        Self { estimator }
    }

    /// The rank estimator in use.
    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Fits the target by penalized gradient descent.
    pub fn fit<T>(
        &self,
        source: &DMatrix<T>,
        target: &PartialMatrix<T>,
        rank: Option<usize>,
        config: &FactorizerConfig<T>,
    ) -> Result<LearnerFit<T>>
    where
        T: Scalar,
        E: RankEstimator<T>,
    {
        self.fit_observed(source, target, rank, config, &mut NoOpObserver)
    }

    /// Fits the target, reporting every iteration to `observer`.
    pub fn fit_observed<T, O>(
        &self,
        source: &DMatrix<T>,
        target: &PartialMatrix<T>,
        rank: Option<usize>,
        config: &FactorizerConfig<T>,
        observer: &mut O,
    ) -> Result<LearnerFit<T>>
    where
        T: Scalar,
        E: RankEstimator<T>,
        O: FitObserver<T> + ?Sized,
    {
        config.validate()?;
        ensure_compatible(source, target)?;
        let rank = resolve_rank(rank, source, &self.estimator)?;
        let result = MatrixFactorizer::new(*config).fit_observed(source, target, rank, observer)?;
        Ok(result.into())
    }

    /// Selects `(lambda1, lambda2)` by cross-validated grid search.
    pub fn cross_validate<T>(
        &self,
        source: &DMatrix<T>,
        target: &PartialMatrix<T>,
        rank: Option<usize>,
        config: &CrossValidationConfig<T>,
    ) -> Result<CrossValidationFit<T>>
    where
        T: Scalar,
        E: RankEstimator<T>,
    {
        config.validate()?;
        ensure_compatible(source, target)?;
        let rank = resolve_rank(rank, source, &self.estimator)?;
        let result = CrossValidator::new(config.clone()).run(source, target, rank)?;
        Ok(result.into())
    }

    /// Projects a fully observed target onto the source's singular subspaces.
    pub fn direct_projection<T>(
        &self,
        source: &DMatrix<T>,
        target: &DMatrix<T>,
        rank: Option<usize>,
    ) -> Result<DirectProjectionFit<T>>
    where
        T: Scalar,
        E: RankEstimator<T>,
    {
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
        let rank = resolve_rank(rank, source, &self.estimator)?;
        let result = DirectProjection::new().estimate(source, target, rank)?;
        Ok(result.into())
    }
}

/// [`Learner::fit`] with the default rank estimator.
pub fn fit<T: Scalar>(
    source: &DMatrix<T>,
    target: &PartialMatrix<T>,
    rank: Option<usize>,
    config: &FactorizerConfig<T>,
) -> Result<LearnerFit<T>> {
    Learner::new().fit(source, target, rank, config)
}

/// [`Learner::cross_validate`] with the default rank estimator.
pub fn cross_validate<T: Scalar>(
    source: &DMatrix<T>,
    target: &PartialMatrix<T>,
    rank: Option<usize>,
    config: &CrossValidationConfig<T>,
) -> Result<CrossValidationFit<T>> {
    Learner::new().cross_validate(source, target, rank, config)
}

/// [`Learner::direct_projection`] with the default rank estimator.
pub fn direct_projection<T: Scalar>(
    source: &DMatrix<T>,
    target: &DMatrix<T>,
    rank: Option<usize>,
) -> Result<DirectProjectionFit<T>> {
    Learner::new().direct_projection(source, target, rank)
}
