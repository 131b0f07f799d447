//! Penalized gradient-descent factorization of a partially observed target.
//!
//! # Algorithm Overview
//!
//! 1. Decompose the source and keep its `r_use` leading singular triplets.
//! 2. Start from `U = U_r √D`, `V = V_r √D`.
//! 3. Repeat up to `max_iter` times:
//!    - evaluate the objective gradients at the current factors, using the
//!      target with its missing entries filled by the current `U Vᵗ`;
//!    - take one scale-normalized step on both factors simultaneously;
//!    - record the new objective, keep the factors if they are the best so
//!      far, and apply the stopping rule.
//! 4. Return `U_best V_bestᵗ`.
//!
//! The initial objective seeds both the best-so-far value and the previous
//! objective of the stopping rule; it is not part of the trajectory.

use crate::{
    convergence::{ConvergenceStatus, StoppingRule},
    objective::TransferObjective,
    observer::{FitObserver, IterationInfo, NoOpObserver},
    state::BestIterate,
    subspace::SourceSubspace,
};
use learner_core::{
    config::{ensure_non_negative, ensure_positive, ControlConfig},
    error::{LearnerError, Result},
    matrix::{ensure_compatible, PartialMatrix},
    types::{DMatrix, Scalar},
};
use log::{debug, info, log_enabled, warn, Level};
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hyperparameters of a single factorization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactorizerConfig<T> {
    /// Weight of the subspace drift penalty
    pub lambda1: T,

    /// Weight of the Gram imbalance penalty
    pub lambda2: T,

    /// Relative step length of the scale-normalized update
    pub step_size: T,

    /// Stopping controls
    pub control: ControlConfig<T>,
}

impl<T: Scalar> FactorizerConfig<T> {
    /// Creates a configuration with default stopping controls.
    pub fn new(lambda1: T, lambda2: T, step_size: T) -> Self {
        Self {
            lambda1,
            lambda2,
            step_size,
            control: ControlConfig::default(),
        }
    }

    /// Replaces the stopping controls.
    pub fn with_control(mut self, control: ControlConfig<T>) -> Self {
        self.control = control;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.control.max_iter = max_iter;
        self
    }

    /// Sets the convergence threshold.
    pub fn with_threshold(mut self, threshold: T) -> Self {
        self.control.threshold = threshold;
        self
    }

    /// Sets the divergence ratio.
    pub fn with_max_value(mut self, max_value: T) -> Self {
        self.control.max_value = max_value;
        self
    }

    /// Checks every hyperparameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative(self.lambda1, "lambda1")?;
        ensure_non_negative(self.lambda2, "lambda2")?;
        ensure_positive(self.step_size, "step_size")?;
        self.control.validate()
    }
}

/// Outcome of a single factorization.
#[derive(Debug, Clone)]
pub struct FactorizationResult<T: Scalar> {
    /// `U_best V_bestᵗ`, same shape as the target
    pub estimate: DMatrix<T>,

    /// Objective after every completed iteration, stopping entry included
    pub objective_values: Vec<T>,

    /// Why the loop stopped
    pub status: ConvergenceStatus,

    /// Working rank `r_use`
    pub rank: usize,

    /// Objective of the returned estimate
    pub best_objective: T,

    /// Iteration that produced the estimate; `None` when the warm start won
    pub best_iteration: Option<usize>,

    /// Wall-clock time of the descent loop
    pub duration: Duration,
}

impl<T: Scalar> FactorizationResult<T> {
    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        self.objective_values.len()
    }
}

/// Gradient-descent factorizer for transfer learning between two matrices.
///
/// # Examples
///
/// ```rust
/// use learner_core::matrix::PartialMatrix;
/// use learner_optim::{ConvergenceStatus, FactorizerConfig, MatrixFactorizer};
/// use nalgebra::dmatrix;
///
/// let source = dmatrix![1.0, 2.0; 2.0, 4.0];
/// let target = PartialMatrix::fully_observed(source.clone());
/// let factorizer = MatrixFactorizer::new(FactorizerConfig::new(0.0, 0.0, 1e-4));
/// let fit = factorizer.fit(&source, &target, 1).unwrap();
/// assert_eq!(fit.status, ConvergenceStatus::Converged);
/// assert_eq!(fit.estimate.shape(), (2, 2));
/// ```
#[derive(Debug, Clone)]
pub struct MatrixFactorizer<T: Scalar> {
    config: FactorizerConfig<T>,
}

impl<T: Scalar> MatrixFactorizer<T> {
    /// Creates a factorizer with the given hyperparameters.
    pub fn new(config: FactorizerConfig<T>) -> Self {
        Self { config }
    }

    /// The hyperparameters in use.
    pub fn config(&self) -> &FactorizerConfig<T> {
        &self.config
    }

    /// Fits the target at the requested rank.
    pub fn fit(&self, source: &DMatrix<T>, target: &PartialMatrix<T>, rank: usize) -> Result<FactorizationResult<T>> {
        self.fit_observed(source, target, rank, &mut NoOpObserver)
    }

    /// Fits the target, reporting every iteration to `observer`.
    pub fn fit_observed<O>(
        &self,
        source: &DMatrix<T>,
        target: &PartialMatrix<T>,
        rank: usize,
        observer: &mut O,
    ) -> Result<FactorizationResult<T>>
    where
        O: FitObserver<T> + ?Sized,
    {
        self.config.validate()?;
        ensure_compatible(source, target)?;
        if rank == 0 {
            return Err(LearnerError::invalid_input("rank must be at least 1"));
        }

        let subspace = SourceSubspace::from_source(source, rank)?;
        let result = self.fit_prepared(&subspace, target, observer)?;
        info!(
            "fit finished: status={}, iterations={}, rank={}, best objective={}",
            result.status,
            result.iterations(),
            result.rank,
            result.best_objective
        );
        Ok(result)
    }

    /// Runs the descent loop against an already decomposed source.
    ///
    /// Cross-validation decomposes the source once and calls this for every
    /// fold. The caller is responsible for shape checks between `subspace`
    /// and `target`.
    pub fn fit_prepared<O>(
        &self,
        subspace: &SourceSubspace<T>,
        target: &PartialMatrix<T>,
        observer: &mut O,
    ) -> Result<FactorizationResult<T>>
    where
        O: FitObserver<T> + ?Sized,
    {
        let start = Instant::now();
        let config = &self.config;
        let objective = TransferObjective::new(subspace, target, config.lambda1, config.lambda2)?;
        let rule = StoppingRule::from_control(&config.control);

        let mut factors = subspace.warm_start();
        let initial = objective.cost(&factors);
        observer.on_start(initial);
        let mut best = BestIterate::new(initial, factors.clone());
        let mut previous = initial;
        let mut objective_values = Vec::with_capacity(config.control.max_iter);
        let mut status = ConvergenceStatus::MaxIterationsReached;

        for iteration in 0..config.control.max_iter {
            let (grad_u, grad_v) = objective.gradient(&factors);
            factors = factors.descend(&grad_u, &grad_v, config.step_size);

            let current = objective.cost(&factors);
            objective_values.push(current);
            best.offer(iteration, current, &factors);

            if log_enabled!(Level::Debug) {
                debug!(
                    "iteration {iteration}: objective={current}, best={}",
                    best.objective()
                );
            }
            observer.on_iteration(&IterationInfo {
                iteration,
                objective: current,
                best_objective: best.objective(),
            });

            if let Some(stop) = rule.check(iteration, previous, current) {
                status = stop;
                break;
            }
            previous = current;
        }

        if status == ConvergenceStatus::Diverged {
            warn!(
                "factorization diverged after {} iterations; returning best objective {}",
                objective_values.len(),
                best.objective()
            );
        }

        let best_objective = best.objective();
        let best_iteration = best.iteration();
        Ok(FactorizationResult {
            estimate: best.into_factors().product(),
            objective_values,
            status,
            rank: subspace.rank(),
            best_objective,
            best_iteration,
            duration: start.elapsed(),
        })
    }
}
