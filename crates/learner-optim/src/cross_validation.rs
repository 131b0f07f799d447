//! Cross-validated grid search over the two penalty weights.
//!
//! The source is decomposed once and the target's entries are partitioned
//! once; both are shared read-only by every grid cell. Each cell `(i, j)`
//! fits every fold with `(lambda1[i], lambda2[j])` and sums the squared
//! error on the held-out entries. Cells are independent, so they are scored
//! in parallel on a dedicated worker pool and gathered back in row-major
//! order. The grid is therefore identical for any number of workers.

use crate::{
    factorizer::{FactorizerConfig, MatrixFactorizer},
    observer::NoOpObserver,
    subspace::SourceSubspace,
};
use learner_core::{
    config::{ensure_non_negative, ensure_positive, ControlConfig},
    error::{LearnerError, Result},
    folds::{FoldPartition, DEFAULT_SEED},
    matrix::{ensure_compatible, PartialMatrix},
    parallel::build_pool,
    types::{linear_to_coords, DMatrix, Scalar},
};
use log::{debug, info, warn};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of folds.
pub const DEFAULT_N_FOLDS: usize = 4;

/// Default number of worker threads.
pub const DEFAULT_N_CORES: usize = 1;

/// Grid and partition settings of a cross-validation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrossValidationConfig<T> {
    /// Candidate weights of the subspace drift penalty, in grid row order
    pub lambda1_candidates: Vec<T>,

    /// Candidate weights of the Gram imbalance penalty, in grid column order
    pub lambda2_candidates: Vec<T>,

    /// Step size shared by every fit
    pub step_size: T,

    /// Stopping controls shared by every fit
    pub control: ControlConfig<T>,

    /// Number of folds
    pub n_folds: usize,

    /// Number of worker threads
    pub n_cores: usize,

    /// Seed of the fold shuffle
    pub seed: u64,
}

impl<T: Scalar> CrossValidationConfig<T> {
    /// Creates a configuration with default folds, workers, seed and controls.
    pub fn new(lambda1_candidates: Vec<T>, lambda2_candidates: Vec<T>, step_size: T) -> Self {
        Self {
            lambda1_candidates,
            lambda2_candidates,
            step_size,
            control: ControlConfig::default(),
            n_folds: DEFAULT_N_FOLDS,
            n_cores: DEFAULT_N_CORES,
            seed: DEFAULT_SEED,
        }
    }

    /// Sets the number of folds.
    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Sets the number of worker threads.
    pub fn with_n_cores(mut self, n_cores: usize) -> Self {
        self.n_cores = n_cores;
        self
    }

    /// Sets the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the stopping controls.
    pub fn with_control(mut self, control: ControlConfig<T>) -> Self {
        self.control = control;
        self
    }

    /// Grid shape `(L1, L2)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.lambda1_candidates.len(), self.lambda2_candidates.len())
    }

    /// Factorizer settings of grid cell `(i, j)`.
    pub fn cell_config(&self, i: usize, j: usize) -> FactorizerConfig<T> {
        FactorizerConfig::new(self.lambda1_candidates[i], self.lambda2_candidates[j], self.step_size)
            .with_control(self.control)
    }

    /// Checks the grid and partition settings.
    pub fn validate(&self) -> Result<()> {
        if self.lambda1_candidates.is_empty() {
            return Err(LearnerError::invalid_input("lambda1 candidates must not be empty"));
        }
        if self.lambda2_candidates.is_empty() {
            return Err(LearnerError::invalid_input("lambda2 candidates must not be empty"));
        }
        for &lambda in &self.lambda1_candidates {
            ensure_non_negative(lambda, "lambda1")?;
        }
        for &lambda in &self.lambda2_candidates {
            ensure_non_negative(lambda, "lambda2")?;
        }
        ensure_positive(self.step_size, "step_size")?;
        self.control.validate()?;
        if self.n_folds < 2 {
            return Err(LearnerError::invalid_input(format!(
                "n_folds must be at least 2, got {}",
                self.n_folds
            )));
        }
        if self.n_cores == 0 {
            return Err(LearnerError::invalid_input("n_cores must be at least 1"));
        }
        Ok(())
    }
}

/// Outcome of a cross-validated grid search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrossValidationResult<T: Scalar> {
    /// `lambda1` of the winning cell
    pub best_lambda1: T,
    /// `lambda2` of the winning cell
    pub best_lambda2: T,
    /// Grid coordinates `(i*, j*)` of the winning cell
    pub best_index: (usize, usize),
    /// Summed held-out squared error, `L1 × L2`
    pub mse_grid: DMatrix<T>,
    /// Working rank shared by every fit
    pub rank: usize,
    /// Number of entries held out by each fold
    pub fold_size: usize,
    /// Number of shuffled entries that belong to no fold
    pub unassigned: usize,
}

/// Locates the minimum of a grid, scanning in row-major order.
///
/// Ties go to the first cell reached; NaN cells are never selected. Returns
/// `(0, 0)` when every cell is NaN.
pub fn select_minimum<T: Scalar>(grid: &DMatrix<T>) -> (usize, usize) {
    let mut best: Option<((usize, usize), T)> = None;
    for i in 0..grid.nrows() {
        for j in 0..grid.ncols() {
            let value = grid[(i, j)];
            if value.is_nan_sentinel() {
                continue;
            }
            match best {
                Some((_, current)) if value >= current => {}
                _ => best = Some(((i, j), value)),
            }
        }
    }
    best.map(|(index, _)| index).unwrap_or((0, 0))
}

/// Runs the grid search.
#[derive(Debug, Clone)]
pub struct CrossValidator<T: Scalar> {
    config: CrossValidationConfig<T>,
}

impl<T: Scalar> CrossValidator<T> {
    /// Creates a validator for the given settings.
    pub fn new(config: CrossValidationConfig<T>) -> Self {
        Self { config }
    }

    /// The settings in use.
    pub fn config(&self) -> &CrossValidationConfig<T> {
        &self.config
    }

    /// Scores every grid cell at the given rank and selects the best one.
    pub fn run(&self, source: &DMatrix<T>, target: &PartialMatrix<T>, rank: usize) -> Result<CrossValidationResult<T>> {
        let config = &self.config;
        config.validate()?;
        ensure_compatible(source, target)?;
        if rank == 0 {
            return Err(LearnerError::invalid_input("rank must be at least 1"));
        }
        let total = target.len();
        if config.n_folds > total {
            return Err(LearnerError::invalid_input(format!(
                "n_folds ({}) exceeds the number of target entries ({total})",
                config.n_folds
            )));
        }

        let subspace = SourceSubspace::from_source(source, rank)?;
        let partition = FoldPartition::new(total, config.n_folds, config.seed)?;
        let unassigned = partition.unassigned().len();
        if unassigned > 0 {
            warn!(
                "{unassigned} of {total} entries are not assigned to any of the {} folds and will not be scored",
                config.n_folds
            );
        }

        let (rows, cols) = config.grid_shape();
        info!(
            "cross-validating a {rows}x{cols} grid: {} folds of {} entries, rank {}, {} workers",
            config.n_folds,
            partition.fold_size(),
            subspace.rank(),
            config.n_cores
        );

        let cells: Vec<(usize, usize)> = (0..rows).flat_map(|i| (0..cols).map(move |j| (i, j))).collect();
        let pool = build_pool(config.n_cores)?;
        let scores: Vec<T> = pool.install(|| {
            cells
                .par_iter()
                .map(|&(i, j)| self.score_cell(&subspace, target, &partition, i, j))
                .collect::<Result<Vec<T>>>()
        })?;

        let mse_grid = DMatrix::from_row_iterator(rows, cols, scores);
        let best_index = select_minimum(&mse_grid);
        let (bi, bj) = best_index;
        info!(
            "best cell ({bi}, {bj}): lambda1={}, lambda2={}, error={}",
            config.lambda1_candidates[bi],
            config.lambda2_candidates[bj],
            mse_grid[best_index]
        );

        Ok(CrossValidationResult {
            best_lambda1: config.lambda1_candidates[bi],
            best_lambda2: config.lambda2_candidates[bj],
            best_index,
            mse_grid,
            rank: subspace.rank(),
            fold_size: partition.fold_size(),
            unassigned,
        })
    }

    /// Summed held-out squared error of grid cell `(i, j)` across all folds.
    fn score_cell(
        &self,
        subspace: &SourceSubspace<T>,
        target: &PartialMatrix<T>,
        partition: &FoldPartition,
        i: usize,
        j: usize,
    ) -> Result<T> {
        let factorizer = MatrixFactorizer::new(self.config.cell_config(i, j));
        let ncols = target.ncols();
        let mut total = T::zero();

        for (k, fold) in partition.folds().enumerate() {
            let masked = target.mask_linear_indices(fold)?;
            let fit = factorizer.fit_prepared(subspace, &masked, &mut NoOpObserver)?;
            let mut fold_error = T::zero();
            for &index in fold {
                let coords = linear_to_coords(index, ncols);
                if let Some(truth) = target.get(coords.0, coords.1) {
                    let diff = fit.estimate[coords] - truth;
                    fold_error += diff * diff;
                }
            }
            debug!(
                "cell ({i}, {j}) fold {k}: status={}, iterations={}, held-out error={fold_error}",
                fit.status,
                fit.iterations()
            );
            total += fold_error;
        }
        Ok(total)
    }
}
