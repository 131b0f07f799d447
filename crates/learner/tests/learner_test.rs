//! End-to-end tests of the public entry points.

use approx::assert_relative_eq;
use learner::prelude::*;
use nalgebra::dmatrix;
use pretty_assertions::assert_eq;
use rand::prelude::*;
use rand_distr::Normal;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rank_one() -> DMatrix<f64> {
    dmatrix![
        1.0, 2.0, 3.0, 4.0;
        2.0, 4.0, 6.0, 8.0;
        3.0, 6.0, 9.0, 12.0;
        4.0, 8.0, 12.0, 16.0
    ]
}

/// Rank-2 signal shared by source and target with independent noise.
fn transfer_pair(rows: usize, cols: usize, seed: u64) -> (DMatrix<f64>, DMatrix<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let left = DMatrix::from_fn(rows, 2, |_, _| rng.sample(normal));
    let right = DMatrix::from_fn(cols, 2, |_, _| rng.sample(normal));
    let signal = &left * right.transpose();
    let source = signal.map(|v| v + 0.05 * rng.sample(normal));
    let target = signal.map(|v| v + 0.5 * rng.sample(normal));
    (source, target)
}

#[test]
fn test_rank_one_scenario() {
    init_logging();
    let source = rank_one();
    let target = PartialMatrix::fully_observed(source.clone());
    let config = FactorizerConfig::new(0.0, 0.0, 1e-4);
    let fit = learner::fit(&source, &target, Some(1), &config).unwrap();

    assert_eq!(fit.convergence_status, ConvergenceStatus::Converged);
    assert_eq!(fit.rank_used, 1);
    assert_eq!(fit.objective_trajectory.len(), 2);
    assert_relative_eq!(fit.estimate, source, epsilon = 1e-10);
}

#[test]
fn test_cross_validation_scenario() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(10);
    let source = DMatrix::from_fn(10, 10, |_, _| rng.gen::<f64>());
    let target = PartialMatrix::fully_observed(DMatrix::from_fn(10, 10, |_, _| rng.gen::<f64>()));
    let config = CrossValidationConfig::new(vec![0.0, 1.0], vec![0.0, 1.0], 0.01).with_n_folds(2);
    let cv = learner::cross_validate(&source, &target, Some(2), &config).unwrap();

    assert_eq!(cv.mse_grid.shape(), (2, 2));
    assert!(cv.mse_grid.iter().all(|&v| v >= 0.0));

    let mut expected = (0, 0);
    for i in 0..2 {
        for j in 0..2 {
            if cv.mse_grid[(i, j)] < cv.mse_grid[expected] {
                expected = (i, j);
            }
        }
    }
    assert_eq!(cv.best_index, expected);
    assert_eq!(cv.best_lambda1, config.lambda1_candidates[expected.0]);
    assert_eq!(cv.best_lambda2, config.lambda2_candidates[expected.1]);
}

#[test]
fn test_missing_source_rejected_by_every_entry_point() {
    let mut source = rank_one();
    source[(1, 2)] = f64::NAN;
    let target = PartialMatrix::fully_observed(rank_one());

    let fit = learner::fit(&source, &target, Some(1), &FactorizerConfig::new(1.0, 1.0, 0.01));
    assert!(fit.unwrap_err().is_invalid_input());

    let cv = learner::cross_validate(
        &source,
        &target,
        None,
        &CrossValidationConfig::new(vec![1.0], vec![1.0], 0.01),
    );
    assert!(cv.unwrap_err().is_invalid_input());

    let projection = learner::direct_projection(&source, &rank_one(), Some(1));
    assert!(projection.unwrap_err().is_invalid_input());
}

#[test]
fn test_dimension_mismatch_rejected() {
    let source = rank_one();
    let target = PartialMatrix::fully_observed(DMatrix::<f64>::zeros(4, 3));
    let err = learner::fit(&source, &target, Some(1), &FactorizerConfig::new(1.0, 1.0, 0.01)).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("same dimensions"));
}

#[test]
fn test_zero_rank_rejected() {
    let source = rank_one();
    let target = PartialMatrix::fully_observed(source.clone());
    let err = learner::fit(&source, &target, Some(0), &FactorizerConfig::new(1.0, 1.0, 0.01)).unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn test_estimated_rank_is_at_least_one_and_bounded() {
    let (source, target) = transfer_pair(30, 12, 4);
    let target = PartialMatrix::fully_observed(target);
    let fit = learner::fit(&source, &target, None, &FactorizerConfig::new(1.0, 1.0, 0.01)).unwrap();

    assert!(fit.rank_used >= 1);
    assert!(fit.rank_used <= 12 / 3);
    assert_eq!(fit.estimate.shape(), (30, 12));
}

#[test]
fn test_custom_estimator_is_consulted_only_without_rank() {
    let (source, target) = transfer_pair(9, 9, 5);
    let target = PartialMatrix::fully_observed(target);
    let learner = Learner::with_estimator(FixedRank(3));
    let config = FactorizerConfig::new(0.5, 0.5, 0.01).with_max_iter(20);

    assert_eq!(learner.fit(&source, &target, None, &config).unwrap().rank_used, 3);
    assert_eq!(learner.fit(&source, &target, Some(2), &config).unwrap().rank_used, 2);

    // An estimate of zero is floored at one.
    let floor = Learner::with_estimator(FixedRank(0));
    assert_eq!(floor.fit(&source, &target, None, &config).unwrap().rank_used, 1);
}

#[test]
fn test_rank_above_available_components_is_capped() {
    let (source, target) = transfer_pair(6, 4, 6);
    let target = PartialMatrix::fully_observed(target);
    let fit = learner::fit(&source, &target, Some(10), &FactorizerConfig::new(1.0, 1.0, 0.01)).unwrap();
    assert_eq!(fit.rank_used, 4);

    let projection = learner::direct_projection(&source, target.values(), Some(10)).unwrap();
    assert_eq!(projection.rank_used, 4);
}

#[test]
fn test_direct_projection_recovers_shared_subspace() {
    let (source, target) = transfer_pair(40, 20, 7);
    let projection = learner::direct_projection(&source, &target, Some(2)).unwrap();
    assert_eq!(projection.estimate.shape(), (40, 20));

    // Projecting the projection changes nothing.
    let again = learner::direct_projection(&source, &projection.estimate, Some(2)).unwrap();
    assert_relative_eq!(again.estimate, projection.estimate, epsilon = 1e-8);
}

#[test]
fn test_fit_with_missing_entries_fills_every_cell() {
    init_logging();
    let (source, mut values) = transfer_pair(15, 10, 8);
    for k in 0..15 {
        values[(k, k % 10)] = f64::NAN;
    }
    let target = PartialMatrix::from_nan_sentinel(values);
    assert_eq!(target.observed_count(), 135);

    let mut observer = RecordingObserver::new();
    let fit = Learner::new()
        .fit_observed(
            &source,
            &target,
            Some(2),
            &FactorizerConfig::new(1.0, 1.0, 0.01),
            &mut observer,
        )
        .unwrap();

    assert!(fit.estimate.iter().all(|v| v.is_finite()));
    assert_eq!(observer.iterations.len(), fit.objective_trajectory.len());
    assert!(fit.best_objective <= observer.initial_objective.unwrap());
}
