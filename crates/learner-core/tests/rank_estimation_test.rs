//! Integration tests for rank estimation and resolution.

use learner_core::prelude::*;
use rand::prelude::*;
use rand_distr::Normal;

fn low_rank_plus_noise(rows: usize, cols: usize, rank: usize, noise: f64, seed: u64) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let left = DMatrix::from_fn(rows, rank, |_, _| rng.sample(normal));
    let right = DMatrix::from_fn(cols, rank, |_, _| rng.sample(normal));
    let signal = &left * right.transpose();
    signal.map(|v| v + noise * rng.sample(normal))
}

#[test]
fn test_hard_threshold_recovers_planted_rank() {
    let matrix = low_rank_plus_noise(60, 40, 3, 0.1, 1636);
    let max_rank = default_max_rank::<f64>(60, 40);
    let estimated = HardThresholdRankEstimator::new()
        .estimate_rank(&matrix, max_rank)
        .unwrap();
    assert_eq!(estimated, 3);
}

#[test]
fn test_estimate_capped_by_max_rank() {
    let matrix = low_rank_plus_noise(30, 30, 8, 0.01, 2);
    let estimated = HardThresholdRankEstimator::new().estimate_rank(&matrix, 4.7).unwrap();
    assert_eq!(estimated, 4);
}

#[test]
fn test_resolution_floors_zero_estimate() {
    let zeros = DMatrix::<f64>::zeros(9, 6);
    let rank = resolve_rank(None, &zeros, &HardThresholdRankEstimator::new()).unwrap();
    assert_eq!(rank, 1);
}

#[test]
fn test_explicit_rank_bypasses_estimator() {
    let matrix = low_rank_plus_noise(12, 12, 2, 0.1, 9);
    assert_eq!(resolve_rank(Some(7), &matrix, &FixedRank(2)).unwrap(), 7);
    assert_eq!(resolve_rank(None, &matrix, &FixedRank(2)).unwrap(), 2);
    assert!(resolve_rank(Some(0), &matrix, &FixedRank(2)).unwrap_err().is_invalid_input());
}

#[test]
fn test_estimator_as_trait_object() {
    let matrix = low_rank_plus_noise(15, 9, 1, 0.05, 4);
    let estimators: Vec<Box<dyn RankEstimator<f64>>> =
        vec![Box::new(FixedRank(5)), Box::new(HardThresholdRankEstimator::new())];
    let ranks: Vec<usize> = estimators
        .iter()
        .map(|estimator| resolve_rank(None, &matrix, estimator.as_ref()).unwrap())
        .collect();
    assert_eq!(ranks, vec![5, 1]);
}
