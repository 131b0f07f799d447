//! Convergence status and the stopping rule of the factorization loop.
//!
//! After every iteration beyond the first, the new objective is compared
//! with the objective of the previous iteration:
//!
//! 1. `|obj_t − obj_{t−1}| < threshold` stops with [`ConvergenceStatus::Converged`];
//! 2. otherwise `obj_t > max_value · obj_{t−1}` stops with
//!    [`ConvergenceStatus::Diverged`].
//!
//! The divergence guard slides with the iterations: it compares consecutive
//! objectives, never the initial one. A non-finite objective is treated as
//! divergence at any iteration.

use learner_core::{config::ControlConfig, types::Scalar};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Terminal reason of a single factorization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConvergenceStatus {
    /// Consecutive objectives differed by less than the threshold
    Converged,
    /// The iteration budget was exhausted
    MaxIterationsReached,
    /// The objective grew by more than the allowed ratio in one step
    Diverged,
}

impl ConvergenceStatus {
    /// Legacy integer encoding: 1 converged, 2 budget exhausted, 3 diverged.
    pub fn code(self) -> u8 {
        match self {
            Self::Converged => 1,
            Self::MaxIterationsReached => 2,
            Self::Diverged => 3,
        }
    }

    /// Inverse of [`ConvergenceStatus::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Converged),
            2 => Some(Self::MaxIterationsReached),
            3 => Some(Self::Diverged),
            _ => None,
        }
    }

    /// Returns `true` only for [`ConvergenceStatus::Converged`].
    pub fn is_converged(self) -> bool {
        matches!(self, Self::Converged)
    }
}

impl fmt::Display for ConvergenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Converged => "converged",
            Self::MaxIterationsReached => "max-iterations-reached",
            Self::Diverged => "diverged",
        };
        f.write_str(label)
    }
}

/// Dual stopping rule on consecutive objective values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoppingRule<T> {
    /// Objective change below which the run has converged
    pub threshold: T,
    /// Ratio to the previous objective above which the run has diverged
    pub max_value: T,
}

impl<T: Scalar> StoppingRule<T> {
    /// Creates a stopping rule.
    pub fn new(threshold: T, max_value: T) -> Self {
        Self {
            threshold,
            max_value,
        }
    }

    /// Stopping rule with the thresholds of a control configuration.
    pub fn from_control(control: &ControlConfig<T>) -> Self {
        Self::new(control.threshold, control.max_value)
    }

    /// Decides whether the run stops after `iteration` (zero-based).
    ///
    /// `previous` is the objective before the step, `current` the objective
    /// after it. Returns `None` to continue.
    ///
    /// A non-finite `current` stops with [`ConvergenceStatus::Diverged`] even
    /// on the first iteration, where the two comparisons are skipped. Left to
    /// the comparisons alone, a NaN objective fails both of them and the run
    /// would keep stepping until `max_iter`.
    pub fn check(&self, iteration: usize, previous: T, current: T) -> Option<ConvergenceStatus> {
        if !current.is_finite() {
            return Some(ConvergenceStatus::Diverged);
        }
        if iteration == 0 {
            return None;
        }
        if (current - previous).abs() < self.threshold {
            return Some(ConvergenceStatus::Converged);
        }
        if current > self.max_value * previous {
            return Some(ConvergenceStatus::Diverged);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        for status in [
            ConvergenceStatus::Converged,
            ConvergenceStatus::MaxIterationsReached,
            ConvergenceStatus::Diverged,
        ] {
            assert_eq!(ConvergenceStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ConvergenceStatus::Converged.code(), 1);
        assert_eq!(ConvergenceStatus::Diverged.code(), 3);
        assert_eq!(ConvergenceStatus::from_code(0), None);
        assert_eq!(ConvergenceStatus::MaxIterationsReached.to_string(), "max-iterations-reached");
    }

    #[test]
    fn test_first_iteration_never_stops_on_finite_values() {
        let rule = StoppingRule::new(1e-3, 10.0);
        assert_eq!(rule.check(0, 5.0, 5.0), None);
        assert_eq!(rule.check(0, 1.0, 1e6), None);
    }

    #[test]
    fn test_convergence_takes_precedence() {
        let rule = StoppingRule::new(1e-3, 10.0);
        assert_eq!(rule.check(3, 2.0, 2.0005), Some(ConvergenceStatus::Converged));
        // Tiny objectives: both rules fire, convergence wins.
        assert_eq!(rule.check(3, 1e-6, 1e-4), Some(ConvergenceStatus::Converged));
    }

    #[test]
    fn test_divergence_relative_to_previous() {
        let rule = StoppingRule::new(1e-3, 10.0);
        assert_eq!(rule.check(1, 2.0, 21.0), Some(ConvergenceStatus::Diverged));
        assert_eq!(rule.check(1, 2.0, 19.0), None);
        // Growth from a large previous objective is tolerated.
        assert_eq!(rule.check(5, 100.0, 900.0), None);
    }

    #[test]
    fn test_non_finite_objective_diverges() {
        let rule = StoppingRule::new(1e-3, 10.0);
        assert_eq!(rule.check(0, 1.0, f64::NAN), Some(ConvergenceStatus::Diverged));
        assert_eq!(rule.check(4, 1.0, f64::INFINITY), Some(ConvergenceStatus::Diverged));
        // A finite blow-up on the first iteration is only recorded.
        assert_eq!(rule.check(0, 1.0, 1e9), None);
    }
}
