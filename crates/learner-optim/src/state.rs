//! Best-iterate tracking for non-monotonic descent.

use crate::subspace::FactorPair;
use learner_core::types::Scalar;

/// Factor pair with the lowest objective seen so far.
///
/// The working iterate of the descent may get worse from one step to the
/// next; the estimate handed back to callers is always built from this
/// retained pair.
#[derive(Debug, Clone)]
pub struct BestIterate<T: Scalar> {
    objective: T,
    factors: FactorPair<T>,
    iteration: Option<usize>,
}

impl<T: Scalar> BestIterate<T> {
    /// Starts tracking from the initial point and its objective.
    pub fn new(objective: T, factors: FactorPair<T>) -> Self {
        Self {
            objective,
            factors,
            iteration: None,
        }
    }

    /// Offers the iterate produced at `iteration`; keeps it if strictly better.
    ///
    /// Returns `true` when the offered pair replaced the retained one.
    pub fn offer(&mut self, iteration: usize, objective: T, factors: &FactorPair<T>) -> bool {
        if objective < self.objective {
            self.objective = objective;
            self.factors.clone_from(factors);
            self.iteration = Some(iteration);
            true
        } else {
            false
        }
    }

    /// Lowest objective seen so far.
    pub fn objective(&self) -> T {
        self.objective
    }

    /// Iteration that produced the retained pair; `None` for the initial point.
    pub fn iteration(&self) -> Option<usize> {
        self.iteration
    }

    /// The retained factor pair.
    pub fn factors(&self) -> &FactorPair<T> {
        &self.factors
    }

    /// Consumes the tracker, returning the retained pair.
    pub fn into_factors(self) -> FactorPair<T> {
        self.factors
    }
}
