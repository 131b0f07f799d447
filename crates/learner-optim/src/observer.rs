//! Iteration observers for the factorization loop.
//!
//! Observers see every completed iteration but cannot alter the run.

use learner_core::types::Scalar;

/// Information passed to observers after each iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationInfo<T> {
    /// Zero-based iteration index
    pub iteration: usize,
    /// Objective after the step
    pub objective: T,
    /// Lowest objective seen so far, initial point included
    pub best_objective: T,
}

/// Trait for monitoring a factorization run.
pub trait FitObserver<T: Scalar> {
    /// Called once before the first step with the warm-start objective.
    fn on_start(&mut self, initial_objective: T) {
        let _ = initial_objective;
    }

    /// Called at the end of each iteration.
    fn on_iteration(&mut self, info: &IterationInfo<T>);
}

/// An observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl<T: Scalar> FitObserver<T> for NoOpObserver {
    fn on_iteration(&mut self, _info: &IterationInfo<T>) {}
}

/// An observer that records every iteration.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver<T> {
    /// Objective of the warm start
    pub initial_objective: Option<T>,
    /// One entry per completed iteration
    pub iterations: Vec<IterationInfo<T>>,
}

impl<T: Scalar> RecordingObserver<T> {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            initial_objective: None,
            iterations: Vec::new(),
        }
    }

    /// Sequence of best-so-far objectives, one per iteration.
    pub fn best_objectives(&self) -> Vec<T> {
        self.iterations.iter().map(|info| info.best_objective).collect()
    }
}

impl<T: Scalar> FitObserver<T> for RecordingObserver<T> {
    fn on_start(&mut self, initial_objective: T) {
        self.initial_objective = Some(initial_objective);
    }

    fn on_iteration(&mut self, info: &IterationInfo<T>) {
        self.iterations.push(*info);
    }
}
