//! Worker pool helpers.
//!
//! The grid search is the only place where work fans out. It runs inside a
//! dedicated Rayon pool sized by the caller so that `n_cores` is honoured
//! regardless of the global pool configuration.

use crate::error::{LearnerError, Result};
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Maximum degree of parallelism available to the runtime.
///
/// Informational only; always at least 1.
pub fn max_parallelism() -> usize {
    num_cpus::get().max(1)
}

/// Builds a pool of exactly `n_cores` workers.
pub fn build_pool(n_cores: usize) -> Result<ThreadPool> {
    if n_cores == 0 {
        return Err(LearnerError::invalid_input("n_cores must be at least 1"));
    }
    debug!("building worker pool with {n_cores} threads");
    let pool = ThreadPoolBuilder::new()
        .num_threads(n_cores)
        .thread_name(|index| format!("learner-cv-{index}"))
        .build()?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_parallelism_positive() {
        assert!(max_parallelism() >= 1);
    }

    #[test]
    fn test_pool_size() {
        let pool = build_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
        assert!(build_pool(0).unwrap_err().is_invalid_input());
    }
}
