//! Generic execution strategies
//!
//! This module only knows how to run a slice of work items, either in order on
//! the calling thread or on a bounded pool of scoped worker threads fed by a
//! crossbeam channel. It knows nothing about work units, outcomes or failure
//! policy; the orchestrator layers those on top.
//!
//! ```text
//!   producer ──► work channel ──► worker-0..N ──► result channel ──► collector
//!                 (bounded)                        (bounded)          (caller's thread)
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use batchrun::parallel::{ExecutionStrategy, ParallelExecutor, SequentialExecutor};
//!
//! let items = vec![1, 2, 3, 4, 5];
//!
//! // In order, stopping after the first even result
//! let results = SequentialExecutor::execute(&items, |x, _| x * 3, |r| r % 2 == 0);
//! assert_eq!(results, vec![3, 6]);
//!
//! // Bounded pool, results in completion order
//! let ExecutionStrategy::Parallel { workers } = ExecutionStrategy::parallel(items.len(), 4) else {
//!     unreachable!()
//! };
//! let results = ParallelExecutor::new(workers)
//!     .execute(&items, |x, _| x * 3, |_, _, _| {})
//!     .unwrap();
//! assert_eq!(results.len(), 5);
//! ```

pub mod core;

// Re-export main types for easier access
pub use self::core::{ExecutionStrategy, ParallelExecutor, SequentialExecutor};
