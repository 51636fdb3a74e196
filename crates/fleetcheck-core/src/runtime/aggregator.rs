// crates/fleetcheck-core/src/runtime/aggregator.rs
// ============================================================================
// Module: Fleetcheck Result Aggregator
// Description: Thread-safe, append-only collection of terminal test results.
// Purpose: Preserve completion order and guarantee nothing is silently dropped.
// Dependencies: std, crate::core
// ============================================================================

//! ## Overview
//! The aggregator is the single collection point for terminal results. It
//! records in completion order (tests finish out of plan order under
//! concurrency), interprets no check semantics, and has no side effects
//! beyond its own list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::PoisonError;

use crate::core::result::RunSummary;
use crate::core::result::TestResult;

// ============================================================================
// SECTION: Result Aggregator
// ============================================================================

/// Append-only, thread-safe collector of test results.
///
/// # Invariants
/// - Results are never reordered or removed once recorded.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    /// Recorded results in completion order.
    results: Mutex<Vec<TestResult>>,
}

impl ResultAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one terminal result.
    pub fn record(&self, result: TestResult) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    /// Returns the number of recorded results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the immutable summary of everything recorded so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(
            self.results.lock().unwrap_or_else(PoisonError::into_inner).clone(),
        )
    }
}
