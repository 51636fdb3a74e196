// crates/fleetcheck-core/src/core/result.rs
// ============================================================================
// Module: Fleetcheck Results
// Description: Terminal test statuses, per-unit results, and run summaries.
// Purpose: Capture the immutable outcome of every planned test unit.
// Dependencies: serde, time, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A [`TestResult`] is the terminal, immutable snapshot of one test unit.
//! The [`RunSummary`] holds every result in completion order together with
//! per-status counts; it is append-only during the run and read-only after.
//!
//! Invariants:
//! - One result per planned binding, produced exactly once.
//! - Result order is completion order, not plan order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::CheckId;
use crate::core::identifiers::DeviceName;

// ============================================================================
// SECTION: Test Status
// ============================================================================

/// Terminal status of one test unit.
///
/// # Invariants
/// - Variants are stable for serialization and exit-code mapping.
/// - `Error` is never conflated with `Failure`: an assertion that the device
///   state violates expectations is `Failure`; everything else is `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Evaluation ran and the device state matches expectations.
    Success,
    /// Evaluation ran and the device state violates expectations.
    Failure,
    /// A non-assertion fault occurred: connectivity, rejection, timeout, or
    /// an unexpected fault inside check logic.
    Error,
    /// The binding declared inapplicability before any I/O.
    Skipped,
}

impl TestStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 4] = [Self::Success, Self::Failure, Self::Error, Self::Skipped];

    /// Returns the stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }

    /// Returns true when the status counts toward a passing run.
    #[must_use]
    pub const fn is_passing(self) -> bool {
        matches!(self, Self::Success | Self::Skipped)
    }
}

// ============================================================================
// SECTION: Test Result
// ============================================================================

/// Terminal, immutable snapshot of one executed test unit.
///
/// # Invariants
/// - Produced exactly once per planned binding.
/// - `messages` always carries at least one entry for `Error` results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Target device name.
    pub device: DeviceName,
    /// Check identifier.
    pub check: CheckId,
    /// Terminal status.
    pub status: TestStatus,
    /// Result messages (failure reasons, error details, skip reason).
    pub messages: Vec<String>,
    /// Wall-clock duration from unit start to terminal state.
    pub duration: Duration,
    /// Unix timestamp (seconds) at completion.
    pub completed_at: i64,
}

impl TestResult {
    /// Creates a result completed now with the provided fields.
    #[must_use]
    pub fn new(
        device: DeviceName,
        check: CheckId,
        status: TestStatus,
        messages: Vec<String>,
        duration: Duration,
    ) -> Self {
        Self {
            device,
            check,
            status,
            messages,
            duration,
            completed_at: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Ordered collection of all test results for one run.
///
/// # Invariants
/// - Insertion order equals completion order.
/// - Counts are derived from the result list and always consistent with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Results in completion order.
    results: Vec<TestResult>,
}

impl RunSummary {
    /// Creates a summary from results already in completion order.
    #[must_use]
    pub const fn from_results(results: Vec<TestResult>) -> Self {
        Self {
            results,
        }
    }

    /// Returns the results in completion order.
    #[must_use]
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Returns the total number of results.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.results.len()
    }

    /// Returns the number of results with the provided status.
    #[must_use]
    pub fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|result| result.status == status).count()
    }

    /// Returns true when no result is a failure or an error.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|result| result.status.is_passing())
    }

    /// Returns a one-line totals description for reporting.
    #[must_use]
    pub fn totals_line(&self) -> String {
        let counts: Vec<String> = TestStatus::ALL
            .iter()
            .map(|status| format!("{} {}", self.count(*status), status.as_str()))
            .collect();
        format!("{} results: {}", self.total(), counts.join(", "))
    }
}
