// crates/fleetcheck-core/src/runtime/unit.rs
// ============================================================================
// Module: Fleetcheck Test Unit
// Description: State machine driving one binding through collection and evaluation.
// Purpose: Produce exactly one terminal result per binding, isolating all faults.
// Dependencies: tokio, crate::core, crate::interfaces, crate::runtime::session
// ============================================================================

//! ## Overview
//! A test unit executes one [`TestBinding`] against its bound device
//! session: `Pending -> Collecting -> Evaluating -> {Success, Failure,
//! Error, Skipped}`. Transitions are monotonic; a terminal state is never
//! left. Collection retries apply only to collection-step timeouts: the
//! unit abandons its wait (the in-flight call keeps running on the session)
//! and re-awaits the same cache slots on the next attempt.
//!
//! Invariants:
//! - A unit bound to an unreachable device transitions to `Error` without
//!   issuing any command.
//! - Captured command failures are terminal: collection stops at the first
//!   failed outcome and evaluation never runs.
//! - Check faults surface as `Error`, never as `Failure`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use tokio::time::timeout;

use crate::core::binding::TestBinding;
use crate::core::command::CommandOutcome;
use crate::core::command::CommandRequest;
use crate::core::result::TestResult;
use crate::core::result::TestStatus;
use crate::interfaces::Check;
use crate::interfaces::Verdict;
use crate::interfaces::payloads;
use crate::runtime::progress::ProgressEvent;
use crate::runtime::progress::ProgressSink;
use crate::runtime::session::DeviceSession;

// ============================================================================
// SECTION: Unit Phases
// ============================================================================

/// Execution phase of one test unit.
///
/// # Invariants
/// - Phases advance monotonically; `Terminal` is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitPhase {
    /// Binding exists; no I/O performed.
    Pending,
    /// Declared commands are being collected from the device session.
    Collecting,
    /// Collected payloads are being evaluated by check logic.
    Evaluating,
    /// The unit reached the given terminal status.
    Terminal(TestStatus),
}

// ============================================================================
// SECTION: Test Unit
// ============================================================================

/// Runtime instance executing one test binding.
///
/// # Invariants
/// - Mutated only by its own execution task.
/// - Produces exactly one [`TestResult`], after which it is consumed.
pub struct TestUnit {
    /// Immutable binding under execution.
    binding: TestBinding,
    /// Check logic for the binding.
    check: Arc<dyn Check>,
    /// Device session shared with sibling units on the same device.
    session: Arc<DeviceSession>,
    /// Current execution phase.
    phase: UnitPhase,
}

impl TestUnit {
    /// Creates a pending unit for the binding.
    #[must_use]
    pub const fn new(
        binding: TestBinding,
        check: Arc<dyn Check>,
        session: Arc<DeviceSession>,
    ) -> Self {
        Self {
            binding,
            check,
            session,
            phase: UnitPhase::Pending,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> UnitPhase {
        self.phase
    }

    /// Executes the unit to a terminal state and returns its result.
    ///
    /// Never fails: every fault is recovered into an `Error` result so the
    /// run summary stays complete.
    pub async fn run(mut self, progress: &ProgressSink) -> TestResult {
        let started = Instant::now();
        progress.emit(ProgressEvent::UnitStarted {
            device: self.binding.device.clone(),
            check: self.binding.check.clone(),
        });
        let (status, messages) = self.execute(progress).await;
        self.advance(progress, UnitPhase::Terminal(status));
        let duration = started.elapsed();
        progress.emit(ProgressEvent::UnitFinished {
            device: self.binding.device.clone(),
            check: self.binding.check.clone(),
            status,
            duration,
        });
        TestResult::new(
            self.binding.device,
            self.binding.check,
            status,
            messages,
            duration,
        )
    }

    /// Runs the phase sequence and returns the terminal status and messages.
    async fn execute(&mut self, progress: &ProgressSink) -> (TestStatus, Vec<String>) {
        if let Some(reason) = self.check.skip_reason(self.session.spec()) {
            return (TestStatus::Skipped, vec![reason]);
        }
        if let Err(failure) = self.session.connect().await {
            return (TestStatus::Error, vec![format!("device unreachable: {failure}")]);
        }

        self.advance(progress, UnitPhase::Collecting);
        let commands = match self.check.commands(&self.binding.params) {
            Ok(commands) => commands,
            Err(err) => return (TestStatus::Error, vec![err.to_string()]),
        };
        let outcomes = match self.collect_with_retry(&commands).await {
            Ok(outcomes) => outcomes,
            Err(message) => return (TestStatus::Error, vec![message]),
        };
        let outputs = match payloads(&outcomes) {
            Ok(outputs) => outputs,
            Err(failure) => return (TestStatus::Error, vec![failure.to_string()]),
        };

        self.advance(progress, UnitPhase::Evaluating);
        match self.check.evaluate(&self.binding.params, &outputs) {
            Ok(Verdict::Passing) => (TestStatus::Success, Vec::new()),
            Ok(Verdict::Failing(messages)) => (TestStatus::Failure, messages),
            Err(err) => (TestStatus::Error, vec![err.to_string()]),
        }
    }

    /// Collects all declared commands, retrying timed-out attempts.
    ///
    /// Each attempt awaits every command sequentially under one collection
    /// timeout. Abandoned waits leave the in-flight calls running, so a
    /// later attempt can be satisfied by the original call.
    async fn collect_with_retry(
        &self,
        commands: &[CommandRequest],
    ) -> Result<Vec<CommandOutcome>, String> {
        let policy = self.binding.policy;
        let attempts = policy.max_attempts.max(1);
        for _ in 0..attempts {
            match timeout(policy.collect_timeout, self.collect(commands)).await {
                Ok(outcomes) => return Ok(outcomes),
                Err(_) => continue,
            }
        }
        Err(format!(
            "collection timed out after {attempts} attempt(s) of {} ms",
            policy.collect_timeout.as_millis()
        ))
    }

    /// Awaits every declared command in declaration order.
    async fn collect(
        &self,
        commands: &[CommandRequest],
    ) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::with_capacity(commands.len());
        for request in commands {
            let outcome = self.session.execute(request).await;
            let failed = outcome.failure().is_some();
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        outcomes
    }

    /// Advances to a later phase and reports the transition.
    fn advance(&mut self, progress: &ProgressSink, phase: UnitPhase) {
        if matches!(self.phase, UnitPhase::Terminal(_)) {
            return;
        }
        self.phase = phase;
        progress.emit(ProgressEvent::UnitAdvanced {
            device: self.binding.device.clone(),
            check: self.binding.check.clone(),
            phase,
        });
    }
}
