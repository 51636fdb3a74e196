// crates/fleetcheck-core/src/interfaces/mod.rs
// ============================================================================
// Module: Fleetcheck Interfaces
// Description: Backend-agnostic interfaces for checks and device transports.
// Purpose: Define the contract surfaces the engine depends on.
// Dependencies: async-trait, serde_json, thiserror, crate::core
// ============================================================================

//! ## Overview
//! The engine never depends on concrete check types or transport
//! implementations. Checks declare the commands they need and evaluate the
//! collected payloads; transports turn a command request into a structured
//! payload or a typed failure. Both must isolate their faults: a check or
//! transport error is recovered into one test result and never aborts
//! sibling units.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::command::CommandFailure;
use crate::core::command::CommandOutcome;
use crate::core::command::CommandRequest;
use crate::core::device::DeviceSpec;
use crate::core::identifiers::CheckId;

// ============================================================================
// SECTION: Check Errors
// ============================================================================

/// Non-assertion faults raised by check logic.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A check error always maps to an `Error` status, never to `Failure`.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The input parameters do not match the check's input model.
    #[error("invalid check input: {0}")]
    InvalidInput(String),
    /// A collected payload did not have the expected shape.
    #[error("unexpected payload shape: {0}")]
    PayloadShape(String),
    /// An unexpected fault occurred inside check logic.
    #[error("check fault: {0}")]
    Fault(String),
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Outcome of a completed evaluation.
///
/// # Invariants
/// - `Failing` carries at least one human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The collected state matches expectations.
    Passing,
    /// The collected state violates expectations.
    Failing(Vec<String>),
}

// ============================================================================
// SECTION: Check Interface
// ============================================================================

/// One pluggable verification rule.
///
/// Implementations declare the commands they need up front and evaluate the
/// collected outcomes afterwards; they never perform I/O themselves.
pub trait Check: Send + Sync {
    /// Returns the stable check identifier.
    fn id(&self) -> CheckId;

    /// Returns a skip reason when the check does not apply to the device.
    ///
    /// Called before any I/O; a `Some` return short-circuits the unit to
    /// `Skipped` without connecting.
    fn skip_reason(&self, device: &DeviceSpec) -> Option<String> {
        let _ = device;
        None
    }

    /// Declares the commands to collect for the provided parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] when the parameters are invalid.
    fn commands(&self, params: &Value) -> Result<Vec<CommandRequest>, CheckError>;

    /// Evaluates the collected outcomes against the parameters.
    ///
    /// `outputs` holds one successful payload per declared command, in
    /// declaration order; the unit never invokes evaluation with captured
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] on unexpected faults; the unit records them as
    /// `Error`, never as `Failure`.
    fn evaluate(&self, params: &Value, outputs: &[Value]) -> Result<Verdict, CheckError>;
}

// ============================================================================
// SECTION: Check Lookup
// ============================================================================

/// Resolves catalog check identifiers to check implementations.
///
/// Plan building depends only on this seam; the registry of concrete checks
/// lives outside the engine.
pub trait CheckLookup {
    /// Returns the check registered under the identifier, if any.
    fn lookup(&self, id: &CheckId) -> Option<Arc<dyn Check>>;
}

// ============================================================================
// SECTION: Command Transport
// ============================================================================

/// Device communication contract: submit command, get structured result.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Probes connectivity to the device.
    ///
    /// # Errors
    ///
    /// Returns [`CommandFailure`] when the device cannot be reached.
    async fn connect(&self, device: &DeviceSpec) -> Result<(), CommandFailure>;

    /// Executes one command under the device's transport timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CommandFailure`] when the device is unreachable, rejects
    /// the command, or the response times out.
    async fn execute(
        &self,
        device: &DeviceSpec,
        request: &CommandRequest,
    ) -> Result<Value, CommandFailure>;
}

// ============================================================================
// SECTION: Outcome Helpers
// ============================================================================

/// Splits collected outcomes into payloads, or the first captured failure.
///
/// # Errors
///
/// Returns the first [`CommandFailure`] found, preserving declaration order.
pub fn payloads(outcomes: &[CommandOutcome]) -> Result<Vec<Value>, CommandFailure> {
    let mut values = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            CommandOutcome::Payload(value) => values.push(value.clone()),
            CommandOutcome::Failed(failure) => return Err(failure.clone()),
        }
    }
    Ok(values)
}
