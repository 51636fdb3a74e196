// crates/fleetcheck-core/src/core/command.rs
// ============================================================================
// Module: Fleetcheck Command Model
// Description: Command requests, cache keys, outcomes, and failure taxonomy.
// Purpose: Define the device communication contract shared by checks,
// sessions, and transports.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Checks declare [`CommandRequest`] values; sessions execute them through a
//! transport and cache the resulting [`CommandOutcome`] per [`CommandKey`].
//! Failures are typed and cloneable so a captured error is shared by every
//! unit reading the same cache entry without re-issuing the command.
//!
//! Invariants:
//! - [`CommandKey`] equality defines cache identity: same command text,
//!   output format, and API revision.
//! - Outcomes are immutable snapshots once cached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Response Format
// ============================================================================

/// Desired output format for a command.
///
/// # Invariants
/// - Variants are stable for serialization and cache identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Structured JSON output.
    Json,
    /// Raw text output wrapped in a JSON envelope.
    Text,
}

impl ResponseFormat {
    /// Returns the stable wire label for the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

// ============================================================================
// SECTION: Command Request
// ============================================================================

/// One command a check wants collected from a device.
///
/// # Invariants
/// - Immutable once declared by the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Command text submitted to the device.
    pub command: String,
    /// Desired output format.
    pub format: ResponseFormat,
    /// Optional API output revision.
    pub revision: Option<u32>,
}

impl CommandRequest {
    /// Creates a JSON-format command request without a revision pin.
    #[must_use]
    pub fn json(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            format: ResponseFormat::Json,
            revision: None,
        }
    }

    /// Creates a text-format command request.
    #[must_use]
    pub fn text(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            format: ResponseFormat::Text,
            revision: None,
        }
    }

    /// Pins the API output revision.
    #[must_use]
    pub const fn with_revision(mut self, revision: u32) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Returns the cache key for this request.
    #[must_use]
    pub fn key(&self) -> CommandKey {
        CommandKey {
            command: self.command.clone(),
            format: self.format,
            revision: self.revision,
        }
    }
}

// ============================================================================
// SECTION: Command Key
// ============================================================================

/// Cache identity of a command on one device.
///
/// # Invariants
/// - Two requests with equal keys must be satisfied by one remote call per run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandKey {
    /// Command text.
    pub command: String,
    /// Output format.
    pub format: ResponseFormat,
    /// Optional API output revision.
    pub revision: Option<u32>,
}

// ============================================================================
// SECTION: Command Failures
// ============================================================================

/// Typed failure for a command execution or connection attempt.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Values are cloneable so cached failures are shared across units.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandFailure {
    /// The device could not be reached.
    #[error("device unreachable: {0}")]
    Unreachable(String),
    /// The device rejected the command.
    #[error("command rejected: {command}: {reason}")]
    Rejected {
        /// Command text the device rejected.
        command: String,
        /// Reason reported by the device.
        reason: String,
    },
    /// The transport-level timeout elapsed before a response arrived.
    #[error("command timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout budget that elapsed, in milliseconds.
        timeout_ms: u64,
    },
    /// The transport failed or returned an unusable payload.
    #[error("transport failure: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Command Outcome
// ============================================================================

/// Cached outcome of one command on one device.
///
/// # Invariants
/// - Produced at most once per (device, key) pair per run.
/// - Failed outcomes are cached exactly like payloads; the cache layer never
///   retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Structured payload returned by the device.
    Payload(Value),
    /// Captured failure for the command.
    Failed(CommandFailure),
}

impl CommandOutcome {
    /// Returns the payload when the command succeeded.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match self {
            Self::Payload(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Returns the captured failure when the command failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&CommandFailure> {
        match self {
            Self::Payload(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}
