// crates/fleetcheck-core/src/core/device.rs
// ============================================================================
// Module: Fleetcheck Device Descriptors
// Description: Connection parameters and reachability for inventory devices.
// Purpose: Describe one device for session construction and transport calls.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A [`DeviceSpec`] carries everything a transport needs to reach one
//! device. The engine never interprets the endpoint string; transports own
//! its meaning. Reachability is a run-scoped observation memoized by the
//! device session, never a persistent attribute.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DeviceName;

// ============================================================================
// SECTION: Device Specification
// ============================================================================

/// Default per-command transport timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters for one inventory device.
///
/// # Invariants
/// - `endpoint` is opaque to the engine; only the transport interprets it.
/// - The descriptor is immutable once the plan is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Device name, unique within the inventory.
    pub name: DeviceName,
    /// Management endpoint (typically a base URL).
    pub endpoint: String,
    /// Username for management-plane authentication.
    pub username: String,
    /// Password for management-plane authentication.
    pub password: String,
    /// Per-command transport timeout.
    pub timeout: Duration,
}

impl DeviceSpec {
    /// Creates a device specification with the default command timeout.
    #[must_use]
    pub fn new(
        name: impl Into<DeviceName>,
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Overrides the per-command transport timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// SECTION: Reachability
// ============================================================================

/// Run-scoped reachability of one device.
///
/// # Invariants
/// - Transitions only from `Unknown` to `Reachable` or `Unreachable`;
///   the session never moves a device back to `Unknown` within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    /// No connection attempt has completed yet.
    Unknown,
    /// The device answered the connection probe.
    Reachable,
    /// The connection probe failed; no commands will be issued.
    Unreachable,
}
