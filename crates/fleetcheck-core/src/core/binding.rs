// crates/fleetcheck-core/src/core/binding.rs
// ============================================================================
// Module: Fleetcheck Test Bindings
// Description: Catalog entries, device filters, planned bindings, and policies.
// Purpose: Capture the immutable inputs of one planned test unit.
// Dependencies: serde, serde_json, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A [`CatalogEntry`] is one check plus its input parameters and an optional
//! device filter, as produced by the external catalog. Plan building expands
//! entries into [`TestBinding`] values, one per (check, device) pair. Both
//! are immutable once the plan exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::CheckId;
use crate::core::identifiers::DeviceName;

// ============================================================================
// SECTION: Device Filter
// ============================================================================

/// Restricts a catalog entry to a subset of the inventory.
///
/// # Invariants
/// - `All` broadcasts the entry to every inventory device.
/// - `Devices` names must exist in the inventory; plan building rejects
///   unknown names as a fatal setup error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", untagged)]
pub enum DeviceFilter {
    /// Entry applies to every device in the inventory.
    All,
    /// Entry applies only to the named devices.
    Devices(Vec<DeviceName>),
}

impl DeviceFilter {
    /// Returns true when the filter admits the named device.
    #[must_use]
    pub fn admits(&self, device: &DeviceName) -> bool {
        match self {
            Self::All => true,
            Self::Devices(names) => names.contains(device),
        }
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::All
    }
}

// ============================================================================
// SECTION: Policies
// ============================================================================

/// Default collection timeout for one attempt of a unit's collection phase.
pub const DEFAULT_COLLECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum collection attempts per unit.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Default bound on simultaneously in-flight test units.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 32;

/// Per-unit timeout and retry policy.
///
/// # Invariants
/// - `max_attempts` is at least 1; zero is normalized to 1 at use sites.
/// - Retries apply only to collection-step timeouts; failures captured by
///   the session cache are terminal for every reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPolicy {
    /// Timeout budget for one attempt of the collection phase.
    pub collect_timeout: Duration,
    /// Maximum collection attempts before the unit errors out.
    pub max_attempts: u32,
}

impl Default for UnitPolicy {
    fn default() -> Self {
        Self {
            collect_timeout: DEFAULT_COLLECT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Run-wide execution policy for the scheduler.
///
/// # Invariants
/// - `limit` is the only admission-control mechanism; it is enforced even
///   though devices are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPolicy {
    /// Maximum number of simultaneously in-flight test units.
    pub limit: usize,
    /// Optional overall run deadline.
    pub deadline: Option<Duration>,
    /// Default per-unit policy for bindings without an override.
    pub unit: UnitPolicy,
    /// Build and validate the plan without executing it.
    pub dry_run: bool,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CONCURRENCY_LIMIT,
            deadline: None,
            unit: UnitPolicy::default(),
            dry_run: false,
        }
    }
}

// ============================================================================
// SECTION: Catalog Entry
// ============================================================================

/// One catalog entry: a check bound to parameters and a device filter.
///
/// # Invariants
/// - Immutable once consumed by plan building.
/// - `params` is opaque to the engine; only the check interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Check identifier to execute.
    pub check: CheckId,
    /// Check input parameters.
    pub params: Value,
    /// Devices the entry applies to.
    #[serde(default)]
    pub filter: DeviceFilter,
    /// Optional per-unit policy override.
    pub policy: Option<UnitPolicy>,
}

impl CatalogEntry {
    /// Creates a broadcast entry with the provided parameters.
    #[must_use]
    pub fn new(check: impl Into<CheckId>, params: Value) -> Self {
        Self {
            check: check.into(),
            params,
            filter: DeviceFilter::All,
            policy: None,
        }
    }

    /// Restricts the entry to the named devices.
    #[must_use]
    pub fn with_filter(mut self, filter: DeviceFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Overrides the per-unit policy for this entry.
    #[must_use]
    pub const fn with_policy(mut self, policy: UnitPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

// ============================================================================
// SECTION: Test Binding
// ============================================================================

/// One planned (check, device, parameters) combination.
///
/// # Invariants
/// - Immutable once the plan is built.
/// - Produces exactly one test result per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestBinding {
    /// Check identifier to execute.
    pub check: CheckId,
    /// Target device name.
    pub device: DeviceName,
    /// Check input parameters.
    pub params: Value,
    /// Effective per-unit policy (entry override or run default).
    pub policy: UnitPolicy,
}
