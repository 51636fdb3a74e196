// crates/fleetcheck-config/src/inventory.rs
// ============================================================================
// Module: Inventory Loading
// Description: Loads and validates the device inventory YAML file.
// Purpose: Produce connection-ready device specs for the engine.
// Dependencies: fleetcheck-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! The inventory file lists the devices a run targets. Each entry carries the
//! management address and credentials; the loader derives the HTTPS endpoint
//! and enforces that the inventory is non-empty with unique device names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use fleetcheck_core::DeviceSpec;
use serde::Deserialize;

use crate::error::ConfigError;

// ============================================================================
// SECTION: File Model
// ============================================================================

/// Top-level inventory file shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InventoryFile {
    /// Devices the run targets.
    devices: Vec<DeviceEntry>,
}

/// One inventory device entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceEntry {
    /// Unique device name used in results and filters.
    name: String,
    /// Management hostname or address.
    host: String,
    /// API username.
    username: String,
    /// API password.
    password: String,
    /// Management API port.
    #[serde(default = "default_port")]
    port: u16,
    /// Per-command transport timeout in seconds.
    timeout_s: Option<u64>,
}

/// Default management API port.
const fn default_port() -> u16 {
    443
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates the inventory file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed, the
/// inventory is empty, or device names collide.
pub fn load_inventory(path: &Path) -> Result<Vec<DeviceSpec>, ConfigError> {
    let label = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: label.clone(),
        source,
    })?;
    let file: InventoryFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: label.clone(),
        source,
    })?;

    if file.devices.is_empty() {
        return Err(ConfigError::Invalid {
            path: label,
            reason: "inventory must list at least one device".to_string(),
        });
    }
    let mut seen = BTreeSet::new();
    for entry in &file.devices {
        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::Invalid {
                path: label,
                reason: format!("duplicate device name: {}", entry.name),
            });
        }
    }

    Ok(file.devices.into_iter().map(device_spec).collect())
}

/// Converts one file entry into an engine device spec.
fn device_spec(entry: DeviceEntry) -> DeviceSpec {
    let endpoint = format!("https://{}:{}", entry.host, entry.port);
    let spec = DeviceSpec::new(entry.name, endpoint, entry.username, entry.password);
    match entry.timeout_s {
        Some(seconds) => spec.with_timeout(Duration::from_secs(seconds)),
        None => spec,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
