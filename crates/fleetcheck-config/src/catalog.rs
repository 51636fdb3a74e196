// crates/fleetcheck-config/src/catalog.rs
// ============================================================================
// Module: Catalog Loading
// Description: Loads and validates the check catalog YAML file.
// Purpose: Produce engine catalog entries with per-entry overrides.
// Dependencies: fleetcheck-core, serde, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! The catalog file is the ordered list of checks a run executes. Each entry
//! names a check, carries its parameters verbatim as JSON, and may restrict
//! itself to named devices or override the collection timeout and attempt
//! count. The loader only validates shape; check identifiers and device
//! names are resolved later during plan building.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::time::Duration;

use fleetcheck_core::CatalogEntry;
use fleetcheck_core::DeviceFilter;
use fleetcheck_core::UnitPolicy;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

// ============================================================================
// SECTION: File Model
// ============================================================================

/// Top-level catalog file shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    /// Ordered check entries.
    checks: Vec<CatalogFileEntry>,
}

/// One catalog file entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFileEntry {
    /// Check identifier to execute.
    check: String,
    /// Check parameters, passed through verbatim.
    #[serde(default = "empty_params")]
    params: Value,
    /// Optional restriction to named devices.
    devices: Option<Vec<String>>,
    /// Optional collection timeout override in seconds.
    timeout_s: Option<u64>,
    /// Optional collection attempt override.
    attempts: Option<u32>,
}

/// Default parameters for checks that take none.
fn empty_params() -> Value {
    Value::Object(serde_json::Map::new())
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates the catalog file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed, or the
/// catalog is empty.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, ConfigError> {
    let label = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: label.clone(),
        source,
    })?;
    let file: CatalogFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: label.clone(),
        source,
    })?;

    if file.checks.is_empty() {
        return Err(ConfigError::Invalid {
            path: label,
            reason: "catalog must list at least one check".to_string(),
        });
    }

    Ok(file.checks.into_iter().map(catalog_entry).collect())
}

/// Converts one file entry into an engine catalog entry.
fn catalog_entry(entry: CatalogFileEntry) -> CatalogEntry {
    let mut built = CatalogEntry::new(entry.check, entry.params);
    if let Some(devices) = entry.devices {
        let names = devices.into_iter().map(Into::into).collect();
        built = built.with_filter(DeviceFilter::Devices(names));
    }
    if entry.timeout_s.is_some() || entry.attempts.is_some() {
        let defaults = UnitPolicy::default();
        built = built.with_policy(UnitPolicy {
            collect_timeout: entry
                .timeout_s
                .map_or(defaults.collect_timeout, Duration::from_secs),
            max_attempts: entry.attempts.unwrap_or(defaults.max_attempts),
        });
    }
    built
}

// ============================================================================
// SECTION: Tests
// ============================================================================
