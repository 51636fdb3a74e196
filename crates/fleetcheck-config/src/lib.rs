// crates/fleetcheck-config/src/lib.rs
// ============================================================================
// Module: Fleetcheck Config
// Description: Operator-facing inventory and catalog file loading.
// Purpose: Turn YAML files into validated engine inputs.
// Dependencies: fleetcheck-core, serde, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! This crate loads the two operator files: the inventory (which devices to
//! run against) and the catalog (which checks to run, with parameters and
//! per-entry overrides). Loading validates the files up front so the CLI can
//! treat any [`ConfigError`] as a fatal setup failure before a single
//! connection is attempted.
//! Invariants:
//! - A successfully loaded inventory is non-empty with unique device names.
//! - A successfully loaded catalog is non-empty.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod error;
pub mod inventory;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::load_catalog;
pub use error::ConfigError;
pub use inventory::load_inventory;
