// crates/fleetcheck-checks/src/lib.rs
// ============================================================================
// Module: Fleetcheck Checks
// Description: Built-in verification checks and the check registry.
// Purpose: Provide ready-to-run checks aligned with the fleetcheck engine.
// Dependencies: fleetcheck-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate ships the built-in check library (BGP peering, interface
//! status, system uptime, reachability) and a registry that resolves catalog
//! identifiers to check implementations. Checks are transport-agnostic: they
//! declare command requests and evaluate structured payloads, never touching
//! the wire themselves.
//! Invariants:
//! - Catalog identifiers are routed via [`CheckRegistry`] by check id.
//! - Checks parse their typed input model up front and fail closed on
//!   invalid parameters.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bgp;
pub mod connectivity;
pub mod interfaces;
pub mod registry;
pub mod system;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bgp::BgpPeersEstablished;
pub use connectivity::HostReachability;
pub use interfaces::InterfaceStatus;
pub use registry::CheckRegistry;
pub use registry::RegistryError;
pub use system::SystemUptime;
