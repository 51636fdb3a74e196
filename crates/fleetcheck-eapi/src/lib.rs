// crates/fleetcheck-eapi/src/lib.rs
// ============================================================================
// Module: Fleetcheck eAPI
// Description: JSON-RPC command transport for the device management API.
// Purpose: Turn command requests into structured payloads over HTTPS.
// Dependencies: fleetcheck-core, reqwest, base64, url, serde, serde_json
// ============================================================================

//! ## Overview
//! This crate implements the core [`fleetcheck_core::CommandTransport`]
//! interface over the device management HTTP API: one JSON-RPC 2.0 `runCmds`
//! POST per command, HTTP basic authentication, and strict error mapping
//! into the engine's typed command failures.
//! Invariants:
//! - Every wire fault maps to exactly one [`fleetcheck_core::CommandFailure`]
//!   variant; no error escapes as a panic or an unstructured string.
//! - The transport is stateless per request; deduplication lives in the
//!   engine's device session.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use transport::EapiConfig;
pub use transport::EapiError;
pub use transport::EapiTransport;
