// crates/fleetcheck-core/src/core/mod.rs
// ============================================================================
// Module: Fleetcheck Core Data Model
// Description: Identifiers, device descriptors, command model, bindings, and results.
// Purpose: Define the immutable value types flowing through the engine.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The data model is deliberately plain: value types with stable serde
//! representations and no behavior beyond constructors and accessors. All
//! runtime coordination lives in [`crate::runtime`].

pub mod binding;
pub mod command;
pub mod device;
pub mod identifiers;
pub mod result;
