// crates/fleetcheck-core/src/runtime/mod.rs
// ============================================================================
// Module: Fleetcheck Runtime
// Description: Device sessions, test units, scheduler, and aggregation.
// Purpose: Execute the plan concurrently under the cache and ordering guarantees.
// Dependencies: tokio, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime realizes the concurrency contract: one cooperative task per
//! test unit, bounded by a semaphore; per-device singleflight command
//! caches with no cross-device locking; completion-order aggregation; and a
//! run deadline that cancels not-yet-terminal units cooperatively.

pub mod aggregator;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod unit;
