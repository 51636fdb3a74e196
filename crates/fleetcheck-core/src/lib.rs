// crates/fleetcheck-core/src/lib.rs
// ============================================================================
// Module: Fleetcheck Core
// Description: Execution engine for fleet-wide network state verification.
// Purpose: Turn a catalog of test bindings and a device inventory into
// concurrently executed command collection, caching, evaluation, and
// aggregation.
// Dependencies: async-trait, serde, serde_json, thiserror, time, tokio
// ============================================================================

//! ## Overview
//! Fleetcheck core is the test execution engine: it builds the device x
//! catalog-entry plan, drives one test unit per binding through command
//! collection and evaluation against a per-device session cache, and
//! aggregates every terminal outcome into a run summary. Check logic and
//! device transports are external collaborators reached only through the
//! [`Check`] and [`CommandTransport`] traits.
//!
//! Invariants:
//! - Exactly one [`TestResult`] is produced per planned binding.
//! - A given (device, command-key) pair is fetched from the device at most
//!   once per run; concurrent requesters share the in-flight call.
//! - Per-unit failures never abort sibling units; only [`SetupError`]
//!   propagates to the caller.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use core::binding::CatalogEntry;
pub use core::binding::DEFAULT_COLLECT_TIMEOUT;
pub use core::binding::DEFAULT_CONCURRENCY_LIMIT;
pub use core::binding::DEFAULT_MAX_ATTEMPTS;
pub use core::binding::DeviceFilter;
pub use core::binding::RunPolicy;
pub use core::binding::TestBinding;
pub use core::binding::UnitPolicy;
pub use core::command::CommandFailure;
pub use core::command::CommandKey;
pub use core::command::CommandOutcome;
pub use core::command::CommandRequest;
pub use core::command::ResponseFormat;
pub use core::device::DEFAULT_COMMAND_TIMEOUT;
pub use core::device::DeviceSpec;
pub use core::device::Reachability;
pub use core::identifiers::CheckId;
pub use core::identifiers::DeviceName;
pub use core::result::RunSummary;
pub use core::result::TestResult;
pub use core::result::TestStatus;
pub use interfaces::Check;
pub use interfaces::CheckError;
pub use interfaces::CheckLookup;
pub use interfaces::CommandTransport;
pub use interfaces::Verdict;
pub use runtime::aggregator::ResultAggregator;
pub use runtime::progress::ProgressEvent;
pub use runtime::progress::ProgressSink;
pub use runtime::scheduler::Plan;
pub use runtime::scheduler::PlannedUnit;
pub use runtime::scheduler::Scheduler;
pub use runtime::scheduler::SetupError;
pub use runtime::scheduler::build_plan;
pub use runtime::session::DeviceSession;
pub use runtime::unit::TestUnit;
pub use runtime::unit::UnitPhase;
