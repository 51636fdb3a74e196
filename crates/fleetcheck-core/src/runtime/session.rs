// crates/fleetcheck-core/src/runtime/session.rs
// ============================================================================
// Module: Fleetcheck Device Session
// Description: Per-device command execution with a singleflight result cache.
// Purpose: Guarantee at most one remote call per (command, revision) key per run.
// Dependencies: tokio, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A [`DeviceSession`] is the single point of command execution for one
//! device. Every command result, successful or failed, is captured once and
//! shared by all units requesting the same key. In-flight calls run on their
//! own task: a requester that stops waiting (collection timeout, deadline
//! abort) abandons the call without killing it, and a later requester for
//! the same key still receives the original call's result.
//!
//! Invariants:
//! - At most one remote call per [`CommandKey`] per run.
//! - The cache is owned exclusively by this session; no cross-device locks.
//! - `connect` failures are memoized; the session never reconnects within a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio::sync::OnceCell;
use tokio::sync::watch;

use crate::core::command::CommandFailure;
use crate::core::command::CommandKey;
use crate::core::command::CommandOutcome;
use crate::core::command::CommandRequest;
use crate::core::device::DeviceSpec;
use crate::core::device::Reachability;
use crate::interfaces::CommandTransport;

// ============================================================================
// SECTION: Cache Slot
// ============================================================================

/// Receiver half of one singleflight cache slot.
///
/// The slot starts at `None` and is set exactly once by the slot task when
/// the remote call completes.
type CacheSlot = watch::Receiver<Option<CommandOutcome>>;

// ============================================================================
// SECTION: Device Session
// ============================================================================

/// Command execution and caching for one device, for the lifetime of one run.
///
/// # Invariants
/// - The cache maps each key to exactly one slot; the slot task issues the
///   only remote call for that key.
/// - Cache entries are never evicted or overwritten within a run.
pub struct DeviceSession {
    /// Device descriptor for transport calls.
    spec: DeviceSpec,
    /// Transport used for connection probes and command execution.
    transport: Arc<dyn CommandTransport>,
    /// Memoized outcome of the connection probe.
    connect_slot: OnceCell<Result<(), CommandFailure>>,
    /// Singleflight cache keyed by command identity.
    cache: Mutex<HashMap<CommandKey, CacheSlot>>,
    /// Number of remote calls issued by this session.
    remote_calls: Arc<AtomicU64>,
}

impl DeviceSession {
    /// Creates a session bound to one device and transport.
    #[must_use]
    pub fn new(spec: DeviceSpec, transport: Arc<dyn CommandTransport>) -> Self {
        Self {
            spec,
            transport,
            connect_slot: OnceCell::new(),
            cache: Mutex::new(HashMap::new()),
            remote_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the device descriptor.
    #[must_use]
    pub const fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    /// Returns the run-scoped reachability observed so far.
    #[must_use]
    pub fn reachability(&self) -> Reachability {
        match self.connect_slot.get() {
            None => Reachability::Unknown,
            Some(Ok(())) => Reachability::Reachable,
            Some(Err(_)) => Reachability::Unreachable,
        }
    }

    /// Returns the number of remote calls issued so far.
    #[must_use]
    pub fn remote_calls(&self) -> u64 {
        self.remote_calls.load(Ordering::Relaxed)
    }

    /// Establishes reachability; idempotent within the run.
    ///
    /// The first caller performs the probe; every later caller receives the
    /// memoized outcome. A failed probe marks the device unreachable for the
    /// rest of the run; retry policy lives in the scheduler, not here.
    ///
    /// # Errors
    ///
    /// Returns the memoized [`CommandFailure`] when the probe failed.
    pub async fn connect(&self) -> Result<(), CommandFailure> {
        self.connect_slot
            .get_or_init(|| async { self.transport.connect(&self.spec).await })
            .await
            .clone()
    }

    /// Executes one command, serving repeated keys from the cache.
    ///
    /// The first requester for a key spawns the remote call on its own task;
    /// concurrent requesters await that call's single outcome. Failures are
    /// cached exactly like payloads and are never retried here.
    pub async fn execute(&self, request: &CommandRequest) -> CommandOutcome {
        let mut slot = self.slot(request);
        match slot.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().map_or_else(
                || CommandOutcome::Failed(CommandFailure::Transport(
                    "command slot resolved without an outcome".to_string(),
                )),
                |value| value,
            ),
            Err(_) => CommandOutcome::Failed(CommandFailure::Transport(
                "command task dropped before completing".to_string(),
            )),
        }
    }

    /// Returns the cache slot for the request, creating it on first use.
    ///
    /// Slot creation spawns the remote call; the map lock is held only for
    /// the lookup-or-insert, never across the call itself.
    fn slot(&self, request: &CommandRequest) -> CacheSlot {
        let key = request.key();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = cache.get(&key) {
            return slot.clone();
        }
        let (tx, rx) = watch::channel(None);
        let transport = Arc::clone(&self.transport);
        let spec = self.spec.clone();
        let request = request.clone();
        let remote_calls = Arc::clone(&self.remote_calls);
        tokio::spawn(async move {
            remote_calls.fetch_add(1, Ordering::Relaxed);
            let outcome = match transport.execute(&spec, &request).await {
                Ok(payload) => CommandOutcome::Payload(payload),
                Err(failure) => CommandOutcome::Failed(failure),
            };
            let _ = tx.send(Some(outcome));
        });
        cache.insert(key, rx.clone());
        rx
    }
}
