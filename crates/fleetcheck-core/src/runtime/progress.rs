// crates/fleetcheck-core/src/runtime/progress.rs
// ============================================================================
// Module: Fleetcheck Progress Events
// Description: Typed progress events emitted during plan execution.
// Purpose: Replace global progress state with explicit message passing.
// Dependencies: tokio, crate::core
// ============================================================================

//! ## Overview
//! Progress is observed through a typed event channel threaded from the
//! scheduler into every test unit. Consumers (typically the CLI) read the
//! receiver; a disabled sink drops events without cost. Emission never
//! blocks and never fails the run: a closed receiver simply discards events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use tokio::sync::mpsc;

use crate::core::identifiers::CheckId;
use crate::core::identifiers::DeviceName;
use crate::core::result::TestStatus;
use crate::runtime::unit::UnitPhase;

// ============================================================================
// SECTION: Progress Events
// ============================================================================

/// Progress event emitted during plan execution.
///
/// # Invariants
/// - Events for one unit arrive in phase order; no ordering holds across units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A unit left the pending state and began executing.
    UnitStarted {
        /// Target device name.
        device: DeviceName,
        /// Check identifier.
        check: CheckId,
    },
    /// A unit advanced to a new phase.
    UnitAdvanced {
        /// Target device name.
        device: DeviceName,
        /// Check identifier.
        check: CheckId,
        /// Phase the unit entered.
        phase: UnitPhase,
    },
    /// A unit reached a terminal status.
    UnitFinished {
        /// Target device name.
        device: DeviceName,
        /// Check identifier.
        check: CheckId,
        /// Terminal status.
        status: TestStatus,
        /// Duration from start to terminal state.
        duration: Duration,
    },
}

// ============================================================================
// SECTION: Progress Sink
// ============================================================================

/// Cloneable emitter handle threaded through scheduler and units.
///
/// # Invariants
/// - Emission is non-blocking; a missing or closed receiver drops events.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    /// Sender half, absent for a disabled sink.
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    /// Creates a sink that discards every event.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            tx: None,
        }
    }

    /// Creates a connected sink and its receiver.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(tx),
            },
            rx,
        )
    }

    /// Emits one event, discarding it when no receiver is attached.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
