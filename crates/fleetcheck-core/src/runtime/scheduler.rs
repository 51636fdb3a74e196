// crates/fleetcheck-core/src/runtime/scheduler.rs
// ============================================================================
// Module: Fleetcheck Scheduler
// Description: Plan building and bounded concurrent execution of test units.
// Purpose: Execute the device x catalog-entry plan under the admission bound
// and the run deadline, with complete aggregation.
// Dependencies: tokio, crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! The scheduler expands catalog entries into one binding per admitted
//! device, validates the plan, and executes one tokio task per unit inside
//! a [`JoinSet`], admission-controlled by a semaphore. Per-device sessions
//! are shared across units on the same device. When the run deadline fires,
//! remaining tasks are aborted at their next await point and every unit
//! without a terminal result is recorded as `Error` "run deadline exceeded".
//!
//! Invariants:
//! - The summary holds exactly one result per planned binding.
//! - A fatal [`SetupError`] is the only error that escapes the engine.
//! - No ordering holds across units; within one unit, collection order is
//!   the check's declaration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::Id as TaskId;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::core::binding::CatalogEntry;
use crate::core::binding::DeviceFilter;
use crate::core::binding::RunPolicy;
use crate::core::binding::TestBinding;
use crate::core::device::DeviceSpec;
use crate::core::identifiers::CheckId;
use crate::core::identifiers::DeviceName;
use crate::core::result::RunSummary;
use crate::core::result::TestResult;
use crate::core::result::TestStatus;
use crate::interfaces::Check;
use crate::interfaces::CheckLookup;
use crate::interfaces::CommandTransport;
use crate::runtime::aggregator::ResultAggregator;
use crate::runtime::progress::ProgressSink;
use crate::runtime::session::DeviceSession;
use crate::runtime::unit::TestUnit;

// ============================================================================
// SECTION: Setup Errors
// ============================================================================

/// Fatal plan construction failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Setup errors abort the entire run before any scheduling.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The inventory contains no devices.
    #[error("inventory contains no devices")]
    EmptyInventory,
    /// The catalog contains no entries.
    #[error("catalog contains no entries")]
    EmptyCatalog,
    /// The inventory names the same device twice.
    #[error("duplicate device name in inventory: {0}")]
    DuplicateDevice(DeviceName),
    /// A catalog entry references an unregistered check.
    #[error("unknown check identifier: {0}")]
    UnknownCheck(CheckId),
    /// A device filter references a device absent from the inventory.
    #[error("device filter references unknown device: {0}")]
    UnknownDevice(DeviceName),
}

// ============================================================================
// SECTION: Plan
// ============================================================================

/// One planned unit: a binding plus its resolved check logic.
#[derive(Clone)]
pub struct PlannedUnit {
    /// Immutable binding for the unit.
    pub binding: TestBinding,
    /// Resolved check implementation.
    pub check: Arc<dyn Check>,
}

/// The full device x catalog-entry execution plan.
///
/// # Invariants
/// - Order is deterministic: catalog order, then inventory order.
/// - Immutable once built; execution never adds or removes units.
pub struct Plan {
    /// Planned units in deterministic order.
    units: Vec<PlannedUnit>,
}

impl std::fmt::Debug for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plan")
            .field("units", &self.units.len())
            .finish()
    }
}

impl Plan {
    /// Returns the planned units.
    #[must_use]
    pub fn units(&self) -> &[PlannedUnit] {
        &self.units
    }

    /// Returns the number of planned units.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true when the plan holds no units.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Builds the execution plan from inventory, catalog, and check registry.
///
/// Expands each entry across the devices its filter admits, resolving check
/// logic through the lookup seam and applying the run's default unit policy
/// where the entry carries no override.
///
/// # Errors
///
/// Returns [`SetupError`] on an empty inventory or catalog, duplicate
/// device names, unknown check identifiers, or filters naming devices
/// absent from the inventory.
pub fn build_plan(
    devices: &[DeviceSpec],
    entries: &[CatalogEntry],
    checks: &dyn CheckLookup,
    policy: &RunPolicy,
) -> Result<Plan, SetupError> {
    if devices.is_empty() {
        return Err(SetupError::EmptyInventory);
    }
    if entries.is_empty() {
        return Err(SetupError::EmptyCatalog);
    }
    let mut names = BTreeSet::new();
    for device in devices {
        if !names.insert(device.name.clone()) {
            return Err(SetupError::DuplicateDevice(device.name.clone()));
        }
    }

    let mut units = Vec::new();
    for entry in entries {
        let check = checks
            .lookup(&entry.check)
            .ok_or_else(|| SetupError::UnknownCheck(entry.check.clone()))?;
        if let DeviceFilter::Devices(filtered) = &entry.filter {
            for name in filtered {
                if !names.contains(name) {
                    return Err(SetupError::UnknownDevice(name.clone()));
                }
            }
        }
        for device in devices {
            if !entry.filter.admits(&device.name) {
                continue;
            }
            units.push(PlannedUnit {
                binding: TestBinding {
                    check: entry.check.clone(),
                    device: device.name.clone(),
                    params: entry.params.clone(),
                    policy: entry.policy.unwrap_or(policy.unit),
                },
                check: Arc::clone(&check),
            });
        }
    }
    Ok(Plan {
        units,
    })
}

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// Message added to units cancelled by the run deadline.
const DEADLINE_MESSAGE: &str = "run deadline exceeded";

/// Executes a plan under the run policy.
///
/// # Invariants
/// - One session per device, shared by every unit bound to that device.
/// - Unit faults never abort sibling units.
pub struct Scheduler {
    /// Transport shared by all device sessions.
    transport: Arc<dyn CommandTransport>,
    /// Run-wide execution policy.
    policy: RunPolicy,
}

impl Scheduler {
    /// Creates a scheduler over the transport with the provided policy.
    #[must_use]
    pub fn new(transport: Arc<dyn CommandTransport>, policy: RunPolicy) -> Self {
        Self {
            transport,
            policy,
        }
    }

    /// Returns the run policy.
    #[must_use]
    pub const fn policy(&self) -> &RunPolicy {
        &self.policy
    }

    /// Executes every planned unit and returns the complete summary.
    ///
    /// In dry-run mode the plan is accepted as-is and nothing executes. The
    /// returned summary always holds one result per planned unit otherwise,
    /// in completion order.
    pub async fn run(
        &self,
        devices: &[DeviceSpec],
        plan: &Plan,
        progress: &ProgressSink,
    ) -> RunSummary {
        if self.policy.dry_run {
            return RunSummary::default();
        }

        let sessions = self.sessions(devices);
        let semaphore = Arc::new(Semaphore::new(self.policy.limit.max(1)));
        let mut set: JoinSet<(usize, TestResult)> = JoinSet::new();
        let mut task_index: HashMap<TaskId, usize> = HashMap::new();

        let aggregator = ResultAggregator::new();
        let mut completed = vec![false; plan.len()];

        for (index, planned) in plan.units().iter().enumerate() {
            let Some(session) = sessions.get(&planned.binding.device) else {
                if let Some(slot) = completed.get_mut(index) {
                    *slot = true;
                }
                aggregator.record(synthesized(planned, "device missing from inventory"));
                continue;
            };
            let unit = TestUnit::new(
                planned.binding.clone(),
                Arc::clone(&planned.check),
                Arc::clone(session),
            );
            let semaphore = Arc::clone(&semaphore);
            let progress = progress.clone();
            let handle = set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, unit.run(&progress).await)
            });
            task_index.insert(handle.id(), index);
        }

        self.drain(plan, &mut set, &task_index, &aggregator, &mut completed).await;

        for (index, done) in completed.iter().enumerate() {
            if *done {
                continue;
            }
            if let Some(planned) = plan.units().get(index) {
                aggregator.record(synthesized(planned, DEADLINE_MESSAGE));
            }
        }
        aggregator.summary()
    }

    /// Builds one session per inventory device.
    fn sessions(&self, devices: &[DeviceSpec]) -> BTreeMap<DeviceName, Arc<DeviceSession>> {
        devices
            .iter()
            .map(|spec| {
                (
                    spec.name.clone(),
                    Arc::new(DeviceSession::new(spec.clone(), Arc::clone(&self.transport))),
                )
            })
            .collect()
    }

    /// Drains unit tasks, enforcing the run deadline.
    ///
    /// Completed units are recorded in completion order. When the deadline
    /// fires, every remaining task is aborted; aborted and panicked tasks
    /// leave their slot unmarked so the caller can synthesize results.
    async fn drain(
        &self,
        plan: &Plan,
        set: &mut JoinSet<(usize, TestResult)>,
        task_index: &HashMap<TaskId, usize>,
        aggregator: &ResultAggregator,
        completed: &mut [bool],
    ) {
        let deadline = self.policy.deadline;
        let expiry = async {
            match deadline {
                Some(budget) => sleep(budget).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                joined = set.join_next_with_id() => {
                    match joined {
                        None => break,
                        Some(Ok((_, (index, result)))) => {
                            if let Some(slot) = completed.get_mut(index) {
                                *slot = true;
                            }
                            aggregator.record(result);
                        }
                        Some(Err(join_err)) => {
                            if !join_err.is_panic() {
                                continue;
                            }
                            let Some(index) = task_index.get(&join_err.id()).copied() else {
                                continue;
                            };
                            if let Some(planned) = plan.units().get(index) {
                                if let Some(slot) = completed.get_mut(index) {
                                    *slot = true;
                                }
                                aggregator.record(synthesized(planned, "check logic panicked"));
                            }
                        }
                    }
                }
                () = &mut expiry => {
                    set.abort_all();
                    while let Some(joined) = set.join_next_with_id().await {
                        if let Ok((_, (index, result))) = joined {
                            if let Some(slot) = completed.get_mut(index) {
                                *slot = true;
                            }
                            aggregator.record(result);
                        }
                    }
                    break;
                }
            }
        }
    }

}

/// Builds an error result for a unit that never reached a terminal state.
fn synthesized(planned: &PlannedUnit, message: &str) -> TestResult {
    TestResult::new(
        planned.binding.device.clone(),
        planned.binding.check.clone(),
        TestStatus::Error,
        vec![message.to_string()],
        Duration::ZERO,
    )
}
