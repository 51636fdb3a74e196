// crates/fleetcheck-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Scripted transport and fixture checks shared by engine tests.
// Purpose: Drive the engine without real devices while counting remote calls.
// ============================================================================

//! Shared fixtures: a scripted in-memory transport with latency and
//! concurrency instrumentation, fixture checks for each terminal status,
//! and a static check lookup for plan building.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use fleetcheck_core::Check;
use fleetcheck_core::CheckError;
use fleetcheck_core::CheckId;
use fleetcheck_core::CheckLookup;
use fleetcheck_core::CommandFailure;
use fleetcheck_core::CommandRequest;
use fleetcheck_core::CommandTransport;
use fleetcheck_core::DeviceSpec;
use fleetcheck_core::Verdict;
use serde_json::Value;
use serde_json::json;

/// Script key: (device name, command text).
type ScriptKey = (String, String);

/// Scripted in-memory transport with latency and concurrency tracking.
pub struct MockTransport {
    /// Scripted payloads per (device, command).
    responses: Mutex<HashMap<ScriptKey, Value>>,
    /// Scripted failures per (device, command).
    failures: Mutex<HashMap<ScriptKey, CommandFailure>>,
    /// Devices whose connection probe fails.
    unreachable: Mutex<BTreeSet<String>>,
    /// Artificial latency per command execution.
    latency: Duration,
    /// Log of executed (device, command) pairs.
    calls: Mutex<Vec<ScriptKey>>,
    /// Log of connect attempts per device.
    connects: Mutex<Vec<String>>,
    /// Commands currently in flight.
    in_flight: AtomicUsize,
    /// High-water mark of concurrently in-flight commands.
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// Creates an unscripted transport with zero latency.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            unreachable: Mutex::new(BTreeSet::new()),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            connects: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sets a per-command latency applied before every execution.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Scripts a payload for one (device, command) pair.
    pub fn respond(self, device: &str, command: &str, payload: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((device.to_string(), command.to_string()), payload);
        self
    }

    /// Scripts a failure for one (device, command) pair.
    pub fn fail_command(self, device: &str, command: &str, failure: CommandFailure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((device.to_string(), command.to_string()), failure);
        self
    }

    /// Marks a device as failing its connection probe.
    pub fn unreachable(self, device: &str) -> Self {
        self.unreachable.lock().unwrap().insert(device.to_string());
        self
    }

    /// Returns every executed (device, command) pair in call order.
    pub fn calls(&self) -> Vec<ScriptKey> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the number of executions for one (device, command) pair.
    pub fn calls_for(&self, device: &str, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, c)| d == device && c == command)
            .count()
    }

    /// Returns the number of executions against one device.
    pub fn calls_to_device(&self, device: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(d, _)| d == device).count()
    }

    /// Returns the connect attempts per device.
    pub fn connects_to(&self, device: &str) -> usize {
        self.connects.lock().unwrap().iter().filter(|d| *d == device).count()
    }

    /// Returns the high-water mark of concurrently in-flight commands.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CommandTransport for MockTransport {
    async fn connect(&self, device: &DeviceSpec) -> Result<(), CommandFailure> {
        self.connects.lock().unwrap().push(device.name.to_string());
        if self.unreachable.lock().unwrap().contains(device.name.as_str()) {
            return Err(CommandFailure::Unreachable(format!(
                "connection refused by {}",
                device.endpoint
            )));
        }
        Ok(())
    }

    async fn execute(
        &self,
        device: &DeviceSpec,
        request: &CommandRequest,
    ) -> Result<Value, CommandFailure> {
        let key = (device.name.to_string(), request.command.clone());
        let entered = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(entered, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(key.clone());
        if let Some(failure) = self.failures.lock().unwrap().get(&key) {
            return Err(failure.clone());
        }
        let payload = self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| json!({ "ok": true }));
        Ok(payload)
    }
}

/// Fixture check with a fixed command list and verdict.
pub struct StaticCheck {
    /// Check identifier.
    pub id: &'static str,
    /// Commands declared for collection.
    pub commands: Vec<&'static str>,
    /// Kind of outcome the evaluation produces.
    pub kind: StaticKind,
}

/// Evaluation behavior of a [`StaticCheck`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StaticKind {
    /// Always passes.
    Pass,
    /// Always fails with one reason.
    Fail,
    /// Always returns a check fault.
    Fault,
    /// Panics inside evaluation.
    Panic,
    /// Declares inapplicability before any I/O.
    Skip,
}

impl StaticCheck {
    /// Builds a check that always passes.
    pub fn passing(id: &'static str, commands: Vec<&'static str>) -> Arc<dyn Check> {
        Arc::new(Self {
            id,
            commands,
            kind: StaticKind::Pass,
        })
    }

    /// Builds a check that always fails with one reason.
    pub fn failing(id: &'static str, commands: Vec<&'static str>) -> Arc<dyn Check> {
        Arc::new(Self {
            id,
            commands,
            kind: StaticKind::Fail,
        })
    }

    /// Builds a check whose evaluation returns a fault.
    pub fn faulty(id: &'static str, commands: Vec<&'static str>) -> Arc<dyn Check> {
        Arc::new(Self {
            id,
            commands,
            kind: StaticKind::Fault,
        })
    }

    /// Builds a check whose evaluation panics.
    pub fn panicky(id: &'static str, commands: Vec<&'static str>) -> Arc<dyn Check> {
        Arc::new(Self {
            id,
            commands,
            kind: StaticKind::Panic,
        })
    }

    /// Builds a check that declares itself inapplicable.
    pub fn skipped(id: &'static str) -> Arc<dyn Check> {
        Arc::new(Self {
            id,
            commands: Vec::new(),
            kind: StaticKind::Skip,
        })
    }
}

impl Check for StaticCheck {
    fn id(&self) -> CheckId {
        CheckId::new(self.id)
    }

    fn skip_reason(&self, _device: &DeviceSpec) -> Option<String> {
        (self.kind == StaticKind::Skip).then(|| "platform not supported".to_string())
    }

    fn commands(&self, _params: &Value) -> Result<Vec<CommandRequest>, CheckError> {
        Ok(self.commands.iter().map(|cmd| CommandRequest::json(*cmd)).collect())
    }

    fn evaluate(&self, _params: &Value, _outputs: &[Value]) -> Result<Verdict, CheckError> {
        match self.kind {
            StaticKind::Pass | StaticKind::Skip => Ok(Verdict::Passing),
            StaticKind::Fail => Ok(Verdict::Failing(vec!["state mismatch".to_string()])),
            StaticKind::Fault => Err(CheckError::Fault("fixture fault".to_string())),
            StaticKind::Panic => panic!("fixture panic"),
        }
    }
}

/// Static lookup over fixture checks.
pub struct StaticLookup {
    /// Registered checks by identifier.
    checks: BTreeMap<CheckId, Arc<dyn Check>>,
}

impl StaticLookup {
    /// Builds a lookup over the provided checks.
    pub fn new(checks: Vec<Arc<dyn Check>>) -> Self {
        Self {
            checks: checks.into_iter().map(|check| (check.id(), check)).collect(),
        }
    }
}

impl CheckLookup for StaticLookup {
    fn lookup(&self, id: &CheckId) -> Option<Arc<dyn Check>> {
        self.checks.get(id).cloned()
    }
}

/// Builds a device spec for the named fixture device.
pub fn device(name: &str) -> DeviceSpec {
    DeviceSpec::new(name, format!("https://{name}.lab:443"), "admin", "admin")
}
