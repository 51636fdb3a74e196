// crates/fleetcheck-checks/src/system.rs
// ============================================================================
// Module: System Uptime Check
// Description: Verifies device uptime meets a configured minimum.
// Purpose: Catch unexpected reloads across the fleet.
// Dependencies: fleetcheck-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The `system.uptime` check collects the device uptime and requires it to
//! be at least the configured minimum number of seconds. A device that
//! reloaded recently shows up as a failure with its actual uptime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use fleetcheck_core::Check;
use fleetcheck_core::CheckError;
use fleetcheck_core::CheckId;
use fleetcheck_core::CommandRequest;
use fleetcheck_core::Verdict;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Input Model
// ============================================================================

/// Input parameters for [`SystemUptime`].
///
/// # Invariants
/// - `minimum` is a non-negative number of seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct UptimeInput {
    /// Minimum acceptable uptime in seconds.
    minimum: f64,
}

// ============================================================================
// SECTION: Payload Model
// ============================================================================

/// Structured `show uptime` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UptimeReport {
    /// Uptime in seconds since the last reload.
    up_time: f64,
}

// ============================================================================
// SECTION: Check Implementation
// ============================================================================

/// Verifies that device uptime is at least the configured minimum.
///
/// # Invariants
/// - Registered under `system.uptime`.
pub struct SystemUptime;

impl SystemUptime {
    /// Parses the typed input model from catalog parameters.
    fn input(params: &Value) -> Result<UptimeInput, CheckError> {
        let input: UptimeInput = serde_json::from_value(params.clone())
            .map_err(|err| CheckError::InvalidInput(err.to_string()))?;
        if !input.minimum.is_finite() || input.minimum < 0.0 {
            return Err(CheckError::InvalidInput(
                "minimum must be a non-negative number of seconds".to_string(),
            ));
        }
        Ok(input)
    }
}

impl Check for SystemUptime {
    fn id(&self) -> CheckId {
        CheckId::new("system.uptime")
    }

    fn commands(&self, params: &Value) -> Result<Vec<CommandRequest>, CheckError> {
        Self::input(params)?;
        Ok(vec![CommandRequest::json("show uptime")])
    }

    fn evaluate(&self, params: &Value, outputs: &[Value]) -> Result<Verdict, CheckError> {
        let input = Self::input(params)?;
        let payload = outputs
            .first()
            .ok_or_else(|| CheckError::PayloadShape("missing uptime output".to_string()))?;
        let report: UptimeReport = serde_json::from_value(payload.clone())
            .map_err(|err| CheckError::PayloadShape(err.to_string()))?;

        if report.up_time >= input.minimum {
            Ok(Verdict::Passing)
        } else {
            Ok(Verdict::Failing(vec![format!(
                "uptime {}s is below the {}s minimum",
                report.up_time, input.minimum
            )]))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use serde_json::json;

    use super::*;

    #[test]
    fn uptime_above_minimum_passes() {
        let check = SystemUptime;
        let params = json!({ "minimum": 86400 });
        let payload = json!({ "upTime": 1_186_689.15, "loadAvg": [0.1, 0.2, 0.2] });
        let verdict = check.evaluate(&params, &[payload]).unwrap();
        assert_eq!(verdict, Verdict::Passing);
    }

    #[test]
    fn uptime_below_minimum_fails_with_actual_value() {
        let check = SystemUptime;
        let params = json!({ "minimum": 86400 });
        let payload = json!({ "upTime": 665.15 });
        let verdict = check.evaluate(&params, &[payload]).unwrap();
        assert_eq!(
            verdict,
            Verdict::Failing(vec!["uptime 665.15s is below the 86400s minimum".to_string()])
        );
    }

    #[test]
    fn negative_minimum_is_invalid_input() {
        let check = SystemUptime;
        let err = check.commands(&json!({ "minimum": -1 })).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
    }

    #[test]
    fn payload_without_uptime_is_a_shape_error() {
        let check = SystemUptime;
        let err = check
            .evaluate(&json!({ "minimum": 60 }), &[json!({ "loadAvg": [] })])
            .unwrap_err();
        assert!(matches!(err, CheckError::PayloadShape(_)));
    }
}
