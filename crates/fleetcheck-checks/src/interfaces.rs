// crates/fleetcheck-checks/src/interfaces.rs
// ============================================================================
// Module: Interface Status Check
// Description: Verifies listed interfaces are up with line protocol up.
// Purpose: Catch downed links and misconfigured interfaces.
// Dependencies: fleetcheck-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The `interfaces.status` check collects the interface description table and
//! requires every listed interface to report link status `up` and line
//! protocol status `up`. An interface absent from the table is a failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

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

/// Input parameters for [`InterfaceStatus`].
///
/// # Invariants
/// - `interfaces` must name at least one interface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct InterfacesInput {
    /// Interfaces that must be up/up.
    interfaces: Vec<String>,
}

// ============================================================================
// SECTION: Payload Model
// ============================================================================

/// Structured `show interfaces description` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionTable {
    /// Per-interface entries keyed by interface name.
    interface_descriptions: BTreeMap<String, InterfaceEntry>,
}

/// One interface description entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterfaceEntry {
    /// Link status reported by the device.
    interface_status: String,
    /// Line protocol status reported by the device.
    line_protocol_status: String,
}

// ============================================================================
// SECTION: Check Implementation
// ============================================================================

/// Verifies that the configured interfaces are up with line protocol up.
///
/// # Invariants
/// - Registered under `interfaces.status`.
/// - Interfaces not listed in the input never affect the verdict.
pub struct InterfaceStatus;

impl InterfaceStatus {
    /// Parses the typed input model from catalog parameters.
    fn input(params: &Value) -> Result<InterfacesInput, CheckError> {
        let input: InterfacesInput = serde_json::from_value(params.clone())
            .map_err(|err| CheckError::InvalidInput(err.to_string()))?;
        if input.interfaces.is_empty() {
            return Err(CheckError::InvalidInput("interfaces must not be empty".to_string()));
        }
        Ok(input)
    }
}

impl Check for InterfaceStatus {
    fn id(&self) -> CheckId {
        CheckId::new("interfaces.status")
    }

    fn commands(&self, params: &Value) -> Result<Vec<CommandRequest>, CheckError> {
        Self::input(params)?;
        Ok(vec![CommandRequest::json("show interfaces description")])
    }

    fn evaluate(&self, params: &Value, outputs: &[Value]) -> Result<Verdict, CheckError> {
        let input = Self::input(params)?;
        let payload = outputs.first().ok_or_else(|| {
            CheckError::PayloadShape("missing interface description output".to_string())
        })?;
        let table: DescriptionTable = serde_json::from_value(payload.clone())
            .map_err(|err| CheckError::PayloadShape(err.to_string()))?;

        let mut reasons = Vec::new();
        for name in &input.interfaces {
            let Some(entry) = table.interface_descriptions.get(name) else {
                reasons.push(format!("{name}: not found"));
                continue;
            };
            if entry.interface_status != "up" || entry.line_protocol_status != "up" {
                reasons.push(format!(
                    "{name}: status {}/{}",
                    entry.interface_status, entry.line_protocol_status
                ));
            }
        }

        if reasons.is_empty() {
            Ok(Verdict::Passing)
        } else {
            Ok(Verdict::Failing(reasons))
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
    fn up_up_interfaces_pass() {
        let check = InterfaceStatus;
        let params = json!({ "interfaces": ["Ethernet1", "Ethernet2"] });
        let payload = json!({
            "interfaceDescriptions": {
                "Ethernet1": { "interfaceStatus": "up", "lineProtocolStatus": "up" },
                "Ethernet2": { "interfaceStatus": "up", "lineProtocolStatus": "up" },
                "Ethernet3": { "interfaceStatus": "down", "lineProtocolStatus": "down" },
            }
        });
        let verdict = check.evaluate(&params, &[payload]).unwrap();
        assert_eq!(verdict, Verdict::Passing);
    }

    #[test]
    fn down_interface_fails_with_both_statuses() {
        let check = InterfaceStatus;
        let params = json!({ "interfaces": ["Ethernet1"] });
        let payload = json!({
            "interfaceDescriptions": {
                "Ethernet1": { "interfaceStatus": "up", "lineProtocolStatus": "down" },
            }
        });
        let verdict = check.evaluate(&params, &[payload]).unwrap();
        assert_eq!(verdict, Verdict::Failing(vec!["Ethernet1: status up/down".to_string()]));
    }

    #[test]
    fn missing_interface_fails() {
        let check = InterfaceStatus;
        let params = json!({ "interfaces": ["Ethernet9"] });
        let payload = json!({ "interfaceDescriptions": {} });
        let verdict = check.evaluate(&params, &[payload]).unwrap();
        assert_eq!(verdict, Verdict::Failing(vec!["Ethernet9: not found".to_string()]));
    }

    #[test]
    fn empty_interface_list_is_invalid_input() {
        let check = InterfaceStatus;
        let err = check.commands(&json!({ "interfaces": [] })).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
    }
}
