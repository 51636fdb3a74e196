// crates/fleetcheck-checks/src/connectivity.rs
// ============================================================================
// Module: Reachability Check
// Description: Verifies remote hosts answer pings with zero loss.
// Purpose: Catch broken forwarding paths between fleet devices.
// Dependencies: fleetcheck-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The `connectivity.reachability` check issues one ping command per
//! configured host and requires every probe to come back with all replies
//! received and zero packet loss. Each host carries its own VRF, source,
//! datagram size, repeat count, and df-bit setting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

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

/// Input parameters for [`HostReachability`].
///
/// # Invariants
/// - `hosts` must name at least one probe target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReachabilityInput {
    /// Probe targets.
    hosts: Vec<Host>,
}

/// One remote host to ping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct Host {
    /// Destination address to ping.
    destination: String,
    /// Optional source address or egress interface.
    source: Option<String>,
    /// VRF context for the probe.
    #[serde(default = "default_vrf")]
    vrf: String,
    /// Number of ping repetitions.
    #[serde(default = "default_repeat")]
    repeat: u32,
    /// Datagram size in bytes.
    #[serde(default = "default_size")]
    size: u32,
    /// Whether to set the do-not-fragment bit.
    #[serde(default)]
    df_bit: bool,
}

/// Default VRF name when the catalog omits it.
fn default_vrf() -> String {
    "default".to_string()
}

/// Default ping repetition count.
const fn default_repeat() -> u32 {
    2
}

/// Default ping datagram size in bytes.
const fn default_size() -> u32 {
    100
}

impl Host {
    /// Renders the device ping command for this host.
    fn command(&self) -> String {
        let mut text = format!("ping vrf {} {}", self.vrf, self.destination);
        if let Some(source) = &self.source {
            let _ = write!(text, " source {source}");
        }
        let _ = write!(text, " size {} repeat {}", self.size, self.repeat);
        if self.df_bit {
            text.push_str(" df-bit");
        }
        text
    }
}

// ============================================================================
// SECTION: Payload Model
// ============================================================================

/// Structured ping payload.
#[derive(Debug, Deserialize)]
struct PingReport {
    /// Raw ping output lines reported by the device.
    messages: Vec<String>,
}

// ============================================================================
// SECTION: Check Implementation
// ============================================================================

/// Verifies that each configured host answers pings with zero loss.
///
/// # Invariants
/// - Registered under `connectivity.reachability`.
/// - Declares exactly one command per configured host, in input order.
pub struct HostReachability;

impl HostReachability {
    /// Parses the typed input model from catalog parameters.
    fn input(params: &Value) -> Result<ReachabilityInput, CheckError> {
        let input: ReachabilityInput = serde_json::from_value(params.clone())
            .map_err(|err| CheckError::InvalidInput(err.to_string()))?;
        if input.hosts.is_empty() {
            return Err(CheckError::InvalidInput("hosts must not be empty".to_string()));
        }
        Ok(input)
    }
}

impl Check for HostReachability {
    fn id(&self) -> CheckId {
        CheckId::new("connectivity.reachability")
    }

    fn commands(&self, params: &Value) -> Result<Vec<CommandRequest>, CheckError> {
        let input = Self::input(params)?;
        Ok(input.hosts.iter().map(|host| CommandRequest::json(host.command())).collect())
    }

    fn evaluate(&self, params: &Value, outputs: &[Value]) -> Result<Verdict, CheckError> {
        let input = Self::input(params)?;
        if outputs.len() != input.hosts.len() {
            return Err(CheckError::PayloadShape(format!(
                "expected {} ping outputs, got {}",
                input.hosts.len(),
                outputs.len()
            )));
        }

        let mut reasons = Vec::new();
        for (host, output) in input.hosts.iter().zip(outputs) {
            let report: PingReport = serde_json::from_value(output.clone())
                .map_err(|err| CheckError::PayloadShape(err.to_string()))?;
            let text = report.messages.join("\n");
            let received = format!("{} received", host.repeat);
            if !text.contains(&received) || !text.contains("0% packet loss") {
                reasons.push(format!(
                    "host {} (vrf {}): unreachable",
                    host.destination, host.vrf
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

    fn ping_output(transmitted: u32, received: u32, loss: u32) -> Value {
        json!({
            "messages": [format!(
                "PING 10.0.0.1 (10.0.0.1) 72(100) bytes of data.\n\
                 {transmitted} packets transmitted, {received} received, \
                 {loss}% packet loss, time 10ms"
            )]
        })
    }

    #[test]
    fn zero_loss_probes_pass() {
        let check = HostReachability;
        let params = json!({ "hosts": [{ "destination": "10.0.0.1" }] });
        let verdict = check.evaluate(&params, &[ping_output(2, 2, 0)]).unwrap();
        assert_eq!(verdict, Verdict::Passing);
    }

    #[test]
    fn lost_packets_fail_the_host() {
        let check = HostReachability;
        let params = json!({ "hosts": [{ "destination": "10.0.0.1", "vrf": "MGMT" }] });
        let verdict = check.evaluate(&params, &[ping_output(2, 1, 50)]).unwrap();
        assert_eq!(
            verdict,
            Verdict::Failing(vec!["host 10.0.0.1 (vrf MGMT): unreachable".to_string()])
        );
    }

    #[test]
    fn commands_render_source_size_repeat_and_df_bit() {
        let check = HostReachability;
        let params = json!({
            "hosts": [{
                "destination": "10.0.0.1",
                "source": "Loopback0",
                "vrf": "MGMT",
                "repeat": 5,
                "size": 1500,
                "df_bit": true,
            }]
        });
        let commands = check.commands(&params).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].command,
            "ping vrf MGMT 10.0.0.1 source Loopback0 size 1500 repeat 5 df-bit"
        );
    }

    #[test]
    fn defaults_match_the_standard_probe() {
        let check = HostReachability;
        let params = json!({ "hosts": [{ "destination": "10.0.0.1" }] });
        let commands = check.commands(&params).unwrap();
        assert_eq!(commands[0].command, "ping vrf default 10.0.0.1 size 100 repeat 2");
    }

    #[test]
    fn output_count_mismatch_is_a_shape_error() {
        let check = HostReachability;
        let params = json!({ "hosts": [{ "destination": "10.0.0.1" }] });
        let err = check.evaluate(&params, &[]).unwrap_err();
        assert!(matches!(err, CheckError::PayloadShape(_)));
    }

    #[test]
    fn empty_host_list_is_invalid_input() {
        let check = HostReachability;
        let err = check.commands(&json!({ "hosts": [] })).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
    }
}
