// crates/fleetcheck-checks/src/bgp.rs
// ============================================================================
// Module: BGP Peering Check
// Description: Verifies BGP peers are established with empty message queues.
// Purpose: Catch broken or converging BGP sessions across configured VRFs.
// Dependencies: fleetcheck-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The `bgp.peers-established` check collects the BGP summary for all VRFs
//! and requires every peer in the configured VRFs to be in `Established`
//! state with empty inbound and outbound message queues. An optional expected
//! peer count per VRF catches missing sessions.

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

/// Input parameters for [`BgpPeersEstablished`].
///
/// # Invariants
/// - `vrfs` must name at least one VRF.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct BgpInput {
    /// VRFs whose peers must all be established.
    vrfs: Vec<VrfExpectation>,
}

/// Expectation for one VRF.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct VrfExpectation {
    /// VRF name.
    #[serde(default = "default_vrf")]
    name: String,
    /// Optional exact number of peers expected in the VRF.
    peers: Option<usize>,
}

/// Default VRF name when the catalog omits it.
fn default_vrf() -> String {
    "default".to_string()
}

// ============================================================================
// SECTION: Payload Model
// ============================================================================

/// Structured `show bgp summary vrf all` payload.
#[derive(Debug, Deserialize)]
struct BgpSummary {
    /// Per-VRF summaries keyed by VRF name.
    vrfs: BTreeMap<String, VrfSummary>,
}

/// Summary for one VRF.
#[derive(Debug, Deserialize)]
struct VrfSummary {
    /// Per-peer summaries keyed by neighbor address.
    peers: BTreeMap<String, PeerSummary>,
}

/// Summary for one BGP peer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeerSummary {
    /// Session state reported by the device.
    peer_state: String,
    /// Queued inbound messages.
    in_msg_queue: u64,
    /// Queued outbound messages.
    out_msg_queue: u64,
}

// ============================================================================
// SECTION: Check Implementation
// ============================================================================

/// Verifies that all BGP peers in the configured VRFs are established.
///
/// # Invariants
/// - Registered under `bgp.peers-established`.
/// - A peer outside the configured VRFs never affects the verdict.
pub struct BgpPeersEstablished;

impl BgpPeersEstablished {
    /// Parses the typed input model from catalog parameters.
    fn input(params: &Value) -> Result<BgpInput, CheckError> {
        let input: BgpInput = serde_json::from_value(params.clone())
            .map_err(|err| CheckError::InvalidInput(err.to_string()))?;
        if input.vrfs.is_empty() {
            return Err(CheckError::InvalidInput("vrfs must not be empty".to_string()));
        }
        Ok(input)
    }
}

impl Check for BgpPeersEstablished {
    fn id(&self) -> CheckId {
        CheckId::new("bgp.peers-established")
    }

    fn commands(&self, params: &Value) -> Result<Vec<CommandRequest>, CheckError> {
        Self::input(params)?;
        Ok(vec![CommandRequest::json("show bgp summary vrf all")])
    }

    fn evaluate(&self, params: &Value, outputs: &[Value]) -> Result<Verdict, CheckError> {
        let input = Self::input(params)?;
        let payload = outputs
            .first()
            .ok_or_else(|| CheckError::PayloadShape("missing BGP summary output".to_string()))?;
        let summary: BgpSummary = serde_json::from_value(payload.clone())
            .map_err(|err| CheckError::PayloadShape(err.to_string()))?;

        let mut reasons = Vec::new();
        for expectation in &input.vrfs {
            let Some(vrf) = summary.vrfs.get(&expectation.name) else {
                reasons.push(format!("VRF {}: not configured", expectation.name));
                continue;
            };
            if let Some(expected) = expectation.peers {
                if vrf.peers.len() != expected {
                    reasons.push(format!(
                        "VRF {}: expected {} peers, found {}",
                        expectation.name,
                        expected,
                        vrf.peers.len()
                    ));
                }
            }
            for (neighbor, peer) in &vrf.peers {
                if peer.peer_state != "Established" {
                    reasons.push(format!(
                        "VRF {}: peer {}: state {}",
                        expectation.name, neighbor, peer.peer_state
                    ));
                } else if peer.in_msg_queue != 0 || peer.out_msg_queue != 0 {
                    reasons.push(format!(
                        "VRF {}: peer {}: messages queued (in {}, out {})",
                        expectation.name, neighbor, peer.in_msg_queue, peer.out_msg_queue
                    ));
                }
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
