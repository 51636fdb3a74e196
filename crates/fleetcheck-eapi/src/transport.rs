// crates/fleetcheck-eapi/src/transport.rs
// ============================================================================
// Module: eAPI Transport
// Description: JSON-RPC runCmds client implementing the command transport.
// Purpose: Execute device commands over HTTP with typed failure mapping.
// Dependencies: fleetcheck-core, reqwest, base64, url, serde, serde_json
// ============================================================================

//! ## Overview
//! The eAPI transport POSTs one JSON-RPC 2.0 `runCmds` request per command
//! to `<endpoint>/command-api` with HTTP basic authentication. Endpoints are
//! validated up front; requests run under the device's configured timeout.
//! Wire faults are classified into the engine's command failure taxonomy:
//! connection errors are `Unreachable`, elapsed timeouts are `Timeout`,
//! device-side JSON-RPC errors are `Rejected` with the device's reason, and
//! everything else is `Transport`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fleetcheck_core::CommandFailure;
use fleetcheck_core::CommandRequest;
use fleetcheck_core::CommandTransport;
use fleetcheck_core::DeviceSpec;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the eAPI transport.
///
/// # Invariants
/// - `connect_timeout` bounds TCP/TLS establishment only; the per-request
///   budget comes from each device's configured timeout.
/// - `accept_invalid_certs = false` rejects self-signed device certificates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EapiConfig {
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Accept self-signed or otherwise invalid device certificates.
    pub accept_invalid_certs: bool,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for EapiConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            accept_invalid_certs: false,
            user_agent: "fleetcheck/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Transport construction failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EapiError {
    /// The HTTP client could not be built.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

// ============================================================================
// SECTION: Wire Models
// ============================================================================

/// JSON-RPC 2.0 request envelope for `runCmds`.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    /// Protocol version marker.
    jsonrpc: &'static str,
    /// Invoked method name.
    method: &'static str,
    /// Method parameters.
    params: RpcParams<'a>,
    /// Correlation identifier.
    id: String,
}

/// Parameters of one `runCmds` invocation.
#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    /// Command API version.
    version: u32,
    /// Commands to run, one per request.
    cmds: Vec<RpcCmd<'a>>,
    /// Requested output format.
    format: &'a str,
}

/// One command entry on the wire.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RpcCmd<'a> {
    /// Plain command text.
    Plain(&'a str),
    /// Command text with a pinned output revision.
    Revisioned {
        /// Command text.
        cmd: &'a str,
        /// Pinned output revision.
        revision: u32,
    },
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    /// Per-command payloads on success.
    #[serde(default)]
    result: Option<Vec<Value>>,
    /// Error object when the device rejected the request.
    #[serde(default)]
    error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct RpcError {
    /// Human-readable device reason.
    message: String,
    /// Per-command error details, when present.
    #[serde(default)]
    data: Option<Vec<Value>>,
}

impl RpcError {
    /// Flattens the device reason, preferring per-command error strings.
    fn reason(&self) -> String {
        if let Some(data) = &self.data {
            let detailed: Vec<&str> = data
                .iter()
                .filter_map(|entry| entry.get("errors"))
                .filter_map(Value::as_array)
                .flatten()
                .filter_map(Value::as_str)
                .collect();
            if !detailed.is_empty() {
                return detailed.join("; ");
            }
        }
        self.message.clone()
    }
}

// ============================================================================
// SECTION: Transport Implementation
// ============================================================================

/// JSON-RPC `runCmds` transport over HTTP.
///
/// # Invariants
/// - One command per request; batching is never used.
/// - Request identifiers are unique within one transport instance.
pub struct EapiTransport {
    /// HTTP client used for outbound requests.
    client: Client,
    /// Monotonic request identifier counter.
    next_id: AtomicU64,
}

impl EapiTransport {
    /// Creates a new transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EapiError`] when the HTTP client cannot be built.
    pub fn new(config: &EapiConfig) -> Result<Self, EapiError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|err| EapiError::ClientBuild(err.to_string()))?;
        Ok(Self {
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Runs one command on the device and returns its payload.
    async fn run_command(
        &self,
        device: &DeviceSpec,
        request: &CommandRequest,
    ) -> Result<Value, CommandFailure> {
        let url = command_api_url(&device.endpoint)?;
        let body = RpcRequest {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RpcParams {
                version: 1,
                cmds: vec![wire_command(request)],
                format: request.format.as_str(),
            },
            id: format!("fleetcheck-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
        };

        let response = self
            .client
            .post(url)
            .timeout(device.timeout)
            .header("Authorization", basic_auth(&device.username, &device.password))
            .json(&body)
            .send()
            .await
            .map_err(|err| classify_send_error(&err, device))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CommandFailure::Unreachable(format!(
                "authentication rejected by {}",
                device.name
            )));
        }
        if !status.is_success() {
            return Err(CommandFailure::Transport(format!(
                "unexpected http status {status} from {}",
                device.name
            )));
        }

        let rpc: RpcResponse = response
            .json()
            .await
            .map_err(|err| CommandFailure::Transport(format!("malformed response: {err}")))?;
        if let Some(error) = rpc.error {
            return Err(CommandFailure::Rejected {
                command: request.command.clone(),
                reason: error.reason(),
            });
        }
        rpc.result
            .and_then(|mut payloads| {
                if payloads.is_empty() {
                    None
                } else {
                    Some(payloads.remove(0))
                }
            })
            .ok_or_else(|| CommandFailure::Transport("response carried no result".to_string()))
    }
}

#[async_trait]
impl CommandTransport for EapiTransport {
    async fn connect(&self, device: &DeviceSpec) -> Result<(), CommandFailure> {
        self.run_command(device, &CommandRequest::json("show version")).await.map(|_| ())
    }

    async fn execute(
        &self,
        device: &DeviceSpec,
        request: &CommandRequest,
    ) -> Result<Value, CommandFailure> {
        self.run_command(device, request).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the endpoint and appends the command API path.
fn command_api_url(endpoint: &str) -> Result<Url, CommandFailure> {
    let mut url = Url::parse(endpoint)
        .map_err(|err| CommandFailure::Transport(format!("invalid endpoint {endpoint}: {err}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CommandFailure::Transport(format!(
                "unsupported endpoint scheme {other}"
            )));
        }
    }
    if url.host_str().is_none() {
        return Err(CommandFailure::Transport(format!("endpoint host required: {endpoint}")));
    }
    url.set_path("/command-api");
    Ok(url)
}

/// Renders the wire form of one command request.
fn wire_command(request: &CommandRequest) -> RpcCmd<'_> {
    request.revision.map_or(RpcCmd::Plain(&request.command), |revision| RpcCmd::Revisioned {
        cmd: &request.command,
        revision,
    })
}

/// Builds the HTTP basic authentication header value.
fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Classifies a reqwest send error into a typed command failure.
fn classify_send_error(err: &reqwest::Error, device: &DeviceSpec) -> CommandFailure {
    if err.is_timeout() {
        let timeout_ms = u64::try_from(device.timeout.as_millis()).unwrap_or(u64::MAX);
        return CommandFailure::Timeout {
            timeout_ms,
        };
    }
    if err.is_connect() {
        return CommandFailure::Unreachable(format!("connection to {} failed", device.name));
    }
    CommandFailure::Transport(err.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
