// crates/fleetcheck-eapi/tests/eapi_transport.rs
// ============================================================================
// Module: eAPI Transport Tests
// Description: Wire-level tests against a local HTTP stub server.
// Purpose: Verify request shape, authentication, and failure classification.
// ============================================================================

//! Transport tests driving a local stub that records each request.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use fleetcheck_core::CommandFailure;
use fleetcheck_core::CommandRequest;
use fleetcheck_core::CommandTransport;
use fleetcheck_core::DeviceSpec;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Stub Server
// ============================================================================

/// One request captured by the stub server.
struct Captured {
    /// Request path.
    path: String,
    /// Authorization header value, when present.
    authorization: Option<String>,
    /// Parsed JSON request body.
    body: Value,
}

/// Spawns a stub that answers every request with the given status and body.
fn spawn_stub(status: u16, body: String) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        while let Ok(mut request) = server.recv() {
            let mut content = String::new();
            let _ = request.as_reader().read_to_string(&mut content);
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.to_string());
            let captured = Captured {
                path: request.url().to_string(),
                authorization,
                body: serde_json::from_str(&content).unwrap_or(Value::Null),
            };
            let _ = tx.send(captured);
            let response = Response::from_string(body.clone()).with_status_code(status).with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
            );
            let _ = request.respond(response);
        }
    });
    (format!("http://{addr}"), rx)
}

/// Builds a device spec pointed at the stub endpoint.
fn stub_device(endpoint: &str) -> DeviceSpec {
    DeviceSpec::new("leaf1", endpoint, "admin", "secret")
}

/// Builds a transport with default configuration.
fn transport() -> fleetcheck_eapi::EapiTransport {
    fleetcheck_eapi::EapiTransport::new(&fleetcheck_eapi::EapiConfig::default()).unwrap()
}

/// Canned successful runCmds response with one payload.
fn success_body(payload: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": "fleetcheck-1", "result": [payload] }).to_string()
}

// ============================================================================
// SECTION: Request Shape
// ============================================================================

#[tokio::test]
async fn execute_posts_a_run_cmds_request_with_basic_auth() {
    let (endpoint, rx) = spawn_stub(200, success_body(json!({ "ok": true })));
    let device = stub_device(&endpoint);

    let payload =
        transport().execute(&device, &CommandRequest::json("show version")).await.unwrap();
    assert_eq!(payload, json!({ "ok": true }));

    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(captured.path, "/command-api");
    assert_eq!(captured.authorization.as_deref(), Some("Basic YWRtaW46c2VjcmV0"));
    assert_eq!(captured.body["method"], json!("runCmds"));
    assert_eq!(captured.body["params"]["version"], json!(1));
    assert_eq!(captured.body["params"]["format"], json!("json"));
    assert_eq!(captured.body["params"]["cmds"], json!(["show version"]));
}

#[tokio::test]
async fn revision_pins_are_sent_as_command_objects() {
    let (endpoint, rx) = spawn_stub(200, success_body(json!({})));
    let device = stub_device(&endpoint);

    let request = CommandRequest::json("show bgp summary").with_revision(2);
    transport().execute(&device, &request).await.unwrap();

    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(
        captured.body["params"]["cmds"],
        json!([{ "cmd": "show bgp summary", "revision": 2 }])
    );
}

#[tokio::test]
async fn connect_probes_with_show_version() {
    let (endpoint, rx) = spawn_stub(200, success_body(json!({ "version": "4.32.1F" })));
    let device = stub_device(&endpoint);

    transport().connect(&device).await.unwrap();

    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(captured.body["params"]["cmds"], json!(["show version"]));
}

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

#[tokio::test]
async fn json_rpc_error_maps_to_rejected_with_device_reason() {
    let body = json!({
        "jsonrpc": "2.0",
        "id": "fleetcheck-1",
        "error": {
            "code": 1002,
            "message": "CLI command 1 of 1 failed",
            "data": [{ "errors": ["BGP inactive"] }],
        },
    })
    .to_string();
    let (endpoint, _rx) = spawn_stub(200, body);
    let device = stub_device(&endpoint);

    let err = transport()
        .execute(&device, &CommandRequest::json("show bgp summary"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CommandFailure::Rejected {
            command: "show bgp summary".to_string(),
            reason: "BGP inactive".to_string(),
        }
    );
}

#[tokio::test]
async fn unauthorized_maps_to_unreachable() {
    let (endpoint, _rx) = spawn_stub(401, "{}".to_string());
    let device = stub_device(&endpoint);

    let err =
        transport().execute(&device, &CommandRequest::json("show version")).await.unwrap_err();
    assert!(matches!(err, CommandFailure::Unreachable(_)), "{err}");
}

#[tokio::test]
async fn malformed_body_maps_to_transport() {
    let (endpoint, _rx) = spawn_stub(200, "not json".to_string());
    let device = stub_device(&endpoint);

    let err =
        transport().execute(&device, &CommandRequest::json("show version")).await.unwrap_err();
    assert!(matches!(err, CommandFailure::Transport(_)), "{err}");
}

#[tokio::test]
async fn empty_result_maps_to_transport() {
    let body = json!({ "jsonrpc": "2.0", "id": "fleetcheck-1", "result": [] }).to_string();
    let (endpoint, _rx) = spawn_stub(200, body);
    let device = stub_device(&endpoint);

    let err =
        transport().execute(&device, &CommandRequest::json("show version")).await.unwrap_err();
    assert!(matches!(err, CommandFailure::Transport(_)), "{err}");
}

#[tokio::test]
async fn refused_connection_maps_to_unreachable() {
    // Bind then drop to get a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let device = stub_device(&format!("http://{addr}"));

    let err =
        transport().execute(&device, &CommandRequest::json("show version")).await.unwrap_err();
    assert!(matches!(err, CommandFailure::Unreachable(_)), "{err}");
}

#[tokio::test]
async fn invalid_endpoint_maps_to_transport() {
    let device = stub_device("not a url");

    let err =
        transport().execute(&device, &CommandRequest::json("show version")).await.unwrap_err();
    assert!(matches!(err, CommandFailure::Transport(_)), "{err}");
}
