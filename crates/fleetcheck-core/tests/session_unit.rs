// crates/fleetcheck-core/tests/session_unit.rs
// ============================================================================
// Module: Session Unit Tests
// Description: Per-device command cache and connection memoization behavior.
// Purpose: Ensure each distinct command reaches the transport at most once.
// ============================================================================

//! Session tests for command deduplication and connect memoization.

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

#[allow(dead_code, reason = "fixtures are shared across test binaries")]
mod common;

use std::sync::Arc;
use std::time::Duration;

use fleetcheck_core::CommandFailure;
use fleetcheck_core::CommandRequest;
use fleetcheck_core::DeviceSession;
use serde_json::json;

use crate::common::MockTransport;
use crate::common::device;

/// Builds a session over the given transport for a fixture device.
fn session(transport: &Arc<MockTransport>) -> Arc<DeviceSession> {
    Arc::new(DeviceSession::new(
        device("leaf1"),
        Arc::clone(transport) as _,
    ))
}

#[tokio::test]
async fn concurrent_requesters_share_one_remote_call() {
    let transport = Arc::new(
        MockTransport::new()
            .with_latency(Duration::from_millis(30))
            .respond("leaf1", "show bgp summary", json!({ "vrfs": {} })),
    );
    let session = session(&transport);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let session = Arc::clone(&session);
        handles.push(tokio::spawn(async move {
            session.execute(&CommandRequest::json("show bgp summary")).await
        }));
    }
    for handle in handles {
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.payload(), Some(&json!({ "vrfs": {} })));
    }
    assert_eq!(transport.calls_for("leaf1", "show bgp summary"), 1);
    assert_eq!(session.remote_calls(), 1);
}

#[tokio::test]
async fn distinct_formats_are_distinct_cache_entries() {
    let transport = Arc::new(MockTransport::new());
    let session = session(&transport);

    let first = session.execute(&CommandRequest::json("show version")).await;
    let second = session.execute(&CommandRequest::text("show version")).await;
    assert!(first.payload().is_some());
    assert!(second.payload().is_some());
    assert_eq!(transport.calls_for("leaf1", "show version"), 2);
}

#[tokio::test]
async fn revisions_are_distinct_cache_entries() {
    let transport = Arc::new(MockTransport::new());
    let session = session(&transport);

    session
        .execute(&CommandRequest::json("show bgp summary"))
        .await;
    session
        .execute(&CommandRequest::json("show bgp summary").with_revision(2))
        .await;
    session
        .execute(&CommandRequest::json("show bgp summary").with_revision(2))
        .await;
    assert_eq!(transport.calls_for("leaf1", "show bgp summary"), 2);
}

#[tokio::test]
async fn captured_failure_is_terminal_for_all_readers() {
    let transport = Arc::new(MockTransport::new().fail_command(
        "leaf1",
        "show bgp summary",
        CommandFailure::Timeout { timeout_ms: 30_000 },
    ));
    let session = session(&transport);

    for _ in 0..3 {
        let outcome = session.execute(&CommandRequest::json("show bgp summary")).await;
        assert_eq!(
            outcome.failure(),
            Some(&CommandFailure::Timeout { timeout_ms: 30_000 })
        );
    }
    assert_eq!(transport.calls_for("leaf1", "show bgp summary"), 1);
}

#[tokio::test]
async fn connect_is_attempted_once_per_session() {
    let transport = Arc::new(MockTransport::new());
    let session = session(&transport);

    for _ in 0..4 {
        session.connect().await.unwrap();
    }
    assert_eq!(transport.connects_to("leaf1"), 1);
}

#[tokio::test]
async fn failed_connect_is_memoized() {
    let transport = Arc::new(MockTransport::new().unreachable("leaf1"));
    let session = session(&transport);

    for _ in 0..3 {
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, CommandFailure::Unreachable(_)));
    }
    assert_eq!(transport.connects_to("leaf1"), 1);
}

#[tokio::test]
async fn abandoned_waiter_does_not_kill_the_in_flight_call() {
    let transport = Arc::new(
        MockTransport::new().with_latency(Duration::from_millis(80)),
    );
    let session = session(&transport);

    // The first requester gives up before the call completes.
    let early = {
        let session = Arc::clone(&session);
        tokio::time::timeout(Duration::from_millis(20), async move {
            session.execute(&CommandRequest::json("show slow")).await
        })
        .await
    };
    assert!(early.is_err());

    // A later requester is satisfied by the same call.
    let outcome = session.execute(&CommandRequest::json("show slow")).await;
    assert!(outcome.payload().is_some());
    assert_eq!(transport.calls_for("leaf1", "show slow"), 1);
}
