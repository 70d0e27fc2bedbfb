use crate::connection_tests::helpers::{
    TestServer, expect_accept, expect_no_frame, recv_frame, start_test_server, wait_for_event,
};

use rpc_core::{
    ClientEvent, ClientHandle, ConnectionStatus, FixedDelay, MethodTable, start, start_with_policy,
};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

async fn connect(server: &mut TestServer, initial_info: Option<Value>) -> ClientHandle {
    let mut handle = start(
        Box::new(MethodTable::new()),
        initial_info,
        &server.address,
        false,
    )
    .expect("Failed to start client");
    expect_accept(server).await;
    handle.wait_for_status(ConnectionStatus::Open).await;
    handle
}

/// **VALUE**: Verifies the initial info is announced as a `status` frame the
/// moment the connection opens.
///
/// **WHY THIS MATTERS**: Servers key client registration off this first
/// frame. If it is missing, late, or misshapen, the client is connected but
/// anonymous.
///
/// **BUG THIS CATCHES**: Would catch the open path forgetting the initial
/// send or wrapping the info in the wrong envelope.
#[tokio::test]
async fn given_initial_info_when_connection_opens_then_status_frame_sent() {
    // GIVEN: A server and a client started with initial info
    let mut server = start_test_server().await;
    let _handle = connect(&mut server, Some(json!({"status": "ready"}))).await;

    // THEN: The first frame is the status envelope carrying that info
    assert_eq!(
        recv_frame(&mut server).await,
        json!({"messageType": "status", "info": {"status": "ready"}})
    );
}

/// **VALUE**: Verifies an inbound `remoteCall` frame invokes the registered
/// handler exactly once with its args.
///
/// **WHY THIS MATTERS**: This is the full inbound pipeline over a real
/// socket: frame read, decode, validation, dispatch. Every server-initiated
/// call rides this path.
///
/// **BUG THIS CATCHES**: Would catch the event loop dropping text frames,
/// the codec mangling args, or dispatch running handlers twice.
#[tokio::test]
async fn given_inbound_remote_call_when_received_then_handler_invoked_once() {
    // GIVEN: A client whose receiver records greet invocations
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let mut table = MethodTable::new();
    table.register("greet", move |args| {
        recorder.lock().expect("Lock poisoned").push(args);
    });

    let mut server = start_test_server().await;
    let mut handle = start(Box::new(table), None, &server.address, false)
        .expect("Failed to start client");
    expect_accept(&mut server).await;
    handle.wait_for_status(ConnectionStatus::Open).await;

    // WHEN: The server sends a remoteCall frame
    server
        .inject_tx
        .send(r#"{"messageType":"remoteCall","method":"greet","args":["world"]}"#.to_string())
        .expect("Server task gone");

    // THEN: The handler runs once with the args in order
    timeout(Duration::from_secs(2), async {
        loop {
            if !seen.lock().expect("Lock poisoned").is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Handler was never invoked");

    assert_eq!(
        seen.lock().expect("Lock poisoned").as_slice(),
        &[vec![json!("world")]]
    );
}

/// **VALUE**: Verifies `remote_call` produces the exact `remoteCall` wire
/// frame.
///
/// **BUG THIS CATCHES**: Would catch the handle, actor, or codec reshaping
/// the envelope between the call site and the socket.
#[tokio::test]
async fn given_open_connection_when_remote_call_then_exact_frame_on_wire() {
    let mut server = start_test_server().await;
    let handle = connect(&mut server, None).await;

    handle
        .remote_call("obj1", "greet", vec![json!("world"), json!(2)])
        .expect("Call should be accepted");

    assert_eq!(
        recv_frame(&mut server).await,
        json!({
            "messageType": "remoteCall",
            "object": "obj1",
            "method": "greet",
            "args": ["world", 2]
        })
    );
}

/// **VALUE**: Verifies `remote_call_by_user_name` produces its camelCase wire
/// frame.
#[tokio::test]
async fn given_open_connection_when_call_by_user_name_then_exact_frame_on_wire() {
    let mut server = start_test_server().await;
    let handle = connect(&mut server, None).await;

    handle
        .remote_call_by_user_name("ada", "notify", vec![json!(1)])
        .expect("Call should be accepted");

    assert_eq!(
        recv_frame(&mut server).await,
        json!({
            "messageType": "remoteCallConnectedUserByUserName",
            "userName": "ada",
            "method": "notify",
            "args": [1]
        })
    );
}

/// **VALUE**: Verifies calling a private method fails synchronously and
/// nothing reaches the wire.
///
/// **WHY THIS MATTERS**: The marker is the only privacy boundary in the
/// protocol. Rejecting the name but sending the frame anyway would be worse
/// than no check at all.
///
/// **BUG THIS CATCHES**: Would catch a check that runs after the frame is
/// queued.
#[tokio::test]
async fn given_private_method_when_called_then_error_and_no_frame() {
    let mut server = start_test_server().await;
    let handle = connect(&mut server, None).await;

    // WHEN: Naming a private method on both call flavors
    assert!(handle.remote_call("obj1", "_secret", vec![]).is_err());
    assert!(
        handle
            .remote_call_by_user_name("ada", "_secret", vec![])
            .is_err()
    );

    // THEN: The wire stays silent
    expect_no_frame(&mut server, 300).await;
}

/// **VALUE**: Verifies the client reconnects by itself after a server-side
/// close.
///
/// **WHY THIS MATTERS**: Automatic reconnection is the reason this crate
/// exists; a close that silently kills the session defeats it.
///
/// **BUG THIS CATCHES**: Would catch the actor treating a peer close as
/// terminal despite auto-reconnect, or never re-dialing after the delay.
#[tokio::test]
async fn given_auto_reconnect_when_server_closes_then_client_reconnects() {
    // GIVEN: A client with a short fixed reconnect delay
    let mut server = start_test_server().await;
    let mut handle = start_with_policy(
        Box::new(MethodTable::new()),
        Some(json!({"id": 7})),
        &server.address,
        true,
        Box::new(FixedDelay::new(Duration::from_millis(100))),
    )
    .expect("Failed to start client");

    expect_accept(&mut server).await;
    handle.wait_for_status(ConnectionStatus::Open).await;

    // WHEN: The server closes the connection
    server.close_tx.send(()).expect("Server task gone");

    // THEN: A second connection arrives and re-announces the initial info
    expect_accept(&mut server).await;
    handle.wait_for_status(ConnectionStatus::Open).await;
    assert_eq!(
        recv_frame(&mut server).await,
        json!({"messageType": "status", "info": {"id": 7}})
    );
    assert_eq!(
        recv_frame(&mut server).await,
        json!({"messageType": "status", "info": {"id": 7}})
    );
}

/// **VALUE**: Verifies `end()` during the reconnect wait cancels the pending
/// attempt.
///
/// **WHY THIS MATTERS**: A reconnect timer armed before `end()` must not
/// resurrect the connection afterward. A client that was told to stop and
/// quietly dials again is a resource leak and a correctness bug.
///
/// **BUG THIS CATCHES**: Would catch a timer that fires into a new dial
/// because shutdown only took effect at schedule time, not at fire time.
#[tokio::test]
async fn given_pending_reconnect_when_ended_then_no_new_connection() {
    // GIVEN: A client waiting out a generous reconnect delay
    let mut server = start_test_server().await;
    let mut handle = start_with_policy(
        Box::new(MethodTable::new()),
        None,
        &server.address,
        true,
        Box::new(FixedDelay::new(Duration::from_millis(500))),
    )
    .expect("Failed to start client");

    expect_accept(&mut server).await;
    handle.wait_for_status(ConnectionStatus::Open).await;

    server.close_tx.send(()).expect("Server task gone");
    handle.wait_for_status(ConnectionStatus::Closed).await;

    // WHEN: Ending while the timer is pending
    handle.end();

    // THEN: The timer never produces a new connection
    let second_accept = timeout(Duration::from_millis(900), server.accepts_rx.recv()).await;
    assert!(second_accept.is_err(), "Reconnect fired after end()");
}

/// **VALUE**: Verifies a protocol-violating inbound frame is dropped without
/// killing the connection.
///
/// **WHY THIS MATTERS**: One misbehaving server frame must cost exactly one
/// frame. Tearing the connection down would turn every peer bug into a full
/// reconnect cycle.
///
/// **BUG THIS CATCHES**: Would catch the event loop treating a decode error
/// like a transport error.
#[tokio::test]
async fn given_invalid_inbound_frame_when_received_then_event_and_connection_survives() {
    let mut server = start_test_server().await;
    let mut handle = connect(&mut server, None).await;
    let mut events = handle.take_events().expect("Events already taken");

    // WHEN: The server sends a frame type the client never accepts
    server
        .inject_tx
        .send(r#"{"messageType":"status","info":{}}"#.to_string())
        .expect("Server task gone");

    // THEN: A protocol event is emitted
    wait_for_event(&mut events, |event| {
        matches!(event, ClientEvent::Protocol(_))
    })
    .await;

    // THEN: The connection still carries outbound traffic
    assert_eq!(handle.status(), ConnectionStatus::Open);
    handle
        .remote_call("obj1", "ping", vec![])
        .expect("Call should be accepted");
    assert_eq!(
        recv_frame(&mut server).await,
        json!({"messageType": "remoteCall", "object": "obj1", "method": "ping", "args": []})
    );
}

/// **VALUE**: Verifies a refused dial surfaces as a transport event and later
/// sends are silently dropped.
///
/// **WHY THIS MATTERS**: Connect failures can only be discovered after the
/// dial, so they must arrive on the event channel; and with nothing open,
/// outbound calls must vanish rather than queue or panic.
///
/// **BUG THIS CATCHES**: Would catch a start path that panics on connection
/// refusal, or a handle that buffers frames for a connection that never
/// existed.
#[tokio::test]
async fn given_no_server_when_started_then_transport_event_and_sends_dropped() {
    // GIVEN: An address nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let address = format!(
        "ws://{}",
        listener.local_addr().expect("Failed to read local addr")
    );
    drop(listener);

    let mut handle = start(Box::new(MethodTable::new()), None, &address, false)
        .expect("Failed to start client");
    let mut events = handle.take_events().expect("Events already taken");

    // THEN: The failure arrives as a transport event, then terminal close
    wait_for_event(&mut events, |event| {
        matches!(event, ClientEvent::Transport(_))
    })
    .await;
    handle.wait_for_status(ConnectionStatus::Closed).await;

    // WHEN/THEN: Sends against the dead connection are silent no-ops
    handle.send_status(json!({"status": "ready"}));
    handle
        .remote_call("obj1", "ping", vec![])
        .expect("Method name is valid, so the call is accepted and dropped");
    assert_eq!(handle.status(), ConnectionStatus::Closed);
}

/// **VALUE**: Verifies `end()` on an open connection closes it for good.
///
/// **BUG THIS CATCHES**: Would catch an end path that leaves the status stuck
/// at Open or lets the actor dial again.
#[tokio::test]
async fn given_open_connection_when_ended_then_terminal_close() {
    let mut server = start_test_server().await;
    let mut handle = connect(&mut server, None).await;

    // WHEN: Ending the connection
    handle.end();

    // THEN: Status reaches Closed and stays there; no new dial follows
    handle.wait_for_status(ConnectionStatus::Closed).await;
    let second_accept = timeout(Duration::from_millis(300), server.accepts_rx.recv()).await;
    assert!(second_accept.is_err(), "Client dialed again after end()");
    assert_eq!(handle.status(), ConnectionStatus::Closed);
}

/// **VALUE**: Verifies `send_status` after open delivers a caller-shaped
/// status frame.
#[tokio::test]
async fn given_open_connection_when_send_status_then_status_frame_on_wire() {
    let mut server = start_test_server().await;
    let handle = connect(&mut server, None).await;

    handle.send_status(json!({"status": "busy", "load": 3}));

    assert_eq!(
        recv_frame(&mut server).await,
        json!({"messageType": "status", "info": {"status": "busy", "load": 3}})
    );
}
