//! Test helpers for connection integration tests.
//!
//! This module provides an in-process WebSocket server the client connects
//! to over a real socket:
//! - Capturing frames the client sends
//! - Injecting frames toward the client
//! - Closing the connection server-side to provoke reconnects
//! - Observing accepted connections (to count reconnect attempts)

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use rpc_core::ClientEvent;

/// An in-process WebSocket server driving one client connection at a time.
///
/// After a server-side close it loops back to accept the next connection, so
/// reconnect tests observe each attempt on `accepts_rx`.
pub struct TestServer {
    /// `ws://127.0.0.1:{port}` address to hand to the client.
    pub address: String,
    /// Text frames received from the client, in arrival order.
    pub frames_rx: mpsc::UnboundedReceiver<String>,
    /// Text frames to send to the currently connected client.
    pub inject_tx: mpsc::UnboundedSender<String>,
    /// Signal to close the current connection server-side.
    pub close_tx: mpsc::UnboundedSender<()>,
    /// One unit per accepted TCP connection.
    pub accepts_rx: mpsc::UnboundedReceiver<()>,
}

/// Test helper: Bind a WebSocket server on an OS-assigned port and serve
/// connections until the returned [`TestServer`] is dropped.
pub async fn start_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!(
        "ws://{}",
        listener.local_addr().expect("Failed to read local addr")
    );

    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (inject_tx, mut inject_rx) = mpsc::unbounded_channel::<String>();
    let (close_tx, mut close_rx) = mpsc::unbounded_channel::<()>();
    let (accepts_tx, accepts_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            if accepts_tx.send(()).is_err() {
                return;
            }
            let Ok(mut socket) = accept_async(stream).await else {
                continue;
            };

            loop {
                tokio::select! {
                    message = socket.next() => match message {
                        Some(Ok(Message::Text(text))) => {
                            let _ = frames_tx.send(text.as_str().to_string());
                        }
                        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                        Some(Ok(_)) => {}
                    },
                    frame = inject_rx.recv() => match frame {
                        Some(frame) => {
                            if socket.send(Message::Text(frame.into())).await.is_err() {
                                break;
                            }
                        }
                        None => return,
                    },
                    signal = close_rx.recv() => match signal {
                        Some(()) => {
                            let _ = socket.close(None).await;
                            // Drain frames the client already sent so the
                            // close signal cannot race them off the socket.
                            while let Some(Ok(message)) = socket.next().await {
                                if let Message::Text(text) = message {
                                    let _ = frames_tx.send(text.as_str().to_string());
                                }
                            }
                            break;
                        }
                        None => return,
                    },
                }
            }
        }
    });

    TestServer {
        address,
        frames_rx,
        inject_tx,
        close_tx,
        accepts_rx,
    }
}

/// Test helper: Receive the next frame from the client as JSON, failing after
/// two seconds.
pub async fn recv_frame(server: &mut TestServer) -> Value {
    let frame = timeout(Duration::from_secs(2), server.frames_rx.recv())
        .await
        .expect("Timed out waiting for a frame")
        .expect("Server task gone");
    serde_json::from_str(&frame).expect("Client sent invalid JSON")
}

/// Test helper: Assert the client sends nothing for `ms` milliseconds.
pub async fn expect_no_frame(server: &mut TestServer, ms: u64) {
    if let Ok(frame) = timeout(Duration::from_millis(ms), server.frames_rx.recv()).await {
        panic!("Expected no frame, got {frame:?}");
    }
}

/// Test helper: Wait for the next accepted connection, failing after three
/// seconds.
pub async fn expect_accept(server: &mut TestServer) {
    timeout(Duration::from_secs(3), server.accepts_rx.recv())
        .await
        .expect("Timed out waiting for a connection")
        .expect("Server task gone");
}

/// Test helper: Drain events until one matches `predicate`, failing after two
/// seconds.
pub async fn wait_for_event(
    events: &mut mpsc::UnboundedReceiver<ClientEvent>,
    mut predicate: impl FnMut(&ClientEvent) -> bool,
) -> ClientEvent {
    timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.expect("Event channel closed");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}
