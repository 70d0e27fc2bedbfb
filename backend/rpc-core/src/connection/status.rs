//! Connection status and event types.

use crate::error::protocol::ProtocolError;

/// Where the connection state machine currently is.
///
/// `Disconnected → Connecting → Open → Closed`; auto-reconnect loops back
/// from `Closed` to `Connecting`, `end()` makes `Closed` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Open,
    Closed,
}

/// Asynchronous notifications from the connection actor.
///
/// Failures inside the actor task have no call site to return to, so
/// everything that happens after `start()` returns is reported here:
/// lifecycle transitions, transport failures, and protocol violations (each
/// of which costs one dropped frame, never the connection).
#[derive(Debug)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    Transport(String),
    Protocol(ProtocolError),
}
