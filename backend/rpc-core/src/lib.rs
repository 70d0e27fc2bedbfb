//! Reconnecting, message-framed RPC client over a single WebSocket connection.
//!
//! The crate is organized around four cooperating responsibilities:
//!
//! - [`connection`] - owns the socket and the reconnect timer, drives the
//!   connection state machine, and exposes the public operations
//!   (`start`, `end`, `send_status`, `remote_call`).
//! - [`reconnect`] - pluggable reconnection policies (fixed delay by default).
//! - [`codec`] - serializes outbound envelopes to JSON text frames and
//!   validates inbound frames.
//! - [`dispatch`] - routes validated inbound calls to named methods on a
//!   caller-supplied receiver.

pub mod codec;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod reconnect;

#[cfg(test)]
mod tests;

/// Leading character that marks a method as private. Private methods can
/// never be named in an outbound call and are rejected on inbound dispatch.
pub const PRIVATE_METHOD_MARKER: char = '_';

pub use codec::{Envelope, InboundCall};
pub use connection::{ClientEvent, ClientHandle, ConnectionStatus, start, start_with_config, start_with_policy};
pub use dispatch::{MethodTable, Receiver};
pub use error::CoreError;
pub use reconnect::{DEFAULT_RECONNECT_DELAY, ExponentialDelay, FixedDelay, ReconnectPolicy};
