//! Connection management.
//!
//! [`start`] validates the address, spawns a connection actor, and returns a
//! [`ClientHandle`]. The actor exclusively owns the socket, the receiver, the
//! reconnect policy, and the reconnect timer; nothing is shared across
//! instances and no process-wide state exists.
//!
//! # State machine
//!
//! `Disconnected --start--> Connecting --open--> Open --close--> Closed`.
//! From `Closed` with auto-reconnect on, the actor re-enters `Connecting`
//! after the policy delay, reusing the same receiver, address, and initial
//! info. [`ClientHandle::end`] forces terminal `Closed` from any state and
//! cancels an in-flight reconnect timer.
//!
//! # Failure surfaces
//!
//! Only a malformed or non-ws address fails synchronously. Resolution and
//! connect failures arrive as [`ClientEvent::Transport`] followed by the
//! normal close handling, because they can only be discovered after the dial.

mod actor;
mod handle;
mod status;

pub use handle::ClientHandle;
pub use status::{ClientEvent, ConnectionStatus};

use crate::config::ClientConfig;
use crate::dispatch::Receiver;
use crate::error::CoreError;
use crate::error::connection::ConnectionError;
use crate::reconnect::{ExponentialDelay, FixedDelay, ReconnectPolicy};

use actor::ConnectionActor;
use common::ErrorLocation;

use std::panic::Location;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use url::Url;

/// Start a connection to `address` with the default fixed-delay reconnect
/// policy.
///
/// If `initial_info` is `Some`, a `status` envelope carrying it is sent on
/// every successful open, including reopens after a reconnect.
///
/// # Errors
///
/// Returns [`ConnectionError`] if `address` is not a well-formed `ws://` or
/// `wss://` URI. Anything discovered after the dial surfaces asynchronously
/// on the handle's event channel, never here.
pub fn start(
    receiver: Box<dyn Receiver>,
    initial_info: Option<Value>,
    address: &str,
    auto_reconnect: bool,
) -> Result<ClientHandle, ConnectionError> {
    start_with_policy(
        receiver,
        initial_info,
        address,
        auto_reconnect,
        Box::new(FixedDelay::default()),
    )
}

/// Start a connection with a caller-supplied reconnect policy.
///
/// # Errors
///
/// Same as [`start`].
pub fn start_with_policy(
    receiver: Box<dyn Receiver>,
    initial_info: Option<Value>,
    address: &str,
    auto_reconnect: bool,
    policy: Box<dyn ReconnectPolicy>,
) -> Result<ClientHandle, ConnectionError> {
    let address = validate_address(address)?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let actor = ConnectionActor {
        address,
        receiver,
        initial_info,
        auto_reconnect,
        policy,
        command_rx,
        status_tx,
        events_tx,
    };

    tokio::spawn(actor.run());

    Ok(ClientHandle::new(command_tx, status_rx, events_rx))
}

/// Start a connection described by a [`ClientConfig`].
///
/// A configured `max_elapsed_secs` selects the exponential backoff policy;
/// otherwise the fixed-delay policy runs with the configured delay.
///
/// # Errors
///
/// Returns [`CoreError`] if the config fails validation or names no address.
pub fn start_with_config(
    receiver: Box<dyn Receiver>,
    initial_info: Option<Value>,
    config: &ClientConfig,
) -> Result<ClientHandle, CoreError> {
    config.validate()?;

    let address = config
        .server
        .address
        .as_deref()
        .ok_or_else(|| ConnectionError::MissingAddress {
            message: "no server address configured".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let policy: Box<dyn ReconnectPolicy> = match config.max_elapsed() {
        Some(max_elapsed) => Box::new(ExponentialDelay::new(
            config.reconnect_delay(),
            Some(max_elapsed),
        )),
        None => Box::new(FixedDelay::new(config.reconnect_delay())),
    };

    Ok(start_with_policy(
        receiver,
        initial_info,
        address,
        config.server.auto_reconnect,
        policy,
    )?)
}

fn validate_address(address: &str) -> Result<Url, ConnectionError> {
    let url = Url::parse(address).map_err(|e| ConnectionError::InvalidAddress {
        message: format!("{:?}: {}", address, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        scheme => Err(ConnectionError::UnsupportedScheme {
            scheme: scheme.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
