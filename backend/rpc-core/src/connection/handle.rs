//! Client handle type.
//!
//! The handle returned by the start functions. It carries the command channel
//! into the connection actor plus the status and event channels out of it;
//! the actor owns everything else.

use crate::codec::Envelope;
use crate::connection::status::{ClientEvent, ConnectionStatus};
use crate::dispatch;
use crate::error::envelope::EnvelopeError;

use log::debug;
use serde_json::Value;
use tokio::sync::{mpsc, watch};

/// Commands the handle sends into the connection actor.
#[derive(Debug)]
pub(crate) enum Command {
    SendStatus(Value),
    Send(Envelope),
    End,
}

/// Handle to a running connection actor.
///
/// # Lifecycle
///
/// Dropping the last handle closes the command channel, which the actor
/// treats exactly like [`end`](ClientHandle::end): the socket is closed and
/// any pending reconnect timer is cancelled. No background task outlives its
/// handles.
pub struct ClientHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<ConnectionStatus>,
    events_rx: Option<mpsc::UnboundedReceiver<ClientEvent>>,
}

impl ClientHandle {
    pub(crate) fn new(
        command_tx: mpsc::UnboundedSender<Command>,
        status_rx: watch::Receiver<ConnectionStatus>,
        events_rx: mpsc::UnboundedReceiver<ClientEvent>,
    ) -> Self {
        Self {
            command_tx,
            status_rx,
            events_rx: Some(events_rx),
        }
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Wait until the connection reaches `target`.
    ///
    /// Returns immediately if it is already there. If the actor has shut down
    /// and the status can no longer change, this returns as well.
    pub async fn wait_for_status(&mut self, target: ConnectionStatus) {
        let _ = self.status_rx.wait_for(|status| *status == target).await;
    }

    /// Take the event channel. Yields `Some` exactly once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ClientEvent>> {
        self.events_rx.take()
    }

    /// Send a `status` envelope if the connection is open.
    ///
    /// A silent no-op otherwise: no queuing, no error.
    pub fn send_status(&self, info: Value) {
        if self.status() != ConnectionStatus::Open {
            debug!("Dropping status frame: connection not open");
            return;
        }
        let _ = self.command_tx.send(Command::SendStatus(info));
    }

    /// Call `method` on the named remote object.
    ///
    /// Dropped silently when the connection is not open.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] if `method` is empty or starts with the
    /// private-method marker. The check is synchronous and runs before any
    /// frame is constructed, in every connection state.
    pub fn remote_call(
        &self,
        object: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<(), EnvelopeError> {
        dispatch::ensure_public(method)?;
        self.send_envelope(Envelope::RemoteCall {
            object: object.to_string(),
            method: method.to_string(),
            args,
        });
        Ok(())
    }

    /// Call `method` on the connected user registered under `user_name`.
    ///
    /// Same method-name restriction and not-open behavior as
    /// [`remote_call`](ClientHandle::remote_call).
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] if `method` is empty or private.
    pub fn remote_call_by_user_name(
        &self,
        user_name: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<(), EnvelopeError> {
        dispatch::ensure_public(method)?;
        self.send_envelope(Envelope::RemoteCallByUserName {
            user_name: user_name.to_string(),
            method: method.to_string(),
            args,
        });
        Ok(())
    }

    /// Shut the connection down for good.
    ///
    /// Closes the socket if one is open, disables auto-reconnect, and cancels
    /// any pending reconnect timer - a timer armed before `end()` can never
    /// create a new connection afterward. Idempotent; callable from any state.
    pub fn end(&self) {
        let _ = self.command_tx.send(Command::End);
    }

    fn send_envelope(&self, envelope: Envelope) {
        if self.status() != ConnectionStatus::Open {
            debug!("Dropping outbound frame: connection not open");
            return;
        }
        let _ = self.command_tx.send(Command::Send(envelope));
    }
}
