//! The connection actor.
//!
//! One spawned task exclusively owns the socket, the receiver, the reconnect
//! policy, and the reconnect timer. All mutation happens inside this task;
//! handles talk to it over the command channel and observe it through the
//! status and event channels. Because the reconnect wait races the timer
//! against the command channel, `end()` cancels a pending reconnect at the
//! moment it would fire, not merely at the moment it was scheduled.

use crate::codec::{self, Envelope};
use crate::connection::handle::Command;
use crate::connection::status::{ClientEvent, ConnectionStatus};
use crate::dispatch::{self, Receiver};
use crate::reconnect::ReconnectPolicy;

use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// How an open session finished.
enum SessionEnd {
    /// `end()` was called or every handle was dropped. Terminal.
    Ended,
    /// The peer closed or the transport failed. Reconnect may follow.
    Closed,
}

pub(crate) struct ConnectionActor {
    pub(crate) address: Url,
    pub(crate) receiver: Box<dyn Receiver>,
    pub(crate) initial_info: Option<Value>,
    pub(crate) auto_reconnect: bool,
    pub(crate) policy: Box<dyn ReconnectPolicy>,
    pub(crate) command_rx: mpsc::UnboundedReceiver<Command>,
    pub(crate) status_tx: watch::Sender<ConnectionStatus>,
    pub(crate) events_tx: mpsc::UnboundedSender<ClientEvent>,
}

impl ConnectionActor {
    pub(crate) async fn run(mut self) {
        loop {
            // Frames issued while not open are dropped, not queued.
            if !self.drain_pending() {
                break;
            }

            self.set_status(ConnectionStatus::Connecting);
            info!("Connecting to {}", self.address);

            match connect_async(self.address.as_str()).await {
                Ok((socket, _)) => {
                    self.set_status(ConnectionStatus::Open);
                    info!("Connection open to {}", self.address);
                    self.emit(ClientEvent::Connected);
                    self.policy.reset();

                    if let SessionEnd::Ended = self.run_open(socket).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Connection to {} failed: {}", self.address, e);
                    self.emit(ClientEvent::Transport(e.to_string()));
                }
            }

            self.set_status(ConnectionStatus::Closed);
            self.emit(ClientEvent::Disconnected);

            if !self.auto_reconnect {
                break;
            }

            let Some(delay) = self.policy.next_delay() else {
                info!("Reconnect policy gave up; shutting down");
                break;
            };

            debug!("Reconnecting to {} in {:?}", self.address, delay);
            if !self.wait_reconnect(delay).await {
                break;
            }
        }

        self.set_status(ConnectionStatus::Closed);
        info!("Connection to {} shut down", self.address);
    }

    /// Drive one open connection until the peer closes it or `end()` arrives.
    async fn run_open(&mut self, socket: WebSocketStream<MaybeTlsStream<TcpStream>>) -> SessionEnd {
        let (mut write, mut read) = socket.split();

        if let Some(info) = self.initial_info.clone() {
            if !self.send_frame(&mut write, &Envelope::Status { info }).await {
                return SessionEnd::Closed;
            }
        }

        loop {
            tokio::select! {
                message = read.next() => match message {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_str()),
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Connection to {} closed by peer", self.address);
                        return SessionEnd::Closed;
                    }
                    Some(Ok(_)) => {
                        // Binary, ping, pong: nothing of ours travels there.
                    }
                    Some(Err(e)) => {
                        warn!("Transport error on {}: {}", self.address, e);
                        self.emit(ClientEvent::Transport(e.to_string()));
                        return SessionEnd::Closed;
                    }
                },
                command = self.command_rx.recv() => match command {
                    Some(Command::SendStatus(info)) => {
                        if !self.send_frame(&mut write, &Envelope::Status { info }).await {
                            return SessionEnd::Closed;
                        }
                    }
                    Some(Command::Send(envelope)) => {
                        if !self.send_frame(&mut write, &envelope).await {
                            return SessionEnd::Closed;
                        }
                    }
                    Some(Command::End) | None => {
                        self.auto_reconnect = false;
                        let _ = write.send(Message::Close(None)).await;
                        return SessionEnd::Ended;
                    }
                },
            }
        }
    }

    /// Decode and dispatch one inbound text frame.
    ///
    /// Protocol violations are recoverable: log, emit, drop the frame, keep
    /// the connection.
    fn handle_frame(&mut self, frame: &str) {
        let result = codec::decode_inbound(frame)
            .and_then(|call| dispatch::dispatch(self.receiver.as_mut(), call));

        if let Err(e) = result {
            warn!("Dropping inbound frame: {}", e);
            self.emit(ClientEvent::Protocol(e));
        }
    }

    /// Encode and send one envelope. Returns false if the transport failed
    /// and the session should be treated as closed.
    async fn send_frame(&mut self, write: &mut WsSink, envelope: &Envelope) -> bool {
        let frame = match codec::encode(envelope) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode outbound frame: {}", e);
                return true;
            }
        };

        match write.send(Message::Text(frame.into())).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send frame to {}: {}", self.address, e);
                self.emit(ClientEvent::Transport(e.to_string()));
                false
            }
        }
    }

    /// Wait out the reconnect delay. Returns false if `end()` arrived while
    /// waiting - the timer must not outlive shutdown.
    async fn wait_reconnect(&mut self, delay: Duration) -> bool {
        let timer = tokio::time::sleep(delay);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                () = &mut timer => return true,
                command = self.command_rx.recv() => match command {
                    Some(Command::End) | None => {
                        debug!("Shutdown during reconnect wait; cancelling timer");
                        return false;
                    }
                    Some(_) => {
                        debug!("Dropping outbound frame: connection not open");
                    }
                },
            }
        }
    }

    /// Drop commands that raced a status change; only `End` matters when no
    /// connection is open. Returns false if shutdown was requested.
    fn drain_pending(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(Command::End) => return false,
                Ok(_) => debug!("Dropping outbound frame: connection not open"),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.status_tx.send_replace(status);
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events_tx.send(event);
    }
}
