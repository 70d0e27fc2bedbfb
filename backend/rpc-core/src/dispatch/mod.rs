//! Inbound call dispatch.
//!
//! A [`Receiver`] is the capability contract the connection borrows for its
//! lifetime: a lookup from method name to callable. [`MethodTable`] is the
//! dynamic implementation most callers want; anything else that can answer
//! "do you have this method, and run it" plugs in the same way.
//!
//! Dispatch is fire-and-forget in the inbound direction: handler return
//! values are discarded, and failures are returned to the connection actor,
//! which logs them and drops the offending frame.

use crate::PRIVATE_METHOD_MARKER;
use crate::codec::InboundCall;
use crate::error::envelope::EnvelopeError;
use crate::error::protocol::ProtocolError;

use common::ErrorLocation;

use std::collections::HashMap;
use std::panic::Location;

use serde_json::Value;

/// An object providing a lookup from method name to callable.
///
/// The core never inspects a receiver beyond these two operations.
pub trait Receiver: Send {
    /// Whether this receiver exposes a callable handler for `method`.
    fn supports(&self, method: &str) -> bool;

    /// Invoke the handler for `method` with `args` in order. The protocol
    /// discards return values, so handlers return nothing.
    fn invoke(&mut self, method: &str, args: Vec<Value>);
}

type Handler = Box<dyn FnMut(Vec<Value>) + Send>;

/// Name-to-closure registry implementing [`Receiver`].
#[derive(Default)]
pub struct MethodTable {
    handlers: HashMap<String, Handler>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under `method`. Replaces any previous handler with
    /// the same name.
    pub fn register<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: FnMut(Vec<Value>) + Send + 'static,
    {
        self.handlers.insert(method.into(), Box::new(handler));
    }
}

impl Receiver for MethodTable {
    fn supports(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    fn invoke(&mut self, method: &str, args: Vec<Value>) {
        if let Some(handler) = self.handlers.get_mut(method) {
            handler(args);
        }
    }
}

/// Whether `method` carries the private-method marker.
pub fn is_private(method: &str) -> bool {
    method.starts_with(PRIVATE_METHOD_MARKER)
}

/// Check that `method` may be named in an outbound call.
///
/// # Errors
///
/// Returns [`EnvelopeError::EmptyMethod`] or [`EnvelopeError::PrivateMethod`].
/// Both are programmer errors; the check runs before any frame is built.
#[track_caller]
pub fn ensure_public(method: &str) -> Result<(), EnvelopeError> {
    if method.is_empty() {
        return Err(EnvelopeError::EmptyMethod {
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if is_private(method) {
        return Err(EnvelopeError::PrivateMethod {
            method: method.to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(())
}

/// Resolve and invoke the named method on `receiver`.
///
/// The private-method marker is enforced here as well as at the outbound call
/// sites, so a peer cannot reach methods local callers are forbidden to name.
///
/// # Errors
///
/// Returns [`ProtocolError::PrivateMethod`] or [`ProtocolError::UnknownMethod`]
/// without invoking anything.
pub fn dispatch(receiver: &mut dyn Receiver, call: InboundCall) -> Result<(), ProtocolError> {
    if is_private(&call.method) {
        return Err(ProtocolError::PrivateMethod {
            method: call.method,
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if !receiver.supports(&call.method) {
        return Err(ProtocolError::UnknownMethod {
            method: call.method,
            location: ErrorLocation::from(Location::caller()),
        });
    }

    receiver.invoke(&call.method, call.args);
    Ok(())
}
