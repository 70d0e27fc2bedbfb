//! Message codec for the wire protocol.
//!
//! The protocol exchanges UTF-8 JSON text frames. Each frame is one
//! [`Envelope`], tagged by its `messageType` field. Three envelope variants
//! are outbound-only from this peer's perspective; the single inbound variant
//! accepted is `remoteCall`, which [`decode_inbound`] validates structurally
//! before anything reaches the dispatcher.
//!
//! # Wire format
//!
//! | Direction | messageType                          | Fields                      |
//! |-----------|--------------------------------------|-----------------------------|
//! | out       | `status`                             | `info`                      |
//! | out       | `remoteCall`                         | `object`, `method`, `args`  |
//! | out       | `remoteCallConnectedUserByUserName`  | `userName`, `method`, `args`|
//! | in        | `remoteCall`                         | `method`, `args`            |

use crate::error::protocol::ProtocolError;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only `messageType` accepted on the inbound path.
pub const REMOTE_CALL_TYPE: &str = "remoteCall";

/// One protocol message, tagged by `messageType`.
///
/// Serialization emits exactly the fields defined for the variant, with the
/// wire key names (`messageType`, `userName`) preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType")]
pub enum Envelope {
    #[serde(rename = "status")]
    Status { info: Value },

    #[serde(rename = "remoteCall")]
    RemoteCall {
        object: String,
        method: String,
        args: Vec<Value>,
    },

    #[serde(rename = "remoteCallConnectedUserByUserName")]
    RemoteCallByUserName {
        #[serde(rename = "userName")]
        user_name: String,
        method: String,
        args: Vec<Value>,
    },
}

/// A validated inbound `remoteCall`, ready for dispatch.
///
/// No `object` field is consulted on the inbound path: the whole connection
/// has a single receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCall {
    pub method: String,
    pub args: Vec<Value>,
}

/// Serialize an envelope to a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails. With the types
/// above this cannot happen for well-formed values, but the failure is
/// propagated rather than swallowed.
pub fn encode(envelope: &Envelope) -> Result<String, ProtocolError> {
    serde_json::to_string(envelope).map_err(|e| ProtocolError::Encode {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Parse and validate one inbound text frame.
///
/// Validation is structural and happens in a fixed order:
///
/// 1. the frame is valid JSON with `messageType`, `method`, and `args`
///    properties,
/// 2. `messageType` is exactly `remoteCall` (the protocol is receive-only
///    for calls; `status` and the by-username variant are send-only),
/// 3. `args` is an ordered sequence,
/// 4. `method` is a non-empty string.
///
/// Whether the resolved handler exists is checked by the dispatcher, which
/// owns the receiver.
///
/// # Errors
///
/// Returns a [`ProtocolError`] describing the first violated rule. Callers
/// treat this as recoverable: the frame is dropped, the connection lives on.
pub fn decode_inbound(frame: &str) -> Result<InboundCall, ProtocolError> {
    let value: Value = serde_json::from_str(frame)?;

    let message_type = require_field(&value, "messageType")?;
    let method = require_field(&value, "method")?;
    let args = require_field(&value, "args")?;

    let message_type = message_type
        .as_str()
        .ok_or_else(|| ProtocolError::UnexpectedMessageType {
            message_type: message_type.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if message_type != REMOTE_CALL_TYPE {
        return Err(ProtocolError::UnexpectedMessageType {
            message_type: message_type.to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let args = args
        .as_array()
        .cloned()
        .ok_or_else(|| ProtocolError::InvalidArgs {
            location: ErrorLocation::from(Location::caller()),
        })?;

    let method = method
        .as_str()
        .ok_or_else(|| ProtocolError::InvalidMethod {
            message: "method must be a string".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if method.is_empty() {
        return Err(ProtocolError::InvalidMethod {
            message: "method must not be empty".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(InboundCall {
        method: method.to_string(),
        args,
    })
}

fn require_field<'a>(value: &'a Value, field: &'static str) -> Result<&'a Value, ProtocolError> {
    value.get(field).ok_or_else(|| ProtocolError::MissingField {
        field,
        location: ErrorLocation::from(Location::caller()),
    })
}
