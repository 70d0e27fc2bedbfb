use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Violations of the wire protocol by the peer. These are recoverable: the
/// connection actor logs them, emits them on the event channel, and drops the
/// single offending frame without terminating the connection.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
    #[error("Frame Parse Error: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Missing Field Error: {field} {location}")]
    MissingField {
        field: &'static str,
        location: ErrorLocation,
    },

    #[error("Unexpected Message Type Error: {message_type:?} {location}")]
    UnexpectedMessageType {
        message_type: String,
        location: ErrorLocation,
    },

    #[error("Invalid Args Error: args must be an array {location}")]
    InvalidArgs { location: ErrorLocation },

    #[error("Invalid Method Error: {message} {location}")]
    InvalidMethod {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unknown Method Error: {method:?} {location}")]
    UnknownMethod {
        method: String,
        location: ErrorLocation,
    },

    #[error("Private Method Error: peer attempted private method {method:?} {location}")]
    PrivateMethod {
        method: String,
        location: ErrorLocation,
    },

    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },
}

impl From<serde_json::Error> for ProtocolError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::Parse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
