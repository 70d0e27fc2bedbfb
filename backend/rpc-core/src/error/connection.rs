use common::ErrorLocation;
use thiserror::Error as ThisError;

/// Errors raised synchronously by the start path. Everything that can only be
/// discovered after the dial (DNS, refused connection, dropped socket) is
/// reported asynchronously as a transport event, never through this type.
#[derive(Debug, ThisError)]
pub enum ConnectionError {
    #[error("Invalid Address Error: {message} {location}")]
    InvalidAddress {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unsupported Scheme Error: {scheme:?} (expected ws or wss) {location}")]
    UnsupportedScheme {
        scheme: String,
        location: ErrorLocation,
    },

    #[error("Missing Address Error: {message} {location}")]
    MissingAddress {
        message: String,
        location: ErrorLocation,
    },
}
