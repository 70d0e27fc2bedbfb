use common::ErrorLocation;
use thiserror::Error as ThisError;

/// Programmer errors raised synchronously at the outbound call site, before
/// any frame is constructed. These indicate a coding mistake, not a network
/// condition, and are never reported on the event channel.
#[derive(Debug, ThisError)]
pub enum EnvelopeError {
    #[error("Private Method Error: cannot call private method {method:?} {location}")]
    PrivateMethod {
        method: String,
        location: ErrorLocation,
    },

    #[error("Empty Method Error: method name must not be empty {location}")]
    EmptyMethod { location: ErrorLocation },
}
