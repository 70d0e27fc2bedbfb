//! Shared foundation types for the RPC client workspace.
//!
//! This crate contains pure data structures shared between layers. Types here
//! have no business logic - they're just data that can be passed between
//! layers.
//!
//! ## Architecture
//!
//! - **common** (this crate): Shared foundation types
//! - **rpc-core**: The reconnecting WebSocket RPC client built on them

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
