//! Error types for the bridge server.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors that stop the HTTP listener from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind HTTP listener on {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },

    #[error(transparent)]
    Storage(#[from] hue_state::StateError),
}

/// Convenience Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
