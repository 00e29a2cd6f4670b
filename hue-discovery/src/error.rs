//! Error types for the discovery system.

use thiserror::Error;

/// Error type for discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No non-loopback IPv4 address could be found to advertise
    #[error("No advertisable IPv4 address found: {0}")]
    NoAddress(String),

    /// The discovery socket could not be created or bound
    #[error("Failed to bind discovery socket on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Socket-level failure after binding
    #[error("Socket error: {0}")]
    Socket(#[from] std::io::Error),

    /// Serial number did not have the expected shape
    #[error("Invalid serial number '{0}': expected 12 hex characters")]
    InvalidSerial(String),
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
