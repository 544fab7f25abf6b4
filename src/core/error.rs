//! Defines the custom error type for the `core` module.

use std::net::SocketAddr;
use thiserror::Error;

/// The primary error type for the `core` module.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The signaling listener could not be bound to its address, typically
    /// because the port is already taken by another instance.
    #[error("failed to bind signaling listener on {1}: {0}")]
    Bind(#[source] std::io::Error, SocketAddr),

    /// Represents an I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
