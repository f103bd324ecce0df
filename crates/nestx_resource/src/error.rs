//! Error types for resource operations.

use std::io;
use thiserror::Error;

/// Result type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Errors that can occur at the physical resource boundary.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The handle does not name an open physical transaction.
    ///
    /// Raised for handles that were never issued by this connection and
    /// for handles that were already committed or rolled back.
    #[error("unknown transaction handle: {handle}")]
    UnknownHandle {
        /// The offending handle value.
        handle: u64,
    },

    /// The connection to the underlying resource was lost.
    #[error("connection lost: {message}")]
    ConnectionLost {
        /// Description of the failure.
        message: String,
    },
}

impl ResourceError {
    /// Creates an unknown handle error.
    #[must_use]
    pub fn unknown_handle(handle: u64) -> Self {
        Self::UnknownHandle { handle }
    }

    /// Creates a connection lost error.
    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::ConnectionLost {
            message: message.into(),
        }
    }
}
