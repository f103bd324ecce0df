//! Error types for NestX core.

use nestx_resource::ResourceError;
use thiserror::Error;

/// Result type for transaction operations.
pub type TxResult<T> = Result<T, TxError>;

/// Errors that can occur in NestX transaction operations.
///
/// The four classes matter to different callers:
///
/// - [`TxError::Resource`] - the physical operation itself failed; never
///   retried by the manager, propagated as-is.
/// - [`TxError::Domain`] - a participant rejected a record; the manager
///   never catches these, orchestrators decide whether to recover.
/// - [`TxError::UnexpectedRollback`] - an owning commit found the
///   transaction marked rollback-only by an inner scope. Never suppressed:
///   the caller asked to commit and must learn the data is gone.
/// - [`TxError::IllegalState`] - programming-error class: double
///   completion, terminal-transaction reuse, writes outside a scope.
#[derive(Debug, Error)]
pub enum TxError {
    /// Physical resource operation failed.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// A participant's validation rejected a record.
    #[error("domain validation failed: {message}")]
    Domain {
        /// Description of the rejection.
        message: String,
    },

    /// An owning commit was converted into a rollback because an inner
    /// scope had marked the transaction rollback-only.
    #[error("transaction was marked rollback-only; commit was converted into a rollback")]
    UnexpectedRollback,

    /// Operation not permitted in the current transaction state.
    #[error("illegal transaction state: {message}")]
    IllegalState {
        /// Description of why the operation is illegal.
        message: String,
    },

    /// Record encoding or decoding failed.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the failure.
        message: String,
    },
}

impl TxError {
    /// Creates a domain validation error.
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
        }
    }

    /// Creates an illegal state error.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Creates a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}
