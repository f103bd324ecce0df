//! Resource connection trait definition.

use crate::error::ResourceResult;
use crate::{RecordKey, TxnHandle};

/// A connection to the underlying transactional resource.
///
/// Connections are **opaque record stores** with transactional semantics.
/// They expose begin/commit/rollback for physical transactions and staged
/// reads/writes scoped to an open handle. NestX owns all propagation and
/// nesting logic - connections know nothing about logical scopes,
/// rollback-only marking, or suspend/resume.
///
/// # Invariants
///
/// - `begin` returns a fresh handle naming one physical transaction
/// - Writes staged under a handle are invisible to other handles and to
///   handle-less reads until that handle commits
/// - `commit` and `rollback` close the handle; further use of it fails
///   with `UnknownHandle`
/// - Several handles may be open at once (independent physical
///   transactions), but a single handle must only be driven from one
///   logical call chain
/// - Connections must be `Send + Sync` for shared access
///
/// # Implementors
///
/// - [`super::InMemoryConnection`] - For testing and ephemeral use
/// - [`super::FlakyConnection`] - Fault-injecting wrapper for tests
pub trait ResourceConnection: Send + Sync {
    /// Opens a new physical transaction.
    ///
    /// Returns a handle under which writes can be staged.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot start a transaction.
    fn begin(&self) -> ResourceResult<TxnHandle>;

    /// Commits the physical transaction named by `handle`.
    ///
    /// All writes staged under the handle become durable and visible to
    /// subsequent reads. The handle is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown or the physical commit
    /// fails.
    fn commit(&self, handle: TxnHandle) -> ResourceResult<()>;

    /// Rolls back the physical transaction named by `handle`.
    ///
    /// All writes staged under the handle are discarded. The handle is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown or the physical rollback
    /// fails.
    fn rollback(&self, handle: TxnHandle) -> ResourceResult<()>;

    /// Stages a write under an open handle.
    ///
    /// The write replaces any earlier staged write for the same key within
    /// the same handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown.
    fn put(&self, handle: TxnHandle, key: RecordKey, value: Vec<u8>) -> ResourceResult<()>;

    /// Reads a record.
    ///
    /// With `Some(handle)`, staged writes under that handle shadow
    /// committed data (read-your-writes). With `None`, only committed data
    /// is visible.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is given and it is unknown.
    fn get(&self, handle: Option<TxnHandle>, key: &RecordKey) -> ResourceResult<Option<Vec<u8>>>;
}
