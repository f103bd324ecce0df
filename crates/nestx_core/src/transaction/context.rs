//! Execution context: the explicit "currently active transaction" state.

use crate::types::PhysicalTxnId;
use nestx_resource::TxnHandle;

/// Per-call-chain transaction state.
///
/// An `ExecutionContext` replaces ambient (thread-local or global)
/// current-transaction state with a value the caller owns and threads
/// through manager operations. It is a stack of frames: the top frame is
/// the currently active physical transaction, frames below it are
/// suspended (a `RequiresNew` scope stacks its new transaction above the
/// one it suspended).
///
/// Frames are pushed by every owning `begin` and popped by the owning
/// completion, so suspend/resume is last-suspended-first-resumed by
/// construction. Manager operations take `&mut ExecutionContext`;
/// participants take `&` and only read the top frame - the borrow checker
/// keeps one context on one logical call chain.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    frames: Vec<Frame>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    txn: PhysicalTxnId,
    handle: TxnHandle,
}

impl ExecutionContext {
    /// Creates an empty context with no active transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently active physical transaction, if any.
    #[must_use]
    pub fn active_txn(&self) -> Option<PhysicalTxnId> {
        self.frames.last().map(|f| f.txn)
    }

    /// Returns the resource handle of the active transaction, if any.
    ///
    /// Participants read through this handle so their work lands in
    /// whatever physical transaction is active at call time.
    #[must_use]
    pub fn active_handle(&self) -> Option<TxnHandle> {
        self.frames.last().map(|f| f.handle)
    }

    /// Whether a physical transaction is currently active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Returns the nesting depth (active transaction plus suspended ones).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Activates a transaction, suspending the current one if present.
    pub(crate) fn push(&mut self, txn: PhysicalTxnId, handle: TxnHandle) {
        self.frames.push(Frame { txn, handle });
    }

    /// Deactivates the current transaction, resuming the one below it.
    pub(crate) fn pop(&mut self) -> Option<(PhysicalTxnId, TxnHandle)> {
        self.frames.pop().map(|f| (f.txn, f.handle))
    }
}
