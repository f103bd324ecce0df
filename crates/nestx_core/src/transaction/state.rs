//! Transaction state: physical transaction records and logical scopes.

use crate::error::{TxError, TxResult};
use crate::types::PhysicalTxnId;
use nestx_resource::TxnHandle;

/// State of a physical transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Transaction is active and can accept work.
    Active,
    /// Transaction has been physically committed. Terminal.
    Committed,
    /// Transaction has been physically rolled back. Terminal.
    RolledBack,
}

impl TxnState {
    /// Whether this state accepts no further commit or rollback.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

/// Policy deciding whether a new logical scope joins an existing physical
/// transaction or forces a new, independent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Join the active physical transaction if one exists; otherwise
    /// start a new one.
    Required,
    /// Always start a new, independent physical transaction, suspending
    /// any currently active one until this one completes.
    RequiresNew,
}

/// Bookkeeping record for one physical transaction.
///
/// Owned by the manager's registry. `rollback_only` is monotonic: once
/// set it stays set until the transaction reaches a terminal state.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalTxn {
    id: PhysicalTxnId,
    handle: TxnHandle,
    rollback_only: bool,
    state: TxnState,
}

impl PhysicalTxn {
    /// Creates a record for a freshly begun physical transaction.
    pub(crate) fn new(id: PhysicalTxnId, handle: TxnHandle) -> Self {
        Self {
            id,
            handle,
            rollback_only: false,
            state: TxnState::Active,
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> PhysicalTxnId {
        self.id
    }

    /// Returns the resource handle this transaction runs under.
    #[must_use]
    pub fn handle(&self) -> TxnHandle {
        self.handle
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TxnState {
        self.state
    }

    /// Whether the transaction has been doomed by a joined rollback.
    #[must_use]
    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    /// Marks the transaction rollback-only. Never cleared.
    pub(crate) fn mark_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    /// Marks the transaction as committed.
    pub(crate) fn mark_committed(&mut self) {
        self.state = TxnState::Committed;
    }

    /// Marks the transaction as rolled back.
    pub(crate) fn mark_rolled_back(&mut self) {
        self.state = TxnState::RolledBack;
    }

    /// Ensures the transaction is still active.
    pub(crate) fn ensure_active(&self) -> TxResult<()> {
        match self.state {
            TxnState::Active => Ok(()),
            TxnState::Committed => Err(TxError::illegal_state(format!(
                "{} already committed",
                self.id
            ))),
            TxnState::RolledBack => Err(TxError::illegal_state(format!(
                "{} already rolled back",
                self.id
            ))),
        }
    }
}

/// One logical transaction scope, issued by every `begin`.
///
/// A scope either owns the physical transaction it refers to (it created
/// it) or merely joined one that an outer scope owns. It is owned
/// exclusively by the call stack that created it and must be completed
/// exactly once, by commit or rollback.
#[derive(Debug)]
pub struct TransactionScope {
    txn: PhysicalTxnId,
    is_new_transaction: bool,
    completed: bool,
}

impl TransactionScope {
    /// Creates a scope owning a freshly created physical transaction.
    pub(crate) fn owning(txn: PhysicalTxnId) -> Self {
        Self {
            txn,
            is_new_transaction: true,
            completed: false,
        }
    }

    /// Creates a scope joining an already-active physical transaction.
    pub(crate) fn joined(txn: PhysicalTxnId) -> Self {
        Self {
            txn,
            is_new_transaction: false,
            completed: false,
        }
    }

    /// Returns the physical transaction this scope refers to.
    #[must_use]
    pub fn txn_id(&self) -> PhysicalTxnId {
        self.txn
    }

    /// True iff this scope created its physical transaction.
    ///
    /// Only the owning scope's completion has a physical effect; a joined
    /// scope's commit is a no-op and its rollback only marks the shared
    /// transaction rollback-only.
    #[must_use]
    pub fn is_new_transaction(&self) -> bool {
        self.is_new_transaction
    }

    /// Whether this scope has already been committed or rolled back.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Ensures the scope has not been completed yet.
    pub(crate) fn ensure_pending(&self) -> TxResult<()> {
        if self.completed {
            return Err(TxError::illegal_state(format!(
                "scope for {} already completed",
                self.txn
            )));
        }
        Ok(())
    }

    /// Consumes the scope's single completion.
    ///
    /// Callers validate first (`ensure_pending`, completion order) so
    /// that a rejected completion attempt leaves the scope usable.
    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_txn_is_active_and_not_rollback_only() {
        let txn = PhysicalTxn::new(PhysicalTxnId::new(1), TxnHandle::new(0));
        assert_eq!(txn.state(), TxnState::Active);
        assert!(!txn.is_rollback_only());
        assert!(txn.ensure_active().is_ok());
    }

    #[test]
    fn rollback_only_is_sticky() {
        let mut txn = PhysicalTxn::new(PhysicalTxnId::new(1), TxnHandle::new(0));
        txn.mark_rollback_only();
        txn.mark_rollback_only();
        assert!(txn.is_rollback_only());
        // Still active: the flag dooms the eventual commit, it does not
        // terminate the transaction.
        assert_eq!(txn.state(), TxnState::Active);
    }

    #[test]
    fn terminal_states_reject_further_work() {
        let mut committed = PhysicalTxn::new(PhysicalTxnId::new(1), TxnHandle::new(0));
        committed.mark_committed();
        assert!(committed.state().is_terminal());
        assert!(matches!(
            committed.ensure_active(),
            Err(TxError::IllegalState { .. })
        ));

        let mut rolled_back = PhysicalTxn::new(PhysicalTxnId::new(2), TxnHandle::new(1));
        rolled_back.mark_rolled_back();
        assert!(rolled_back.state().is_terminal());
        assert!(rolled_back.ensure_active().is_err());
    }

    #[test]
    fn owning_and_joined_scope_flags() {
        let owner = TransactionScope::owning(PhysicalTxnId::new(1));
        assert!(owner.is_new_transaction());
        assert!(!owner.is_completed());

        let joined = TransactionScope::joined(PhysicalTxnId::new(1));
        assert!(!joined.is_new_transaction());
        assert_eq!(joined.txn_id(), owner.txn_id());
    }

    #[test]
    fn scope_completes_exactly_once() {
        let mut scope = TransactionScope::owning(PhysicalTxnId::new(1));
        scope.ensure_pending().unwrap();
        scope.mark_completed();
        assert!(scope.is_completed());
        assert!(matches!(
            scope.ensure_pending(),
            Err(TxError::IllegalState { .. })
        ));
    }
}
