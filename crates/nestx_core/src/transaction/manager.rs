//! Transaction manager: propagation dispatch and the rollback-only protocol.

use crate::error::{TxError, TxResult};
use crate::transaction::context::ExecutionContext;
use crate::transaction::state::{PhysicalTxn, Propagation, TransactionScope, TxnState};
use crate::types::PhysicalTxnId;
use nestx_resource::{ResourceConnection, TxnHandle};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maps logical transaction scopes onto physical transactions.
///
/// The manager decides, per propagation policy and rollback-only state,
/// whether a physical commit/rollback actually occurs, is suppressed, or
/// is redirected into a forced rollback surfaced to the caller:
///
/// - `Required` joins the active physical transaction or starts one.
/// - `RequiresNew` suspends the active transaction and starts an
///   independent one; completion resumes the suspended one.
/// - A joined scope's rollback marks the shared transaction
///   rollback-only; the eventual owning commit is then converted into a
///   rollback and fails with [`TxError::UnexpectedRollback`].
///
/// All operations take an [`ExecutionContext`] owned by the caller; the
/// manager keeps no ambient per-thread state. One context belongs to one
/// logical call chain, but a single manager may serve many independent
/// contexts concurrently - each gets physically distinct transactions.
pub struct TransactionManager {
    /// Connection to the underlying resource.
    conn: Arc<dyn ResourceConnection>,
    /// Next physical transaction ID.
    next_id: AtomicU64,
    /// Registry of physical transactions, including terminal ones.
    txns: RwLock<HashMap<PhysicalTxnId, PhysicalTxn>>,
}

impl TransactionManager {
    /// Creates a new transaction manager over a resource connection.
    pub fn new(conn: Arc<dyn ResourceConnection>) -> Self {
        Self {
            conn,
            next_id: AtomicU64::new(1),
            txns: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a logical transaction scope.
    ///
    /// With [`Propagation::Required`] and an active physical transaction
    /// in `ctx`, the returned scope joins it (`is_new_transaction` is
    /// false) and its completion has no physical effect. Otherwise - and
    /// always with [`Propagation::RequiresNew`] - a new physical
    /// transaction is started, activated in `ctx` (suspending any current
    /// one), and the returned scope owns it.
    ///
    /// # Errors
    ///
    /// Fails with `Resource` if the physical begin fails, or with
    /// `IllegalState` if the transaction to join is no longer active.
    pub fn begin(
        &self,
        ctx: &mut ExecutionContext,
        propagation: Propagation,
    ) -> TxResult<TransactionScope> {
        if propagation == Propagation::Required {
            if let Some(active) = ctx.active_txn() {
                let txns = self.txns.read();
                let txn = txns
                    .get(&active)
                    .ok_or_else(|| TxError::illegal_state(format!("{active} is not registered")))?;
                txn.ensure_active()?;
                debug!(txn = %active, "joining active physical transaction");
                return Ok(TransactionScope::joined(active));
            }
        }

        let handle = self.conn.begin()?;
        let id = PhysicalTxnId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.txns.write().insert(id, PhysicalTxn::new(id, handle));
        // Pushing the frame is what suspends any previously active
        // transaction; the owning completion pops it to resume.
        ctx.push(id, handle);
        debug!(txn = %id, ?propagation, suspended = ctx.depth() - 1, "started physical transaction");
        Ok(TransactionScope::owning(id))
    }

    /// Commits a logical transaction scope.
    ///
    /// A joined scope's commit is physically a no-op: the owning scope
    /// decides the real outcome later. An owning scope's commit physically
    /// commits - unless an inner joined scope rolled back earlier, in
    /// which case the transaction is physically rolled back instead and
    /// this call fails with [`TxError::UnexpectedRollback`]. Either way
    /// the suspended transaction (if any) is resumed, including when the
    /// physical operation fails.
    ///
    /// # Errors
    ///
    /// Fails with `IllegalState` on a second completion of the same scope
    /// or when the physical transaction is already terminal, with
    /// `UnexpectedRollback` as described above, and with `Resource` if
    /// the physical operation fails.
    pub fn commit(&self, ctx: &mut ExecutionContext, scope: &mut TransactionScope) -> TxResult<()> {
        scope.ensure_pending()?;
        let id = scope.txn_id();

        if !scope.is_new_transaction() {
            let txns = self.txns.read();
            let txn = txns
                .get(&id)
                .ok_or_else(|| TxError::illegal_state(format!("{id} is not registered")))?;
            txn.ensure_active()?;
            scope.mark_completed();
            debug!(txn = %id, "joined scope commit: deferring to owning scope");
            return Ok(());
        }

        // Resume the suspended transaction before anything physical so
        // restoration happens on every exit path. Popping also validates
        // completion order, and only then is the scope's single
        // completion consumed - a rejected out-of-order attempt leaves
        // the scope usable once the inner transaction has been unwound.
        let handle = self.pop_frame(ctx, id)?;
        scope.mark_completed();

        let rollback_only = {
            let txns = self.txns.read();
            let txn = txns
                .get(&id)
                .ok_or_else(|| TxError::illegal_state(format!("{id} is not registered")))?;
            txn.ensure_active()?;
            txn.is_rollback_only()
        };

        if rollback_only {
            warn!(txn = %id, "commit converted into rollback: transaction is rollback-only");
            self.conn.rollback(handle)?;
            self.mark(id, TxnState::RolledBack);
            return Err(TxError::UnexpectedRollback);
        }

        self.conn.commit(handle)?;
        self.mark(id, TxnState::Committed);
        debug!(txn = %id, "physically committed");
        Ok(())
    }

    /// Rolls back a logical transaction scope.
    ///
    /// A joined scope does not physically roll back; it marks the shared
    /// transaction rollback-only, dooming the eventual owning commit, and
    /// returns normally. An owning scope physically rolls back and
    /// resumes any suspended transaction.
    ///
    /// # Errors
    ///
    /// Fails with `IllegalState` on a second completion of the same scope
    /// or when the physical transaction is already terminal, and with
    /// `Resource` if the physical rollback fails.
    pub fn rollback(
        &self,
        ctx: &mut ExecutionContext,
        scope: &mut TransactionScope,
    ) -> TxResult<()> {
        scope.ensure_pending()?;
        let id = scope.txn_id();

        if !scope.is_new_transaction() {
            let mut txns = self.txns.write();
            let txn = txns
                .get_mut(&id)
                .ok_or_else(|| TxError::illegal_state(format!("{id} is not registered")))?;
            txn.ensure_active()?;
            txn.mark_rollback_only();
            scope.mark_completed();
            debug!(txn = %id, "joined scope rollback: marked rollback-only");
            return Ok(());
        }

        let handle = self.pop_frame(ctx, id)?;
        scope.mark_completed();
        {
            let txns = self.txns.read();
            let txn = txns
                .get(&id)
                .ok_or_else(|| TxError::illegal_state(format!("{id} is not registered")))?;
            txn.ensure_active()?;
        }
        self.conn.rollback(handle)?;
        self.mark(id, TxnState::RolledBack);
        debug!(txn = %id, "physically rolled back");
        Ok(())
    }

    /// Runs a closure inside a scope, guaranteeing a terminal call.
    ///
    /// Begins a scope with the given propagation, runs `f`, then commits
    /// on `Ok` and rolls back on `Err` - so every exit path, including
    /// early returns via `?`, completes the scope. A commit failure
    /// (including [`TxError::UnexpectedRollback`]) is returned to the
    /// caller; a rollback failure on the error path is logged and the
    /// closure's error wins.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or any error from `begin`/`commit`.
    pub fn with_scope<T, F>(
        &self,
        ctx: &mut ExecutionContext,
        propagation: Propagation,
        f: F,
    ) -> TxResult<T>
    where
        F: FnOnce(&mut ExecutionContext) -> TxResult<T>,
    {
        let mut scope = self.begin(ctx, propagation)?;
        match f(ctx) {
            Ok(value) => {
                self.commit(ctx, &mut scope)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback(ctx, &mut scope) {
                    warn!(txn = %scope.txn_id(), error = %rollback_err, "rollback failed while unwinding");
                }
                Err(err)
            }
        }
    }

    /// Returns the state of a physical transaction, if registered.
    #[must_use]
    pub fn txn_state(&self, id: PhysicalTxnId) -> Option<TxnState> {
        self.txns.read().get(&id).map(PhysicalTxn::state)
    }

    /// Whether a physical transaction has been marked rollback-only.
    #[must_use]
    pub fn is_rollback_only(&self, id: PhysicalTxnId) -> bool {
        self.txns
            .read()
            .get(&id)
            .is_some_and(PhysicalTxn::is_rollback_only)
    }

    /// Pops the context frame for `expected`, erroring on a mismatch.
    fn pop_frame(&self, ctx: &mut ExecutionContext, expected: PhysicalTxnId) -> TxResult<TxnHandle> {
        match ctx.pop() {
            Some((txn, handle)) if txn == expected => Ok(handle),
            Some((txn, handle)) => {
                // Leave the stack as found: the caller completed scopes
                // out of order and must unwind the inner one first.
                ctx.push(txn, handle);
                Err(TxError::illegal_state(format!(
                    "scope for {expected} completed while {txn} is active"
                )))
            }
            None => Err(TxError::illegal_state(format!(
                "no active transaction to complete for {expected}"
            ))),
        }
    }

    fn mark(&self, id: PhysicalTxnId, state: TxnState) {
        if let Some(txn) = self.txns.write().get_mut(&id) {
            match state {
                TxnState::Committed => txn.mark_committed(),
                TxnState::RolledBack => txn.mark_rolled_back(),
                TxnState::Active => {}
            }
        }
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("registered_txns", &self.txns.read().len())
            .finish_non_exhaustive()
    }
}
