//! Member registration service: orchestration of participant calls.

use crate::error::{TxError, TxResult};
use crate::participant::{AuditEntry, AuditLogStore, Member, MemberStore};
use crate::transaction::{ExecutionContext, Propagation, TransactionManager};
use std::sync::Arc;
use tracing::info;

/// Orchestrates member registration across participant stores.
///
/// The service sequences two participant operations - the member save and
/// an audit-log save - under explicit transaction scopes. The variants
/// differ only in how the audit save's failure is scoped and handled,
/// which is exactly what decides whether the registration survives it.
#[derive(Debug)]
pub struct MemberService {
    manager: Arc<TransactionManager>,
    members: MemberStore,
    audit: AuditLogStore,
}

impl MemberService {
    /// Creates a service over a manager and the two participant stores.
    pub fn new(manager: Arc<TransactionManager>, members: MemberStore, audit: AuditLogStore) -> Self {
        Self {
            manager,
            members,
            audit,
        }
    }

    /// Registers a member and records an audit entry in one scope.
    ///
    /// Any failure rolls the whole scope back and propagates: member and
    /// audit entry persist together or not at all.
    ///
    /// # Errors
    ///
    /// Propagates participant and transaction errors unchanged.
    pub fn register(&self, ctx: &mut ExecutionContext, username: &str) -> TxResult<()> {
        self.manager.with_scope(ctx, Propagation::Required, |ctx| {
            self.members.save(ctx, &Member::new(username))?;
            self.audit.save(ctx, &AuditEntry::new(username))?;
            Ok(())
        })
    }

    /// Registers a member, tolerating an audit failure - incorrectly.
    ///
    /// The audit save runs in an inner `Required` scope that joins the
    /// outer transaction, and its validation failure is caught and
    /// converted to normal flow. That recovery is an illusion: the inner
    /// scope's rollback already marked the shared transaction
    /// rollback-only, so the outer commit fails with
    /// [`TxError::UnexpectedRollback`] and nothing persists. Kept as the
    /// canonical demonstration of that pitfall; use
    /// [`MemberService::register_isolated`] for real isolation.
    ///
    /// # Errors
    ///
    /// Fails with `UnexpectedRollback` whenever the audit entry was
    /// rejected, despite the local recovery.
    pub fn register_recovering(&self, ctx: &mut ExecutionContext, username: &str) -> TxResult<()> {
        self.manager.with_scope(ctx, Propagation::Required, |ctx| {
            self.members.save(ctx, &Member::new(username))?;
            self.try_audit(ctx, username, Propagation::Required)
        })
    }

    /// Registers a member, genuinely tolerating an audit failure.
    ///
    /// The audit save runs under `RequiresNew`, so it commits or rolls
    /// back in its own physical transaction. Catching its failure leaves
    /// the outer transaction untouched: the member persists even when the
    /// audit entry was rejected.
    ///
    /// # Errors
    ///
    /// Propagates member-save and transaction errors; audit validation
    /// failures are absorbed.
    pub fn register_isolated(&self, ctx: &mut ExecutionContext, username: &str) -> TxResult<()> {
        self.manager.with_scope(ctx, Propagation::Required, |ctx| {
            self.members.save(ctx, &Member::new(username))?;
            self.try_audit(ctx, username, Propagation::RequiresNew)
        })
    }

    /// Attempts the audit save in its own scope, absorbing rejection.
    fn try_audit(
        &self,
        ctx: &mut ExecutionContext,
        username: &str,
        propagation: Propagation,
    ) -> TxResult<()> {
        let audited = self.manager.with_scope(ctx, propagation, |ctx| {
            self.audit.save(ctx, &AuditEntry::new(username))
        });
        match audited {
            Ok(()) => Ok(()),
            Err(TxError::Domain { message }) => {
                info!(username, %message, "audit entry failed; continuing without it");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
