//! Registration facade: split commit with a tolerated secondary failure.

use crate::error::{TxError, TxResult};
use crate::participant::{AuditEntry, AuditLogStore, Member, MemberStore};
use crate::transaction::{ExecutionContext, Propagation, TransactionManager};
use std::sync::Arc;
use tracing::info;

/// Application-level facade splitting registration into two commits.
///
/// The member save runs under `RequiresNew`, so it commits or fails on
/// its own, independent of anything the caller has open. The audit save
/// then runs under `Required` and its validation failure is caught and
/// logged instead of re-raised.
///
/// The catch is only as good as the audit scope's isolation: when the
/// caller has an owning scope open, the audit scope joins that physical
/// transaction, and swallowing the error does not unset the rollback-only
/// flag the audit rollback left behind - the caller's eventual commit
/// fails with [`TxError::UnexpectedRollback`] even though this facade
/// returned nothing but success.
#[derive(Debug)]
pub struct MemberFacade {
    manager: Arc<TransactionManager>,
    members: MemberStore,
    audit: AuditLogStore,
}

impl MemberFacade {
    /// Creates a facade over a manager and the two participant stores.
    pub fn new(manager: Arc<TransactionManager>, members: MemberStore, audit: AuditLogStore) -> Self {
        Self {
            manager,
            members,
            audit,
        }
    }

    /// Registers a member, then records an audit entry best-effort.
    ///
    /// # Errors
    ///
    /// Propagates member-save failures; audit validation failures are
    /// logged and absorbed (see the type-level caveat).
    pub fn register_split(&self, ctx: &mut ExecutionContext, username: &str) -> TxResult<()> {
        self.manager
            .with_scope(ctx, Propagation::RequiresNew, |ctx| {
                self.members.save(ctx, &Member::new(username))
            })?;

        let audited = self.manager.with_scope(ctx, Propagation::Required, |ctx| {
            self.audit.save(ctx, &AuditEntry::new(username))
        });
        match audited {
            Ok(()) => Ok(()),
            Err(TxError::Domain { message }) => {
                info!(username, %message, "audit entry failed; registration stands");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TxnState;
    use nestx_resource::InMemoryConnection;

    fn setup() -> (Arc<TransactionManager>, MemberFacade, MemberStore, AuditLogStore) {
        let conn = Arc::new(InMemoryConnection::new());
        let manager = Arc::new(TransactionManager::new(conn.clone()));
        let facade = MemberFacade::new(
            manager.clone(),
            MemberStore::new(conn.clone()),
            AuditLogStore::new(conn.clone()),
        );
        let members = MemberStore::new(conn.clone());
        let audit = AuditLogStore::new(conn);
        (manager, facade, members, audit)
    }

    #[test]
    fn split_registration_persists_both_on_success() {
        let (_manager, facade, members, audit) = setup();
        let mut ctx = ExecutionContext::new();

        facade.register_split(&mut ctx, "alice").unwrap();

        assert!(members.find_by_username(&ctx, "alice").unwrap().is_some());
        assert!(audit.find_by_message(&ctx, "alice").unwrap().is_some());
    }

    #[test]
    fn audit_failure_is_truly_isolated_without_an_outer_scope() {
        let (_manager, facade, members, audit) = setup();
        let mut ctx = ExecutionContext::new();

        // With nothing open above the facade, the audit scope owns its
        // own physical transaction; catching the failure isolates it.
        facade.register_split(&mut ctx, "invalid-bob").unwrap();

        assert!(members
            .find_by_username(&ctx, "invalid-bob")
            .unwrap()
            .is_some());
        assert!(audit.find_by_message(&ctx, "invalid-bob").unwrap().is_none());
        assert!(!ctx.has_active());
    }

    #[test]
    fn caught_audit_failure_still_dooms_the_callers_commit() {
        let (manager, facade, members, audit) = setup();
        let mut ctx = ExecutionContext::new();

        let mut outer = manager.begin(&mut ctx, Propagation::Required).unwrap();

        // The facade raises nothing: the member committed independently
        // and the audit failure was caught locally.
        facade.register_split(&mut ctx, "invalid-carol").unwrap();

        // Yet the audit scope joined our transaction and its rollback
        // marked it rollback-only.
        assert!(manager.is_rollback_only(outer.txn_id()));
        let err = manager.commit(&mut ctx, &mut outer).unwrap_err();
        assert!(matches!(err, TxError::UnexpectedRollback));
        assert_eq!(manager.txn_state(outer.txn_id()), Some(TxnState::RolledBack));

        // The member survived (independent physical transaction); no
        // write from the doomed transaction is observable.
        assert!(members
            .find_by_username(&ctx, "invalid-carol")
            .unwrap()
            .is_some());
        assert!(audit
            .find_by_message(&ctx, "invalid-carol")
            .unwrap()
            .is_none());
        assert!(!ctx.has_active());
    }

    #[test]
    fn success_under_an_outer_scope_leaves_it_committable() {
        let (manager, facade, members, audit) = setup();
        let mut ctx = ExecutionContext::new();

        let mut outer = manager.begin(&mut ctx, Propagation::Required).unwrap();
        facade.register_split(&mut ctx, "dave").unwrap();

        manager.commit(&mut ctx, &mut outer).unwrap();
        assert!(members.find_by_username(&ctx, "dave").unwrap().is_some());
        assert!(audit.find_by_message(&ctx, "dave").unwrap().is_some());
    }
}
