//! Audit log store.

use crate::error::{TxError, TxResult};
use crate::participant::{active_handle, decode, encode};
use crate::transaction::ExecutionContext;
use nestx_resource::{RecordKey, ResourceConnection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Namespace audit entries live in.
const NAMESPACE: &str = "audit";

/// Substring that makes an audit message fail validation.
///
/// Entries whose message contains this marker are rejected with a domain
/// error after being staged; tests use it to simulate a participant
/// failure inside a scope.
pub const REJECTED_MARKER: &str = "invalid";

/// An audit log entry, keyed by message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Message describing the audited action.
    pub message: String,
}

impl AuditEntry {
    /// Creates an audit entry.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Data access for audit entries.
///
/// Executes under the physical transaction active in the execution
/// context at call time. Validation failures in [`AuditLogStore::save`]
/// propagate normally - the rollback-only protocol depends on the error
/// reaching the enclosing scope's completion, so nothing is swallowed
/// here.
pub struct AuditLogStore {
    conn: Arc<dyn ResourceConnection>,
}

impl std::fmt::Debug for AuditLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogStore").finish_non_exhaustive()
    }
}

impl AuditLogStore {
    /// Creates an audit log store over a resource connection.
    pub fn new(conn: Arc<dyn ResourceConnection>) -> Self {
        Self { conn }
    }

    /// Saves an audit entry under the active transaction.
    ///
    /// The entry is staged first, then validated - a rejected entry is
    /// already part of the doomed transaction's write set, exactly like a
    /// store that fails on a constraint after the insert.
    ///
    /// # Errors
    ///
    /// Fails with `Domain` when the message contains
    /// [`REJECTED_MARKER`], with `IllegalState` when no transaction is
    /// active, and with `Resource`/`Codec` on lower-level failures.
    pub fn save(&self, ctx: &ExecutionContext, entry: &AuditEntry) -> TxResult<()> {
        let handle = active_handle(ctx)?;
        debug!(message = %entry.message, "saving audit entry");
        let bytes = encode(entry)?;
        self.conn
            .put(handle, RecordKey::new(NAMESPACE, &entry.message), bytes)?;

        if entry.message.contains(REJECTED_MARKER) {
            debug!(message = %entry.message, "audit entry rejected by validation");
            return Err(TxError::domain(format!(
                "audit entry rejected: {}",
                entry.message
            )));
        }
        Ok(())
    }

    /// Looks up an audit entry by message.
    ///
    /// Reads through the active transaction when one is present;
    /// otherwise reads committed data only.
    ///
    /// # Errors
    ///
    /// Fails with `Resource`/`Codec` on lower-level failures.
    pub fn find_by_message(
        &self,
        ctx: &ExecutionContext,
        message: &str,
    ) -> TxResult<Option<AuditEntry>> {
        let bytes = self
            .conn
            .get(ctx.active_handle(), &RecordKey::new(NAMESPACE, message))?;
        bytes.as_deref().map(decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Propagation, TransactionManager};
    use nestx_resource::InMemoryConnection;

    fn setup() -> (TransactionManager, AuditLogStore) {
        let conn = Arc::new(InMemoryConnection::new());
        (
            TransactionManager::new(conn.clone()),
            AuditLogStore::new(conn),
        )
    }

    #[test]
    fn valid_entry_commits() {
        let (tm, store) = setup();
        let mut ctx = ExecutionContext::new();

        tm.with_scope(&mut ctx, Propagation::Required, |ctx| {
            store.save(ctx, &AuditEntry::new("alice registered"))
        })
        .unwrap();

        assert_eq!(
            store.find_by_message(&ctx, "alice registered").unwrap(),
            Some(AuditEntry::new("alice registered"))
        );
    }

    #[test]
    fn rejected_entry_fails_and_rolls_back() {
        let (tm, store) = setup();
        let mut ctx = ExecutionContext::new();

        let result = tm.with_scope(&mut ctx, Propagation::Required, |ctx| {
            store.save(ctx, &AuditEntry::new("invalid payload"))
        });

        assert!(matches!(result, Err(TxError::Domain { .. })));
        // The staged entry went down with the scope.
        assert_eq!(store.find_by_message(&ctx, "invalid payload").unwrap(), None);
    }

    #[test]
    fn save_requires_active_transaction() {
        let (_tm, store) = setup();
        let ctx = ExecutionContext::new();
        let result = store.save(&ctx, &AuditEntry::new("orphan"));
        assert!(matches!(result, Err(TxError::IllegalState { .. })));
    }

    #[test]
    fn debug_elides_the_connection() {
        let (_tm, store) = setup();
        assert_eq!(format!("{store:?}"), "AuditLogStore { .. }");
    }
}
