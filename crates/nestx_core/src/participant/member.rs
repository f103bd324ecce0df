//! Member store.

use crate::error::TxResult;
use crate::participant::{active_handle, decode, encode};
use crate::transaction::ExecutionContext;
use nestx_resource::{RecordKey, ResourceConnection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Namespace member records live in.
const NAMESPACE: &str = "members";

/// A member record, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique username.
    pub username: String,
}

impl Member {
    /// Creates a member record.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Data access for member records.
///
/// Executes under the physical transaction active in the execution
/// context at call time; never manages transactions itself.
pub struct MemberStore {
    conn: Arc<dyn ResourceConnection>,
}

impl std::fmt::Debug for MemberStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberStore").finish_non_exhaustive()
    }
}

impl MemberStore {
    /// Creates a member store over a resource connection.
    pub fn new(conn: Arc<dyn ResourceConnection>) -> Self {
        Self { conn }
    }

    /// Saves a member under the active transaction.
    ///
    /// # Errors
    ///
    /// Fails with `IllegalState` when no transaction is active, and with
    /// `Resource`/`Codec` on lower-level failures.
    pub fn save(&self, ctx: &ExecutionContext, member: &Member) -> TxResult<()> {
        let handle = active_handle(ctx)?;
        debug!(username = %member.username, "saving member");
        let bytes = encode(member)?;
        self.conn
            .put(handle, RecordKey::new(NAMESPACE, &member.username), bytes)?;
        Ok(())
    }

    /// Looks up a member by username.
    ///
    /// Reads through the active transaction when one is present
    /// (read-your-writes); otherwise reads committed data only.
    ///
    /// # Errors
    ///
    /// Fails with `Resource`/`Codec` on lower-level failures.
    pub fn find_by_username(
        &self,
        ctx: &ExecutionContext,
        username: &str,
    ) -> TxResult<Option<Member>> {
        let bytes = self
            .conn
            .get(ctx.active_handle(), &RecordKey::new(NAMESPACE, username))?;
        bytes.as_deref().map(decode).transpose()
    }
}
