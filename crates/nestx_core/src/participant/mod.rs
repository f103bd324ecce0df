//! Participant stores: data access executing inside transaction scopes.
//!
//! Participants read and write under whatever physical transaction is
//! active in the [`ExecutionContext`](crate::ExecutionContext) at call
//! time. They never begin, commit, or roll back anything themselves -
//! orchestrators own the scopes. A participant's validation failure
//! propagates as an ordinary error so the enclosing scope's completion
//! can react to it.
//!
//! Records are CBOR-encoded via `serde` + `ciborium`.

mod audit;
mod member;

pub use audit::{AuditEntry, AuditLogStore, REJECTED_MARKER};
pub use member::{Member, MemberStore};

use crate::error::{TxError, TxResult};
use crate::transaction::ExecutionContext;
use nestx_resource::TxnHandle;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes a record to CBOR bytes.
pub(crate) fn encode<T: Serialize>(value: &T) -> TxResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).map_err(|e| TxError::codec(e.to_string()))?;
    Ok(buf)
}

/// Decodes a record from CBOR bytes.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> TxResult<T> {
    ciborium::de::from_reader(bytes).map_err(|e| TxError::codec(e.to_string()))
}

/// Returns the active handle, failing when no transaction is active.
///
/// Participants never open their own scopes, so a write outside any
/// scope is a caller bug.
pub(crate) fn active_handle(ctx: &ExecutionContext) -> TxResult<TxnHandle> {
    ctx.active_handle()
        .ok_or_else(|| TxError::illegal_state("no active transaction for participant write"))
}
