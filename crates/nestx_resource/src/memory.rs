//! In-memory resource connection for testing.

use crate::connection::ResourceConnection;
use crate::error::{ResourceError, ResourceResult};
use crate::{RecordKey, TxnHandle};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// An in-memory transactional record store.
///
/// This connection keeps all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral use where persistence is not needed
///
/// Writes staged under an open handle are private to that handle until
/// commit; rollback discards them. Multiple handles may be open at once,
/// which is how a suspended physical transaction stays alive while a
/// REQUIRES_NEW transaction runs above it.
///
/// # Thread Safety
///
/// This connection is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use nestx_resource::{InMemoryConnection, RecordKey, ResourceConnection};
///
/// let conn = InMemoryConnection::new();
/// let h = conn.begin().unwrap();
/// conn.put(h, RecordKey::new("members", "alice"), vec![1]).unwrap();
/// conn.commit(h).unwrap();
/// let value = conn.get(None, &RecordKey::new("members", "alice")).unwrap();
/// assert_eq!(value, Some(vec![1]));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryConnection {
    state: RwLock<ConnectionState>,
}

#[derive(Debug, Default)]
struct ConnectionState {
    next_handle: u64,
    committed: BTreeMap<RecordKey, Vec<u8>>,
    open: HashMap<TxnHandle, BTreeMap<RecordKey, Vec<u8>>>,
}

impl InMemoryConnection {
    /// Creates a new empty in-memory connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connection pre-populated with committed records.
    ///
    /// Useful for tests that need existing data.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = (RecordKey, Vec<u8>)>) -> Self {
        Self {
            state: RwLock::new(ConnectionState {
                next_handle: 0,
                committed: records.into_iter().collect(),
                open: HashMap::new(),
            }),
        }
    }

    /// Returns the number of committed records.
    #[must_use]
    pub fn committed_count(&self) -> usize {
        self.state.read().committed.len()
    }

    /// Returns the number of currently open physical transactions.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state.read().open.len()
    }
}

impl ResourceConnection for InMemoryConnection {
    fn begin(&self) -> ResourceResult<TxnHandle> {
        let mut state = self.state.write();
        let handle = TxnHandle::new(state.next_handle);
        state.next_handle += 1;
        state.open.insert(handle, BTreeMap::new());
        Ok(handle)
    }

    fn commit(&self, handle: TxnHandle) -> ResourceResult<()> {
        let mut state = self.state.write();
        let staged = state
            .open
            .remove(&handle)
            .ok_or(ResourceError::unknown_handle(handle.as_u64()))?;
        state.committed.extend(staged);
        Ok(())
    }

    fn rollback(&self, handle: TxnHandle) -> ResourceResult<()> {
        let mut state = self.state.write();
        state
            .open
            .remove(&handle)
            .ok_or(ResourceError::unknown_handle(handle.as_u64()))?;
        Ok(())
    }

    fn put(&self, handle: TxnHandle, key: RecordKey, value: Vec<u8>) -> ResourceResult<()> {
        let mut state = self.state.write();
        let staged = state
            .open
            .get_mut(&handle)
            .ok_or(ResourceError::unknown_handle(handle.as_u64()))?;
        staged.insert(key, value);
        Ok(())
    }

    fn get(&self, handle: Option<TxnHandle>, key: &RecordKey) -> ResourceResult<Option<Vec<u8>>> {
        let state = self.state.read();
        if let Some(handle) = handle {
            let staged = state
                .open
                .get(&handle)
                .ok_or(ResourceError::unknown_handle(handle.as_u64()))?;
            if let Some(value) = staged.get(key) {
                return Ok(Some(value.clone()));
            }
        }
        Ok(state.committed.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(k: &str) -> RecordKey {
        RecordKey::new("test", k)
    }

    #[test]
    fn begin_issues_distinct_handles() {
        let conn = InMemoryConnection::new();
        let h1 = conn.begin().unwrap();
        let h2 = conn.begin().unwrap();
        assert_ne!(h1, h2);
        assert_eq!(conn.open_count(), 2);
    }

    #[test]
    fn staged_write_invisible_until_commit() {
        let conn = InMemoryConnection::new();
        let h = conn.begin().unwrap();
        conn.put(h, key("a"), vec![1]).unwrap();

        // Not visible without the handle
        assert_eq!(conn.get(None, &key("a")).unwrap(), None);
        // Visible through the handle (read-your-writes)
        assert_eq!(conn.get(Some(h), &key("a")).unwrap(), Some(vec![1]));

        conn.commit(h).unwrap();
        assert_eq!(conn.get(None, &key("a")).unwrap(), Some(vec![1]));
    }

    #[test]
    fn rollback_discards_staged_writes() {
        let conn = InMemoryConnection::new();
        let h = conn.begin().unwrap();
        conn.put(h, key("a"), vec![1]).unwrap();
        conn.rollback(h).unwrap();

        assert_eq!(conn.get(None, &key("a")).unwrap(), None);
        assert_eq!(conn.committed_count(), 0);
    }

    #[test]
    fn closed_handle_is_unknown() {
        let conn = InMemoryConnection::new();
        let h = conn.begin().unwrap();
        conn.commit(h).unwrap();

        assert!(matches!(
            conn.commit(h),
            Err(ResourceError::UnknownHandle { .. })
        ));
        assert!(matches!(
            conn.put(h, key("a"), vec![1]),
            Err(ResourceError::UnknownHandle { .. })
        ));
    }

    #[test]
    fn handles_are_isolated_from_each_other() {
        let conn = InMemoryConnection::new();
        let h1 = conn.begin().unwrap();
        let h2 = conn.begin().unwrap();
        conn.put(h1, key("a"), vec![1]).unwrap();

        // h2 does not see h1's staged write
        assert_eq!(conn.get(Some(h2), &key("a")).unwrap(), None);

        conn.rollback(h2).unwrap();
        conn.commit(h1).unwrap();
        assert_eq!(conn.get(None, &key("a")).unwrap(), Some(vec![1]));
    }

    proptest! {
        #[test]
        fn commit_publishes_exactly_the_staged_records(
            records in proptest::collection::btree_map(
                "[a-z]{1,8}",
                proptest::collection::vec(0u8.., 0..16),
                1..12,
            )
        ) {
            let conn = InMemoryConnection::new();
            let h = conn.begin().unwrap();
            for (k, v) in &records {
                conn.put(h, key(k), v.clone()).unwrap();
            }
            conn.commit(h).unwrap();

            prop_assert_eq!(conn.committed_count(), records.len());
            for (k, v) in &records {
                let got = conn.get(None, &key(k)).unwrap();
                prop_assert_eq!(got.as_ref(), Some(v));
            }
        }
    }

    #[test]
    fn staged_write_shadows_committed_value() {
        let conn = InMemoryConnection::with_records([(key("a"), vec![1])]);
        let h = conn.begin().unwrap();
        conn.put(h, key("a"), vec![2]).unwrap();

        assert_eq!(conn.get(Some(h), &key("a")).unwrap(), Some(vec![2]));
        assert_eq!(conn.get(None, &key("a")).unwrap(), Some(vec![1]));

        conn.rollback(h).unwrap();
        assert_eq!(conn.get(None, &key("a")).unwrap(), Some(vec![1]));
    }
}
