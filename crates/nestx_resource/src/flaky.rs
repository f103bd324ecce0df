//! Fault-injecting connection wrapper for tests.

use crate::connection::ResourceConnection;
use crate::error::{ResourceError, ResourceResult};
use crate::{RecordKey, TxnHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A connection wrapper that can be armed to fail terminal operations.
///
/// Wraps another [`ResourceConnection`] and, while armed, fails `commit`
/// and `rollback` with [`ResourceError::ConnectionLost`] without touching
/// the inner connection. Reads, writes, and `begin` always pass through.
///
/// Used to verify that the manager restores suspended transactions even
/// when the physical operation itself fails.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use nestx_resource::{FlakyConnection, InMemoryConnection, ResourceConnection};
///
/// let conn = FlakyConnection::new(Arc::new(InMemoryConnection::new()));
/// let h = conn.begin().unwrap();
/// conn.fail_next_terminal();
/// assert!(conn.commit(h).is_err());
/// ```
#[derive(Debug)]
pub struct FlakyConnection<C> {
    inner: Arc<C>,
    fail_terminal: AtomicBool,
}

impl<C: ResourceConnection> FlakyConnection<C> {
    /// Wraps a connection.
    pub fn new(inner: Arc<C>) -> Self {
        Self {
            inner,
            fail_terminal: AtomicBool::new(false),
        }
    }

    /// Arms the wrapper: the next `commit` or `rollback` fails.
    ///
    /// The armed state clears once a terminal operation has failed.
    pub fn fail_next_terminal(&self) {
        self.fail_terminal.store(true, Ordering::SeqCst);
    }

    /// Returns the wrapped connection.
    #[must_use]
    pub fn inner(&self) -> &Arc<C> {
        &self.inner
    }

    fn check_terminal(&self) -> ResourceResult<()> {
        if self.fail_terminal.swap(false, Ordering::SeqCst) {
            return Err(ResourceError::connection_lost("injected fault"));
        }
        Ok(())
    }
}

impl<C: ResourceConnection> ResourceConnection for FlakyConnection<C> {
    fn begin(&self) -> ResourceResult<TxnHandle> {
        self.inner.begin()
    }

    fn commit(&self, handle: TxnHandle) -> ResourceResult<()> {
        self.check_terminal()?;
        self.inner.commit(handle)
    }

    fn rollback(&self, handle: TxnHandle) -> ResourceResult<()> {
        self.check_terminal()?;
        self.inner.rollback(handle)
    }

    fn put(&self, handle: TxnHandle, key: RecordKey, value: Vec<u8>) -> ResourceResult<()> {
        self.inner.put(handle, key, value)
    }

    fn get(&self, handle: Option<TxnHandle>, key: &RecordKey) -> ResourceResult<Option<Vec<u8>>> {
        self.inner.get(handle, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryConnection;

    #[test]
    fn fault_fires_once_then_clears() {
        let conn = FlakyConnection::new(Arc::new(InMemoryConnection::new()));
        let h = conn.begin().unwrap();

        conn.fail_next_terminal();
        assert!(matches!(
            conn.commit(h),
            Err(ResourceError::ConnectionLost { .. })
        ));

        // Handle is still open on the inner connection; retry succeeds.
        conn.commit(h).unwrap();
    }

    #[test]
    fn passes_through_when_unarmed() {
        let conn = FlakyConnection::new(Arc::new(InMemoryConnection::new()));
        let h = conn.begin().unwrap();
        conn.put(h, RecordKey::new("test", "a"), vec![1]).unwrap();
        conn.commit(h).unwrap();
        assert_eq!(
            conn.get(None, &RecordKey::new("test", "a")).unwrap(),
            Some(vec![1])
        );
    }
}
