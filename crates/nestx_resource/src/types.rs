//! Core type definitions for the resource boundary.

use std::fmt;

/// Handle naming one open physical transaction on a connection.
///
/// Handles are issued by [`crate::ResourceConnection::begin`] and become
/// invalid once the transaction they name is committed or rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxnHandle(pub u64);

impl TxnHandle {
    /// Creates a new handle from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h:{}", self.0)
    }
}

/// Addressing for a record in the resource.
///
/// Records live in namespaces so that independent participants (a member
/// store, an audit-log store) never collide on keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    /// Namespace the record belongs to.
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
}

impl RecordKey {
    /// Creates a new record key.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_display() {
        assert_eq!(format!("{}", TxnHandle::new(7)), "h:7");
    }

    #[test]
    fn record_key_ordering_is_namespace_first() {
        let a = RecordKey::new("audit", "zz");
        let b = RecordKey::new("members", "aa");
        assert!(a < b);
    }

    #[test]
    fn record_key_display() {
        let k = RecordKey::new("members", "alice");
        assert_eq!(format!("{k}"), "members/alice");
    }
}
