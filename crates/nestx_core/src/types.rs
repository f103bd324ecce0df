//! Core type definitions for NestX.

use std::fmt;

/// Unique identifier for a physical transaction.
///
/// Physical transaction IDs are monotonically assigned by the manager and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalTxnId(pub u64);

impl PhysicalTxnId {
    /// Creates a new physical transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PhysicalTxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ptx:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_txn_id_ordering() {
        let t1 = PhysicalTxnId::new(1);
        let t2 = PhysicalTxnId::new(2);
        assert!(t1 < t2);
    }

    #[test]
    fn physical_txn_id_display() {
        let t = PhysicalTxnId::new(42);
        assert_eq!(format!("{t}"), "ptx:42");
    }
}
