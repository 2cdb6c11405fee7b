//! Transaction isolation levels.
//!
//! This demo models the two levels that differ on dirty reads:
//! - ReadUncommitted: reads may observe other transactions' pending writes
//! - ReadCommitted: reads only ever observe committed state

use std::fmt;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    /// Read Uncommitted isolation.
    ///
    /// A read returns the most recent write to the account from any live
    /// transaction, committed or not, falling back to the committed value.
    /// This is the level that permits dirty reads: a reader can observe a
    /// balance the writer later rolls back or has not yet made durable.
    ReadUncommitted,

    /// Read Committed isolation.
    ///
    /// A read returns only committed state. A concurrent transaction's
    /// pending write stays invisible until that transaction commits, which
    /// is exactly the gate that prevents dirty reads.
    #[default]
    ReadCommitted,
}

impl IsolationLevel {
    /// Check if this level lets readers see uncommitted writes.
    pub fn permits_dirty_reads(&self) -> bool {
        matches!(self, IsolationLevel::ReadUncommitted)
    }

    /// Get a human-readable description of this isolation level.
    pub fn description(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => {
                "Reads may observe other transactions' uncommitted writes"
            }
            IsolationLevel::ReadCommitted => {
                "Reads only observe committed state"
            }
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsolationLevel::ReadUncommitted => write!(f, "READ UNCOMMITTED"),
            IsolationLevel::ReadCommitted => write!(f, "READ COMMITTED"),
        }
    }
}

/// Parse isolation level from string (SQL or route syntax).
impl std::str::FromStr for IsolationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "READ UNCOMMITTED" | "READ_UNCOMMITTED" | "READ-UNCOMMITTED" | "READUNCOMMITTED" => {
                Ok(IsolationLevel::ReadUncommitted)
            }
            "READ COMMITTED" | "READ_COMMITTED" | "READ-COMMITTED" | "READCOMMITTED" => {
                Ok(IsolationLevel::ReadCommitted)
            }
            _ => Err(format!("unknown isolation level: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_isolation() {
        assert_eq!(IsolationLevel::default(), IsolationLevel::ReadCommitted);
    }

    #[test]
    fn test_permits_dirty_reads() {
        assert!(IsolationLevel::ReadUncommitted.permits_dirty_reads());
        assert!(!IsolationLevel::ReadCommitted.permits_dirty_reads());
    }

    #[test]
    fn test_parse_isolation() {
        assert_eq!(
            "READ UNCOMMITTED".parse::<IsolationLevel>().unwrap(),
            IsolationLevel::ReadUncommitted
        );
        assert_eq!(
            "read-committed".parse::<IsolationLevel>().unwrap(),
            IsolationLevel::ReadCommitted
        );
        assert!("serializable".parse::<IsolationLevel>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for level in [IsolationLevel::ReadUncommitted, IsolationLevel::ReadCommitted] {
            assert_eq!(level.to_string().parse::<IsolationLevel>().unwrap(), level);
        }
    }
}
