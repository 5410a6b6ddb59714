//! Operations of the relational client contract that Cassandra cannot honor.
//!
//! Instead of one stub per method, every unsupported member is a variant of
//! [`Operation`] and fails the same way.

use crate::error::QueryError;
use std::fmt;

/// A client-contract operation outside the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Interrupting a running statement
    Cancel,
    /// Changing the transaction isolation level
    SetTransactionIsolation,
    /// Translating SQL to native CQL
    NativeSql,
    /// Stored procedure calls
    PrepareCall,
    /// Scrollable or updatable result sets
    ResultSetType,
    /// Result set holdability
    Holdability,
    /// Savepoints
    Savepoint,
    /// Custom type maps
    TypeMap,
    /// Generated key retrieval
    GeneratedKeys,
    /// Positioned updates through a named cursor
    PositionedUpdate,
    /// Large object creation
    LargeObjects,
}

impl Operation {
    /// Message reported to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            Operation::Cancel => "Cassandra provides no support for interrupting an operation.",
            Operation::SetTransactionIsolation => "Cassandra provides no support for transactions.",
            Operation::NativeSql => "Cassandra does not support SQL natively.",
            Operation::PrepareCall => "Stored procedures are not supported",
            Operation::ResultSetType => "Only forward-only, read-only result sets are supported",
            Operation::Holdability => "Result set holdability is not supported",
            Operation::Savepoint => "Savepoints are not supported",
            Operation::TypeMap => "Type maps are not supported",
            Operation::GeneratedKeys => "Generated keys are not supported",
            Operation::PositionedUpdate => "Positioned updates are not supported",
            Operation::LargeObjects => "Large objects are not supported",
        }
    }

    /// Fail with this operation's not-supported error.
    pub fn reject<T>(self) -> Result<T, QueryError> {
        Err(QueryError::NotSupported(self))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Isolation levels of the relational contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionIsolation {
    /// No transactions; the only level Cassandra offers
    #[default]
    None,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Cursor movement direction of result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchDirection {
    #[default]
    Forward,
    Reverse,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_reject_is_not_supported() {
        let err = Operation::Savepoint.reject::<()>().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotSupported);
        assert_eq!(err.to_string(), "Savepoints are not supported");
    }

    #[test]
    fn test_exact_messages() {
        assert_eq!(
            Operation::SetTransactionIsolation.to_string(),
            "Cassandra provides no support for transactions."
        );
        assert_eq!(
            Operation::NativeSql.to_string(),
            "Cassandra does not support SQL natively."
        );
    }
}
