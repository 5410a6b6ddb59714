//! Error types for cassandra-dbc.
//!
//! This module defines domain-specific error types organized by functional area.
//! Messages reported by the cluster are carried verbatim inside the wrapping variant.

use std::fmt;
use thiserror::Error;

use crate::client::unsupported::Operation;

/// Top-level error type encompassing all possible errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Connection-related errors
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Statement execution errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Session layer errors that were not mapped to a statement error
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors related to connection strings and connection establishment.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Malformed connection string
    #[error("Invalid connection string: {0}")]
    InvalidUri(String),

    /// Invalid connection parameter
    #[error("Invalid connection parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// A contact point could not be resolved to a network address
    #[error("Unknown host '{host}': {message}")]
    UnknownHost { host: String, message: String },

    /// Failed to establish the cluster session
    #[error("Failed to connect to {hosts}: {message}")]
    ConnectionFailed { hosts: String, message: String },

    /// TLS/SSL configuration error (unreadable key material, bad keystore)
    #[error("SSL configuration error: {0}")]
    Tls(String),

    /// Connection is closed
    #[error("Connection was previously closed.")]
    ConnectionClosed,
}

/// Errors related to statement execution.
#[derive(Error, Debug)]
pub enum QueryError {
    /// CQL syntax error reported by the cluster
    #[error("Syntax error: {0}")]
    SyntaxError(String),

    /// Statement execution failed
    #[error("{0}")]
    ExecutionFailed(String),

    /// Statement has been closed
    #[error("Statement was previously closed.")]
    StatementClosed,

    /// Batch execution requested with nothing added
    #[error("No batch statements were submitted")]
    NoBatchStatements,

    /// Result set not available
    #[error("Result set not available: {0}")]
    NoResultSet(String),

    /// Parameter binding error
    #[error("Parameter binding error for parameter {index}: {message}")]
    ParameterBinding { index: usize, message: String },

    /// Operation outside the supported subset of the client contract
    #[error("{}", .0.message())]
    NotSupported(Operation),

    /// Connection-level failure observed while executing
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Errors reported by the session layer.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The cluster rejected the statement text
    #[error("{0}")]
    Syntax(String),

    /// Any other failure reported by the cluster or the driver
    #[error("{0}")]
    Execution(String),

    /// Preparing a statement failed for a reason other than syntax
    #[error("{0}")]
    Prepare(String),

    /// Prepared statement handle is unknown to the session
    #[error("Unknown prepared statement handle {0}")]
    UnknownPrepared(u64),

    /// The session has already been released
    #[error("Session is closed")]
    Closed,
}

/// Error classification codes.
///
/// Lets callers special-case kinds of failure without matching on nested enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unknown error
    Unknown,
    /// Connection error
    Connection,
    /// Invalid argument (malformed connection string or option)
    InvalidArgument,
    /// TLS configuration error
    Tls,
    /// Syntax error reported by the cluster
    Syntax,
    /// Generic execution error
    Query,
    /// Operation on a closed resource or empty batch
    InvalidState,
    /// Operation outside the supported contract
    NotSupported,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Unknown => write!(f, "UNKNOWN"),
            ErrorCode::Connection => write!(f, "CONNECTION"),
            ErrorCode::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            ErrorCode::Tls => write!(f, "TLS"),
            ErrorCode::Syntax => write!(f, "SYNTAX"),
            ErrorCode::Query => write!(f, "QUERY"),
            ErrorCode::InvalidState => write!(f, "INVALID_STATE"),
            ErrorCode::NotSupported => write!(f, "NOT_SUPPORTED"),
        }
    }
}

impl DriverError {
    /// Map to an error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            DriverError::Connection(e) => e.code(),
            DriverError::Query(e) => e.code(),
            DriverError::Transport(e) => e.code(),
        }
    }
}

impl ConnectionError {
    /// Map to an error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConnectionError::InvalidUri(_) | ConnectionError::InvalidParameter { .. } => {
                ErrorCode::InvalidArgument
            }
            ConnectionError::Tls(_) => ErrorCode::Tls,
            ConnectionError::ConnectionClosed => ErrorCode::InvalidState,
            ConnectionError::UnknownHost { .. } | ConnectionError::ConnectionFailed { .. } => {
                ErrorCode::Connection
            }
        }
    }
}

impl QueryError {
    /// Map to an error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            QueryError::SyntaxError(_) => ErrorCode::Syntax,
            QueryError::StatementClosed | QueryError::NoBatchStatements => ErrorCode::InvalidState,
            QueryError::ParameterBinding { .. } => ErrorCode::InvalidArgument,
            QueryError::NotSupported(_) => ErrorCode::NotSupported,
            QueryError::Connection(e) => e.code(),
            QueryError::ExecutionFailed(_) | QueryError::NoResultSet(_) => ErrorCode::Query,
        }
    }
}

impl TransportError {
    /// Map to an error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            TransportError::Syntax(_) => ErrorCode::Syntax,
            TransportError::Closed => ErrorCode::InvalidState,
            TransportError::UnknownPrepared(_) => ErrorCode::InvalidState,
            TransportError::Execution(_) | TransportError::Prepare(_) => ErrorCode::Query,
        }
    }
}

impl From<TransportError> for QueryError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Syntax(message) => QueryError::SyntaxError(message),
            TransportError::Closed => QueryError::Connection(ConnectionError::ConnectionClosed),
            other => QueryError::ExecutionFailed(other.to_string()),
        }
    }
}

impl From<openssl::error::ErrorStack> for ConnectionError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        ConnectionError::Tls(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::UnknownHost {
            host: "nowhere.invalid".to_string(),
            message: "no address".to_string(),
        };
        assert!(err.to_string().contains("nowhere.invalid"));
        assert_eq!(err.code(), ErrorCode::Connection);
    }

    #[test]
    fn test_closed_messages() {
        assert_eq!(
            ConnectionError::ConnectionClosed.to_string(),
            "Connection was previously closed."
        );
        assert_eq!(
            QueryError::StatementClosed.to_string(),
            "Statement was previously closed."
        );
        assert_eq!(QueryError::StatementClosed.code(), ErrorCode::InvalidState);
    }

    #[test]
    fn test_syntax_error_is_distinct() {
        let err: QueryError = TransportError::Syntax("line 1:0 no viable alternative".into()).into();
        assert!(matches!(err, QueryError::SyntaxError(_)));
        assert_eq!(err.code(), ErrorCode::Syntax);
        assert!(err.to_string().contains("no viable alternative"));
    }

    #[test]
    fn test_execution_error_preserves_message() {
        let err: QueryError =
            TransportError::Execution("Keyspace 'nope' does not exist".into()).into();
        assert_eq!(err.to_string(), "Keyspace 'nope' does not exist");
        assert_eq!(err.code(), ErrorCode::Query);
    }

    #[test]
    fn test_closed_session_maps_to_connection_closed() {
        let err: QueryError = TransportError::Closed.into();
        assert!(matches!(
            err,
            QueryError::Connection(ConnectionError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_invalid_uri_code() {
        let err = DriverError::Connection(ConnectionError::InvalidUri("bad".into()));
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(ErrorCode::InvalidArgument.to_string(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_not_supported_message() {
        let err = QueryError::NotSupported(Operation::Cancel);
        assert!(err.to_string().contains("interrupting"));
        assert_eq!(err.code(), ErrorCode::NotSupported);
    }
}
