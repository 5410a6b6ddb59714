//! Session protocol abstraction trait.
//!
//! This module defines the `CqlSession` trait that abstracts the live cluster
//! session. Connections and statements only talk to this trait, so the
//! execution pipeline can run against the scylla driver or a test double.

use crate::error::TransportError;
use crate::types::ConsistencyLevel;
use async_trait::async_trait;
use scylla::value::CqlValue;

/// Column metadata of a row-producing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// CQL type, as reported by the cluster
    pub type_name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Raw rows handed to the result-set layer, undecoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRows {
    /// Column metadata
    pub columns: Vec<ColumnInfo>,
    /// Cell values, `None` for null
    pub rows: Vec<Vec<Option<CqlValue>>>,
}

/// Result of running one statement on the session.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// The cluster returned column metadata and rows
    Rows(RawRows),
    /// Anything without rows (writes, schema changes, `USE`)
    Void,
}

impl QueryResult {
    /// Check if this result carries rows.
    pub fn is_rows(&self) -> bool {
        matches!(self, Self::Rows(_))
    }
}

/// Handle to a statement prepared on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHandle {
    /// Session-local identifier
    pub id: u64,
    /// Statement text
    pub cql: String,
    /// Number of bind markers
    pub param_count: usize,
    /// Level the statement was prepared with
    pub consistency: ConsistencyLevel,
}

/// One member of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    /// Statement text added through a plain statement
    Text(String),
    /// Prepared statement with the values bound when it was added
    Prepared {
        id: u64,
        values: Vec<Option<CqlValue>>,
    },
}

/// Session protocol trait for cluster communication.
///
/// One implementation instance backs one connection and is shared by all
/// statements of that connection.
#[async_trait]
pub trait CqlSession: Send + Sync {
    /// Run statement text at the given consistency level.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Syntax` when the cluster rejects the text as
    /// malformed, `TransportError::Execution` for any other failure.
    async fn execute(
        &self,
        cql: &str,
        consistency: ConsistencyLevel,
    ) -> Result<QueryResult, TransportError>;

    /// Prepare statement text; executions use `consistency`.
    async fn prepare(
        &self,
        cql: &str,
        consistency: ConsistencyLevel,
    ) -> Result<PreparedHandle, TransportError>;

    /// Run a prepared statement with bound values.
    async fn execute_prepared(
        &self,
        handle: &PreparedHandle,
        values: Vec<Option<CqlValue>>,
    ) -> Result<QueryResult, TransportError>;

    /// Run the entries as one logged batch.
    async fn batch(
        &self,
        entries: &[BatchEntry],
        consistency: ConsistencyLevel,
    ) -> Result<(), TransportError>;

    /// Forget a prepared handle.
    async fn unprepare(&self, id: u64) -> Result<(), TransportError>;

    /// Keyspace the session is bound to.
    fn keyspace(&self) -> Option<String>;

    /// Release the session and then its cluster handle.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Closed` if the session was already released.
    async fn close(&self) -> Result<(), TransportError>;
}
