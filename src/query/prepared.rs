//! Prepared statements with typed bind parameters.
//!
//! A prepared statement is bound to the consistency level the connection had
//! when it was prepared. Its text is never checked against the meta-command
//! chain.

use crate::error::QueryError;
use crate::query::batch::{self, Batch, BatchStatus};
use crate::query::executor::Executor;
use crate::query::results::{ExecutionResult, ResultSet, UPDATE_COUNT_UNKNOWN};
use crate::transport::protocol::{BatchEntry, PreparedHandle};
use crate::types::{ConsistencyLevel, Parameter};
use scylla::value::CqlValue;
use tracing::warn;

/// Column-introspection query issued by older database tools.
///
/// Null text cells of its results read as the literal `"null"` unless the
/// connection sets `returnNullStringsFromIntroQuery`.
pub const INTRO_QUERY: &str = "SELECT column_name as name,
       validator,
       columnfamily_name as table_name,
       type,
       index_name,
       index_options,
       index_type,
       component_index as position
FROM system.schema_columns
WHERE keyspace_name = ?";

/// A prepared statement for parameterized execution.
///
/// # Example
///
/// ```no_run
/// use cassandra_dbc::Driver;
///
/// # fn example() -> Result<(), cassandra_dbc::DriverError> {
/// let connection = Driver::new().connect("jdbc:cassandra://localhost/shop", None)?;
/// let mut prepared = connection.prepare_statement("SELECT * FROM orders WHERE id = ?")?;
/// prepared.bind(0, 42)?;
/// let rows = prepared.execute_query()?;
/// println!("{} rows", rows.row_count());
/// prepared.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PreparedStatement {
    executor: Executor,
    handle: PreparedHandle,
    /// Bound values by zero-based marker index
    parameters: Vec<Option<Parameter>>,
    /// Whether null text cells of results render as `"null"`
    null_placeholder: bool,
    batch: Option<Batch>,
    result: Option<ResultSet>,
    closed: bool,
}

impl PreparedStatement {
    pub(crate) fn new(executor: Executor, handle: PreparedHandle) -> Self {
        let null_placeholder = !executor.state().return_null_strings_from_intro_query()
            && handle.cql.trim() == INTRO_QUERY;
        let parameters = vec![None; handle.param_count];

        Self {
            executor,
            handle,
            parameters,
            null_placeholder,
            batch: None,
            result: None,
            closed: false,
        }
    }

    fn check_closed(&self) -> Result<(), QueryError> {
        if self.closed {
            Err(QueryError::StatementClosed)
        } else {
            Ok(())
        }
    }

    /// Statement text as prepared.
    pub fn cql(&self) -> &str {
        &self.handle.cql
    }

    /// Number of bind markers.
    pub fn param_count(&self) -> usize {
        self.handle.param_count
    }

    /// Level captured when the statement was prepared.
    pub fn consistency_level(&self) -> ConsistencyLevel {
        self.handle.consistency
    }

    pub fn returns_null_placeholder(&self) -> bool {
        self.null_placeholder
    }

    /// Bind a parameter value at the given index.
    ///
    /// # Arguments
    /// * `index` - Zero-based parameter index
    /// * `value` - Value to bind
    ///
    /// # Errors
    /// Returns `QueryError::ParameterBinding` if index is out of bounds.
    pub fn bind(&mut self, index: usize, value: impl Into<Parameter>) -> Result<(), QueryError> {
        self.check_closed()?;
        let count = self.parameters.len();
        let slot = self
            .parameters
            .get_mut(index)
            .ok_or_else(|| QueryError::ParameterBinding {
                index,
                message: format!(
                    "Parameter index {} out of bounds (statement has {} parameters)",
                    index, count
                ),
            })?;
        *slot = Some(value.into());
        Ok(())
    }

    /// Clear all bound parameters.
    pub fn clear_parameters(&mut self) -> Result<(), QueryError> {
        self.check_closed()?;
        self.parameters.iter_mut().for_each(|param| *param = None);
        Ok(())
    }

    fn values(&self) -> Result<Vec<Option<CqlValue>>, QueryError> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(index, param)| {
                param
                    .as_ref()
                    .map(Parameter::to_cql_value)
                    .ok_or_else(|| QueryError::ParameterBinding {
                        index,
                        message: format!("Parameter {} is not bound", index),
                    })
            })
            .collect()
    }

    /// Execute with the bound parameters.
    ///
    /// Returns `true` when the execution produced rows.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Not all parameters are bound
    /// - The statement or its connection has been closed
    /// - Execution fails on the cluster
    pub fn execute(&mut self) -> Result<bool, QueryError> {
        self.check_closed()?;
        self.result = None;
        let values = self.values()?;

        match self
            .executor
            .execute_prepared(&self.handle, values, self.null_placeholder)?
        {
            ExecutionResult::Rows(result_set) => {
                self.result = Some(result_set);
                Ok(true)
            }
            ExecutionResult::Update => Ok(false),
        }
    }

    /// Execute and return the produced rows.
    pub fn execute_query(&mut self) -> Result<ResultSet, QueryError> {
        self.execute()?;
        self.result.take().ok_or_else(|| {
            QueryError::NoResultSet("Prepared statement did not produce rows".to_string())
        })
    }

    /// Execute and return the update count, which is always unknown.
    pub fn execute_update(&mut self) -> Result<i64, QueryError> {
        self.execute()?;
        Ok(UPDATE_COUNT_UNKNOWN)
    }

    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<ResultSet> {
        self.result.take()
    }

    /// Add the currently bound values to the pending batch.
    pub fn add_batch(&mut self) -> Result<(), QueryError> {
        self.check_closed()?;
        let values = self.values()?;
        batch::add_pending(
            &mut self.batch,
            BatchEntry::Prepared {
                id: self.handle.id,
                values,
            },
        );
        Ok(())
    }

    pub fn clear_batch(&mut self) -> Result<(), QueryError> {
        self.check_closed()?;
        self.batch = None;
        Ok(())
    }

    /// Run the pending batch; it is cleared whatever the outcome.
    pub fn execute_batch(&mut self) -> Result<Vec<BatchStatus>, QueryError> {
        self.check_closed()?;
        batch::execute_pending(&mut self.batch, &self.executor)
    }

    /// Close the statement and release its session handle.
    ///
    /// Closing twice is a no-op. Failing to release the handle is logged,
    /// not reported.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.result = None;
        self.batch = None;

        if let Err(e) = self.executor.unprepare(self.handle.id) {
            warn!(id = self.handle.id, error = %e, "failed to release prepared statement");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
