//! Plain statements.
//!
//! A `Statement` runs arbitrary text, including the `CONSISTENCY`
//! meta-commands, and can accumulate text into a batch. It holds at most one
//! result at a time and is not meant to be shared between threads without
//! external synchronization.

use crate::client::unsupported::{FetchDirection, Operation};
use crate::error::QueryError;
use crate::query::batch::{self, Batch, BatchStatus};
use crate::query::executor::Executor;
use crate::query::results::{ExecutionResult, ResultSet, UPDATE_COUNT_UNKNOWN};
use crate::transport::protocol::BatchEntry;

/// Statement for executing CQL text.
#[derive(Debug)]
pub struct Statement {
    executor: Executor,
    /// Pending batch, created on first add
    batch: Option<Batch>,
    /// Rows of the most recent execution
    result: Option<ResultSet>,
    closed: bool,
}

impl Statement {
    pub(crate) fn new(executor: Executor) -> Self {
        Self {
            executor,
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

    /// Execute text.
    ///
    /// Returns `true` when the execution produced rows, available through
    /// [`Statement::result`]; `false` for anything else.
    ///
    /// # Errors
    /// Returns `QueryError::StatementClosed` after close, and the errors of
    /// [`Executor::execute`].
    pub fn execute(&mut self, cql: &str) -> Result<bool, QueryError> {
        self.check_closed()?;
        self.result = None;

        match self.executor.execute(cql)? {
            ExecutionResult::Rows(result_set) => {
                self.result = Some(result_set);
                Ok(true)
            }
            ExecutionResult::Update => Ok(false),
        }
    }

    /// Execute text that must produce rows.
    ///
    /// # Errors
    /// Returns `QueryError::NoResultSet` if the text produced no rows.
    pub fn execute_query(&mut self, cql: &str) -> Result<ResultSet, QueryError> {
        self.execute(cql)?;
        self.result.take().ok_or_else(|| {
            QueryError::NoResultSet("Statement did not produce rows".to_string())
        })
    }

    /// Execute text and return the update count, which is always unknown.
    pub fn execute_update(&mut self, cql: &str) -> Result<i64, QueryError> {
        self.execute(cql)?;
        self.update_count()
    }

    /// Rows of the last execution, if it produced any.
    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    pub fn result_mut(&mut self) -> Option<&mut ResultSet> {
        self.result.as_mut()
    }

    /// Take ownership of the rows of the last execution.
    pub fn take_result(&mut self) -> Option<ResultSet> {
        self.result.take()
    }

    /// Cassandra never reports affected rows.
    pub fn update_count(&self) -> Result<i64, QueryError> {
        self.check_closed()?;
        Ok(UPDATE_COUNT_UNKNOWN)
    }

    /// Append text to the pending batch.
    pub fn add_batch(&mut self, cql: &str) -> Result<(), QueryError> {
        self.check_closed()?;
        batch::add_pending(&mut self.batch, BatchEntry::Text(cql.to_string()));
        Ok(())
    }

    /// Drop the pending batch.
    pub fn clear_batch(&mut self) -> Result<(), QueryError> {
        self.check_closed()?;
        self.batch = None;
        Ok(())
    }

    /// Number of statements waiting in the pending batch.
    pub fn pending_batch_len(&self) -> usize {
        self.batch.as_ref().map_or(0, Batch::len)
    }

    /// Run the pending batch as one unit.
    ///
    /// The pending batch is cleared whether or not the cluster accepts it.
    ///
    /// # Errors
    /// Returns `QueryError::NoBatchStatements` when nothing was added.
    pub fn execute_batch(&mut self) -> Result<Vec<BatchStatus>, QueryError> {
        self.check_closed()?;
        batch::execute_pending(&mut self.batch, &self.executor)
    }

    /// Cancellation is not supported.
    pub fn cancel(&self) -> Result<(), QueryError> {
        Operation::Cancel.reject()
    }

    /// Accepted and ignored.
    pub fn set_cursor_name(&self, _name: &str) -> Result<(), QueryError> {
        self.check_closed()
    }

    pub fn fetch_direction(&self) -> Result<FetchDirection, QueryError> {
        self.check_closed()?;
        Ok(FetchDirection::Forward)
    }

    /// Fail an operation outside the supported subset.
    pub fn unsupported<T>(&self, operation: Operation) -> Result<T, QueryError> {
        operation.reject()
    }

    /// Close the statement. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.closed = true;
        self.result = None;
        self.batch = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
