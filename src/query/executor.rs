//! Statement execution pipeline.
//!
//! Text first runs through the meta-command chain; anything the chain does
//! not claim is sent verbatim to the cluster at the connection's current
//! consistency level and the outcome is classified as rows or update.

use crate::connection::session::SessionState;
use crate::error::QueryError;
use crate::query::meta;
use crate::query::results::ExecutionResult;
use crate::runtime::Runtime;
use crate::transport::protocol::{BatchEntry, CqlSession, PreparedHandle};
use scylla::value::CqlValue;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Everything a statement needs from its connection.
#[derive(Clone)]
pub struct Executor {
    session: Arc<dyn CqlSession>,
    state: Arc<SessionState>,
    runtime: Arc<Runtime>,
}

impl Executor {
    pub(crate) fn new(
        session: Arc<dyn CqlSession>,
        state: Arc<SessionState>,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            session,
            state,
            runtime,
        }
    }

    pub(crate) fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn session(&self) -> &dyn CqlSession {
        self.session.as_ref()
    }

    pub(crate) fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Execute statement text.
    ///
    /// # Errors
    ///
    /// - `QueryError::Connection` once the connection is closed
    /// - `QueryError::SyntaxError` when the cluster rejects the text
    /// - `QueryError::ExecutionFailed` for unknown meta-command levels and
    ///   every other cluster failure
    pub fn execute(&self, cql: &str) -> Result<ExecutionResult, QueryError> {
        self.state.ensure_open()?;

        if let Some(result) = meta::intercept(cql, &self.state) {
            debug!(cql, "handled meta-command");
            return result;
        }

        let level = self.state.consistency_level();
        self.state.increment_query_count();
        debug!(%level, cql, "dispatching statement");

        let result = self.runtime.block_on(self.session.execute(cql, level))?;
        Ok(ExecutionResult::from_transport(result, false))
    }

    /// Prepare text with a snapshot of the current consistency level.
    pub fn prepare(&self, cql: &str) -> Result<PreparedHandle, QueryError> {
        self.state.ensure_open()?;

        let level = self.state.consistency_level();
        debug!(%level, cql, "preparing statement");
        Ok(self.runtime.block_on(self.session.prepare(cql, level))?)
    }

    /// Execute a prepared statement; meta-commands do not apply.
    pub fn execute_prepared(
        &self,
        handle: &PreparedHandle,
        values: Vec<Option<CqlValue>>,
        null_placeholder: bool,
    ) -> Result<ExecutionResult, QueryError> {
        self.state.ensure_open()?;
        self.state.increment_query_count();
        debug!(id = handle.id, level = %handle.consistency, "executing prepared statement");

        let result = self
            .runtime
            .block_on(self.session.execute_prepared(handle, values))?;
        Ok(ExecutionResult::from_transport(result, null_placeholder))
    }

    /// Submit entries as one unit at the current consistency level.
    pub fn execute_batch(&self, entries: &[BatchEntry]) -> Result<(), QueryError> {
        self.state.ensure_open()?;

        let level = self.state.consistency_level();
        self.state.increment_query_count();
        Ok(self.runtime.block_on(self.session.batch(entries, level))?)
    }

    /// Release a prepared handle.
    pub fn unprepare(&self, id: u64) -> Result<(), QueryError> {
        Ok(self.runtime.block_on(self.session.unprepare(id))?)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("session", &"<CqlSession>")
            .field("state", &self.state)
            .field("runtime", &self.runtime)
            .finish()
    }
}
