//! Connection to a Cassandra cluster.
//!
//! A `Connection` owns one cluster session and the state every statement
//! created from it shares: the consistency level, the closed flag and the
//! blocking runtime bridge.

use crate::client::unsupported::{Operation, TransactionIsolation};
use crate::connection::params::ConnectionParams;
use crate::connection::session::SessionState;
use crate::connection::tls::KeyStoreConfig;
use crate::error::{ConnectionError, QueryError};
use crate::query::executor::Executor;
use crate::query::prepared::PreparedStatement;
use crate::query::results::ExecutionResult;
use crate::query::statement::Statement;
use crate::runtime::Runtime;
use crate::transport::cluster::ClusterFactory;
use crate::transport::protocol::CqlSession;
use crate::types::ConsistencyLevel;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Open connection to a cluster.
///
/// The connection is `Send + Sync`; statements it creates are independent
/// values that share its session. The consistency level is a single
/// connection-wide value: a `CONSISTENCY` command run through any statement
/// changes it for every statement executed afterwards, and concurrent
/// writers race with last-write-wins.
///
/// # Example
///
/// ```no_run
/// use cassandra_dbc::Driver;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let connection = Driver::new().connect("jdbc:cassandra://localhost/shop", None)?;
///
/// let mut stmt = connection.create_statement()?;
/// stmt.execute("CONSISTENCY QUORUM")?;
/// let rows = stmt.execute_query("SELECT id FROM orders")?;
/// println!("{} rows", rows.row_count());
///
/// connection.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Connection {
    executor: Executor,
    params: ConnectionParams,
}

impl Connection {
    /// Resolve hosts, configure TLS and open the cluster session.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` if a host is unknown, TLS material cannot be
    /// loaded or the cluster cannot be reached.
    pub fn open(
        params: ConnectionParams,
        keystore: &KeyStoreConfig,
    ) -> Result<Self, ConnectionError> {
        let runtime = Runtime::new().map_err(|e| ConnectionError::ConnectionFailed {
            hosts: params.hosts().join(","),
            message: format!("Failed to start runtime: {}", e),
        })?;

        let session = runtime.block_on(ClusterFactory::connect(&params, keystore))?;
        Ok(Self::with_session(
            Arc::new(session),
            params,
            Arc::new(runtime),
        ))
    }

    /// Wrap an already established session.
    pub fn with_session(
        session: Arc<dyn CqlSession>,
        params: ConnectionParams,
        runtime: Arc<Runtime>,
    ) -> Self {
        let state = Arc::new(SessionState::new(
            params.consistency_level(),
            params.return_null_strings_from_intro_query(),
        ));

        Self {
            executor: Executor::new(session, state, runtime),
            params,
        }
    }

    fn check_closed(&self) -> Result<(), ConnectionError> {
        self.executor.state().ensure_open()
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Create a statement sharing this connection's session.
    pub fn create_statement(&self) -> Result<Statement, ConnectionError> {
        self.check_closed()?;
        Ok(Statement::new(self.executor.clone()))
    }

    /// Prepare statement text at the current consistency level.
    ///
    /// Later `CONSISTENCY` commands do not affect the returned statement.
    pub fn prepare_statement(&self, cql: &str) -> Result<PreparedStatement, QueryError> {
        let handle = self.executor.prepare(cql)?;
        Ok(PreparedStatement::new(self.executor.clone(), handle))
    }

    /// Execute text without keeping a statement around.
    pub fn execute(&self, cql: &str) -> Result<ExecutionResult, QueryError> {
        self.executor.execute(cql)
    }

    /// Current consistency level.
    pub fn consistency_level(&self) -> ConsistencyLevel {
        self.executor.state().consistency_level()
    }

    /// Change the level used by statements executed from now on.
    pub fn set_consistency_level(&self, level: ConsistencyLevel) -> Result<(), ConnectionError> {
        self.check_closed()?;
        self.executor.state().set_consistency_level(level);
        debug!(%level, "changed consistency level");
        Ok(())
    }

    /// Keyspace the session is logged into.
    pub fn catalog(&self) -> Result<Option<String>, ConnectionError> {
        self.check_closed()?;
        Ok(self
            .executor
            .session()
            .keyspace()
            .or_else(|| self.params.keyspace().map(str::to_string)))
    }

    /// Accepted and ignored; switch keyspaces with `USE`.
    pub fn set_catalog(&self, _catalog: &str) {}

    pub fn schema(&self) -> Result<Option<String>, ConnectionError> {
        self.catalog()
    }

    pub fn set_schema(&self, _schema: &str) {}

    /// Always `true`; every statement applies on its own.
    pub fn auto_commit(&self) -> Result<bool, ConnectionError> {
        self.check_closed()?;
        Ok(true)
    }

    pub fn set_auto_commit(&self, _auto_commit: bool) -> Result<(), ConnectionError> {
        self.check_closed()
    }

    pub fn commit(&self) -> Result<(), ConnectionError> {
        self.check_closed()
    }

    pub fn rollback(&self) -> Result<(), ConnectionError> {
        self.check_closed()
    }

    pub fn transaction_isolation(&self) -> Result<TransactionIsolation, ConnectionError> {
        self.check_closed()?;
        Ok(TransactionIsolation::None)
    }

    pub fn set_transaction_isolation(
        &self,
        _level: TransactionIsolation,
    ) -> Result<(), QueryError> {
        self.check_closed()?;
        Operation::SetTransactionIsolation.reject()
    }

    pub fn is_read_only(&self) -> Result<bool, ConnectionError> {
        self.check_closed()?;
        Ok(self.executor.state().is_read_only())
    }

    /// Recorded for tools that ask; writes are not blocked.
    pub fn set_read_only(&self, read_only: bool) -> Result<(), ConnectionError> {
        self.check_closed()?;
        self.executor.state().set_read_only(read_only);
        Ok(())
    }

    pub fn native_sql(&self, _sql: &str) -> Result<String, QueryError> {
        self.check_closed()?;
        Operation::NativeSql.reject()
    }

    /// Fails on a closed connection, `true` otherwise.
    pub fn is_valid(&self) -> Result<bool, ConnectionError> {
        self.check_closed()?;
        Ok(true)
    }

    /// Statements dispatched to the cluster so far.
    pub fn query_count(&self) -> u64 {
        self.executor.state().query_count()
    }

    /// Fail an operation outside the supported subset.
    pub fn unsupported<T>(&self, operation: Operation) -> Result<T, QueryError> {
        operation.reject()
    }

    /// Release the session and the cluster handle.
    ///
    /// Only the first call does any work. Statements created from this
    /// connection fail from now on.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::ConnectionFailed` if the session reports a
    /// failure while shutting down.
    pub fn close(&self) -> Result<(), ConnectionError> {
        if !self.executor.state().mark_closed() {
            return Ok(());
        }

        let hosts = self.params.hosts().join(",");
        info!(%hosts, queries = self.query_count(), "closing connection");

        self.executor
            .runtime()
            .block_on(self.executor.session().close())
            .map_err(|e| {
                warn!(%hosts, error = %e, "failed to release session");
                ConnectionError::ConnectionFailed {
                    hosts: hosts.clone(),
                    message: e.to_string(),
                }
            })
    }

    pub fn is_closed(&self) -> bool {
        self.executor.state().is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("hosts", &self.params.hosts())
            .field("keyspace", &self.params.keyspace())
            .field("consistency_level", &self.consistency_level())
            .field("closed", &self.is_closed())
            .finish()
    }
}
