//! Cluster session backed by the scylla driver.
//!
//! `ClusterFactory` turns parsed connection parameters into one live driver
//! session; `ScyllaSession` implements [`CqlSession`] on top of it.

use super::protocol::{BatchEntry, ColumnInfo, CqlSession, PreparedHandle, QueryResult, RawRows};
use crate::connection::params::ConnectionParams;
use crate::connection::tls::{build_ssl_context, KeyStoreConfig};
use crate::error::{ConnectionError, TransportError};
use crate::types::ConsistencyLevel;
use async_trait::async_trait;
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::errors::{DbError, ExecutionError, PrepareError, RequestAttemptError};
use scylla::response::query_result::QueryResult as DriverResult;
use scylla::statement::batch::{Batch, BatchType};
use scylla::statement::prepared::PreparedStatement;
use scylla::statement::unprepared::Statement;
use scylla::value::{CqlValue, Row};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Builds the cluster handle and session for a connection.
pub struct ClusterFactory;

impl ClusterFactory {
    /// Connect to the cluster described by `params`.
    ///
    /// Every host is resolved up front and registered as a contact point on
    /// the shared port. TLS, credentials and the keyspace apply to the whole
    /// cluster handle.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::UnknownHost` if a host does not resolve
    /// - `ConnectionError::Tls` if key material cannot be loaded
    /// - `ConnectionError::ConnectionFailed` if no session could be opened
    pub async fn connect(
        params: &ConnectionParams,
        keystore: &KeyStoreConfig,
    ) -> Result<ScyllaSession, ConnectionError> {
        let port = params.effective_port();
        let contact_points = params.hosts().join(",");

        info!(
            hosts = %contact_points,
            port,
            keyspace = ?params.keyspace(),
            sslenabled = params.ssl_enabled(),
            "connecting to cluster"
        );

        let mut builder = SessionBuilder::new();
        for host in params.host_names() {
            let addr = resolve(host, port).await?;
            debug!(host = %host, %addr, "registered contact point");
            builder = builder.known_node_addr(addr);
        }

        if let Some(context) = build_ssl_context(params, keystore)? {
            builder = builder.tls_context(Some(context));
        }

        if let Some((user, password)) = params.credentials() {
            builder = builder.user(user, password);
        }

        if let Some(keyspace) = params.keyspace() {
            builder = builder.use_keyspace(keyspace, false);
        }

        let profile = ExecutionProfile::builder()
            .consistency(params.consistency_level().into())
            .build();
        builder = builder.default_execution_profile_handle(profile.into_handle());

        let session = builder
            .build()
            .await
            .map_err(|e| ConnectionError::ConnectionFailed {
                hosts: contact_points.clone(),
                message: e.to_string(),
            })?;

        info!(hosts = %contact_points, "connected to cluster");
        Ok(ScyllaSession::new(session, contact_points))
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConnectionError> {
    let unknown = |message: String| ConnectionError::UnknownHost {
        host: host.to_string(),
        message,
    };

    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| unknown(e.to_string()))?
        .next()
        .ok_or_else(|| unknown("no address found".to_string()))
}

/// Live driver session.
pub struct ScyllaSession {
    /// Taken out on close
    session: RwLock<Option<Session>>,
    /// Prepared statements by handle id
    prepared: Mutex<HashMap<u64, PreparedStatement>>,
    next_id: AtomicU64,
    contact_points: String,
}

impl ScyllaSession {
    /// Wrap an established driver session.
    pub fn new(session: Session, contact_points: String) -> Self {
        Self {
            session: RwLock::new(Some(session)),
            prepared: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            contact_points,
        }
    }

    async fn prepared_statement(&self, id: u64) -> Result<PreparedStatement, TransportError> {
        self.prepared
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(TransportError::UnknownPrepared(id))
    }
}

impl fmt::Debug for ScyllaSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScyllaSession")
            .field("contact_points", &self.contact_points)
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[async_trait]
impl CqlSession for ScyllaSession {
    async fn execute(
        &self,
        cql: &str,
        consistency: ConsistencyLevel,
    ) -> Result<QueryResult, TransportError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(TransportError::Closed)?;

        let mut statement = Statement::new(cql);
        statement.set_consistency(consistency.into());

        let result = session
            .query_unpaged(statement, &[])
            .await
            .map_err(map_execution_error)?;
        convert_result(result)
    }

    async fn prepare(
        &self,
        cql: &str,
        consistency: ConsistencyLevel,
    ) -> Result<PreparedHandle, TransportError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(TransportError::Closed)?;

        let mut prepared = session.prepare(cql).await.map_err(map_prepare_error)?;
        prepared.set_consistency(consistency.into());

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let param_count = prepared.get_variable_col_specs().len();
        self.prepared.lock().await.insert(id, prepared);

        debug!(id, param_count, "prepared statement");
        Ok(PreparedHandle {
            id,
            cql: cql.to_string(),
            param_count,
            consistency,
        })
    }

    async fn execute_prepared(
        &self,
        handle: &PreparedHandle,
        values: Vec<Option<CqlValue>>,
    ) -> Result<QueryResult, TransportError> {
        let prepared = self.prepared_statement(handle.id).await?;

        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(TransportError::Closed)?;

        let result = session
            .execute_unpaged(&prepared, values)
            .await
            .map_err(map_execution_error)?;
        convert_result(result)
    }

    async fn batch(
        &self,
        entries: &[BatchEntry],
        consistency: ConsistencyLevel,
    ) -> Result<(), TransportError> {
        let mut batch = Batch::new(BatchType::Logged);
        batch.set_consistency(consistency.into());

        let mut values: Vec<Vec<Option<CqlValue>>> = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                BatchEntry::Text(cql) => {
                    batch.append_statement(Statement::new(cql.as_str()));
                    values.push(Vec::new());
                }
                BatchEntry::Prepared { id, values: bound } => {
                    batch.append_statement(self.prepared_statement(*id).await?);
                    values.push(bound.clone());
                }
            }
        }

        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(TransportError::Closed)?;

        session
            .batch(&batch, values)
            .await
            .map_err(map_execution_error)?;
        Ok(())
    }

    async fn unprepare(&self, id: u64) -> Result<(), TransportError> {
        self.prepared
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(TransportError::UnknownPrepared(id))
    }

    fn keyspace(&self) -> Option<String> {
        let guard = self.session.try_read().ok()?;
        guard
            .as_ref()
            .and_then(|session| session.get_keyspace())
            .map(|keyspace| keyspace.to_string())
    }

    async fn close(&self) -> Result<(), TransportError> {
        let session = self
            .session
            .write()
            .await
            .take()
            .ok_or(TransportError::Closed)?;

        self.prepared.lock().await.clear();
        drop(session);
        info!(hosts = %self.contact_points, "session released");
        info!(hosts = %self.contact_points, "cluster handle released");
        Ok(())
    }
}

/// Classify a driver result as row-producing or not.
fn convert_result(result: DriverResult) -> Result<QueryResult, TransportError> {
    if !result.is_rows() {
        return Ok(QueryResult::Void);
    }

    let rows_result = result
        .into_rows_result()
        .map_err(|e| TransportError::Execution(e.to_string()))?;

    let columns = rows_result
        .column_specs()
        .iter()
        .map(|spec| ColumnInfo::new(spec.name(), format!("{:?}", spec.typ())))
        .collect();

    let rows = rows_result
        .rows::<Row>()
        .map_err(|e| TransportError::Execution(e.to_string()))?
        .map(|row| row.map(|row| row.columns))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TransportError::Execution(e.to_string()))?;

    Ok(QueryResult::Rows(RawRows { columns, rows }))
}

/// Error text reported by the cluster itself, if the attempt reached it.
fn server_message(err: &RequestAttemptError) -> Option<&str> {
    match err {
        RequestAttemptError::DbError(_, message) => Some(message.as_str()),
        _ => None,
    }
}

fn is_syntax_error(err: &RequestAttemptError) -> bool {
    matches!(err, RequestAttemptError::DbError(DbError::SyntaxError, _))
}

fn classify(attempt: Option<&RequestAttemptError>, fallback: String) -> (bool, String) {
    match attempt {
        Some(attempt) => (
            is_syntax_error(attempt),
            server_message(attempt)
                .map(str::to_string)
                .unwrap_or(fallback),
        ),
        None => (false, fallback),
    }
}

fn first_prepare_attempt(err: &PrepareError) -> Option<&RequestAttemptError> {
    match err {
        PrepareError::AllAttemptsFailed { first_attempt } => Some(first_attempt),
        _ => None,
    }
}

fn map_execution_error(err: ExecutionError) -> TransportError {
    let attempt = match &err {
        ExecutionError::LastAttemptError(attempt) => Some(attempt),
        ExecutionError::PrepareError(prepare) => first_prepare_attempt(prepare),
        _ => None,
    };
    let (syntax, message) = classify(attempt, err.to_string());
    if syntax {
        TransportError::Syntax(message)
    } else {
        TransportError::Execution(message)
    }
}

fn map_prepare_error(err: PrepareError) -> TransportError {
    let (syntax, message) = classify(first_prepare_attempt(&err), err.to_string());
    if syntax {
        TransportError::Syntax(message)
    } else {
        TransportError::Prepare(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_syntax_error_is_classified() {
        let err = ExecutionError::LastAttemptError(RequestAttemptError::DbError(
            DbError::SyntaxError,
            "line 1:0 no viable alternative at input 'SELEC'".to_string(),
        ));
        match map_execution_error(err) {
            TransportError::Syntax(message) => {
                assert_eq!(message, "line 1:0 no viable alternative at input 'SELEC'")
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_other_db_error_keeps_server_message() {
        let err = ExecutionError::LastAttemptError(RequestAttemptError::DbError(
            DbError::Invalid,
            "Keyspace nope does not exist".to_string(),
        ));
        match map_execution_error(err) {
            TransportError::Execution(message) => assert_eq!(message, "Keyspace nope does not exist"),
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[test]
    fn test_prepare_syntax_error_is_classified() {
        let err = PrepareError::AllAttemptsFailed {
            first_attempt: RequestAttemptError::DbError(DbError::SyntaxError, "bad".to_string()),
        };
        assert!(matches!(map_prepare_error(err), TransportError::Syntax(m) if m == "bad"));
    }

    #[tokio::test]
    async fn test_unknown_host() {
        let params = ConnectionParams::from_str("jdbc:cassandra://no-such-host.invalid/").unwrap();
        let result = ClusterFactory::connect(&params, &KeyStoreConfig::default()).await;
        assert!(matches!(
            result,
            Err(ConnectionError::UnknownHost { host, .. }) if host == "no-such-host.invalid"
        ));
    }

    #[tokio::test]
    async fn test_unreadable_keystore_fails_before_connecting() {
        let params = ConnectionParams::from_str(
            "jdbc:cassandra://127.0.0.1:9042/?sslenabled=true&verifyServerCertificate=false",
        )
        .unwrap();
        let keystore = KeyStoreConfig::new(Some("/definitely/not/here.p12"), None, None);
        let result = ClusterFactory::connect(&params, &keystore).await;
        assert!(matches!(result, Err(ConnectionError::Tls(_))));
    }
}
