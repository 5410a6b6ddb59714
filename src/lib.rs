//! # cassandra-dbc
//!
//! Blocking connection/statement/result-set client for Apache Cassandra.
//!
//! This library adapts a tunable-consistency, transaction-less cluster to the
//! client shape relational database tools expect. Connection strings use the
//! `jdbc:cassandra://` scheme, statements accept the client-side
//! `CONSISTENCY` commands known from `cqlsh`, and batches run as one logged
//! unit.
//!
//! ## Example
//!
//! ```no_run
//! # use cassandra_dbc::*;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create driver and open database
//! let driver = Driver::new();
//! let database = driver.open("jdbc:cassandra://node1,node2:9042/shop?user=app&password=secret", None)?;
//!
//! // Connect to the cluster
//! let connection = database.connect()?;
//!
//! // Raise the consistency level for this connection
//! let mut stmt = connection.create_statement()?;
//! stmt.execute("CONSISTENCY QUORUM")?;
//!
//! // Execute a query
//! let mut rows = stmt.execute_query("SELECT id, total FROM orders")?;
//! while rows.next_row() {
//!     println!("{:?} {:?}", rows.get_string(0)?, rows.get_string(1)?);
//! }
//!
//! // Close connection
//! connection.close()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod query;
pub mod runtime;
pub mod transport;
pub mod types;

// Re-export public API
pub use client::{Connection, Database, Driver, Operation, PropertyInfo};
pub use connection::{ConnectionParams, KeyStoreConfig, Properties};
pub use error::{ConnectionError, DriverError, ErrorCode, QueryError, TransportError};
pub use query::{BatchStatus, PreparedStatement, ResultSet, Statement};
pub use types::{ConsistencyLevel, Parameter};
