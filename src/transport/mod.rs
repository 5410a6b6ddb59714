//! Transport layer for Cassandra cluster communication.
//!
//! This module provides the session protocol abstraction and its
//! implementation over the scylla driver.
//!
//! # Architecture
//!
//! The transport layer is organized into:
//! - `protocol` - Session protocol trait and result types
//! - `cluster` - Driver-backed session and the cluster factory
//!
//! # Example
//!
//! ```no_run
//! use cassandra_dbc::connection::{ConnectionParams, KeyStoreConfig};
//! use cassandra_dbc::transport::{ClusterFactory, CqlSession};
//! use cassandra_dbc::types::ConsistencyLevel;
//! use std::str::FromStr;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParams::from_str("jdbc:cassandra://localhost:9042/system")?;
//! let session = ClusterFactory::connect(&params, &KeyStoreConfig::from_env()).await?;
//!
//! let result = session
//!     .execute("SELECT release_version FROM local", ConsistencyLevel::One)
//!     .await?;
//! assert!(result.is_rows());
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod protocol;

// Re-export commonly used types
pub use cluster::{ClusterFactory, ScyllaSession};
pub use protocol::{BatchEntry, ColumnInfo, CqlSession, PreparedHandle, QueryResult, RawRows};
