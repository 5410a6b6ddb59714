//! Connection configuration for Cassandra clusters.
//!
//! This module provides connection string parsing, TLS trust configuration,
//! and the per-connection state shared by statements.
//!
//! # Example
//!
//! ```
//! # use cassandra_dbc::connection::{ConnectionBuilder, ConnectionParams};
//! # use cassandra_dbc::types::ConsistencyLevel;
//! # use std::str::FromStr;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Using ConnectionBuilder
//! let params = ConnectionBuilder::new()
//!     .host("node1")
//!     .host("node2")
//!     .port(9042)
//!     .keyspace("shop")
//!     .consistency_level(ConsistencyLevel::Quorum)
//!     .build()?;
//!
//! // Or parse from connection string
//! let params = ConnectionParams::from_str(
//!     "jdbc:cassandra://node1,node2:9042/shop?consistencyLevel=QUORUM"
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod params;
pub mod session;
pub mod tls;

pub use params::{ConnectionBuilder, ConnectionParams, Properties, DEFAULT_PORT, URI_PREFIX};
pub use session::SessionState;
pub use tls::{build_ssl_context, KeyStoreConfig, TlsMode};
