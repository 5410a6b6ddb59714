//! Blocking client surface: driver, connection factory and connection.
//!
//! This module follows the connection/statement/result-set shape that
//! relational database tools expect:
//! - `Driver` - metadata, accepted connection strings and property info
//! - `Database` - connection factory for one configuration
//! - `Connection` - an open cluster session
//! - `unsupported` - the parts of the contract Cassandra cannot honor

pub mod connection;
pub mod database;
pub mod driver;
pub mod unsupported;

pub use connection::Connection;
pub use database::Database;
pub use driver::{Driver, PropertyInfo};
pub use unsupported::{FetchDirection, Operation, TransactionIsolation};
