//! Common test utilities for cassandra-dbc integration tests.
//!
//! # Integration Test Prerequisites
//!
//! These integration tests require a running Cassandra node:
//!
//! ```bash
//! docker run -d --name cassandra-test -p 9042:9042 cassandra:4.1
//! ```
//!
//! Wait for the node to be ready (may take a minute on first run):
//!
//! ```bash
//! docker logs cassandra-test 2>&1 | grep -i "Starting listening for CQL clients"
//! ```
//!
//! # Configuration
//!
//! | Default Constant   | Environment Variable  | Default Value |
//! |--------------------|-----------------------|---------------|
//! | `DEFAULT_HOST`     | `CASSANDRA_HOST`      | "localhost"   |
//! | `DEFAULT_PORT`     | `CASSANDRA_PORT`      | 9042          |
//! | `DEFAULT_USER`     | `CASSANDRA_USER`      | "cassandra"   |
//! | `DEFAULT_PASSWORD` | `CASSANDRA_PASSWORD`  | "cassandra"   |
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration_tests -- --ignored
//! CASSANDRA_HOST=10.0.0.5 cargo test --test integration_tests -- --ignored
//! ```

#![allow(dead_code)]

use cassandra_dbc::{Connection, ConnectionError, Driver};
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9042;
pub const DEFAULT_USER: &str = "cassandra";
pub const DEFAULT_PASSWORD: &str = "cassandra";

const ENV_CASSANDRA_HOST: &str = "CASSANDRA_HOST";
const ENV_CASSANDRA_PORT: &str = "CASSANDRA_PORT";
const ENV_CASSANDRA_USER: &str = "CASSANDRA_USER";
const ENV_CASSANDRA_PASSWORD: &str = "CASSANDRA_PASSWORD";

pub fn get_host() -> String {
    env::var(ENV_CASSANDRA_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string())
}

/// Falls back to the default on an unparsable value.
pub fn get_port() -> u16 {
    env::var(ENV_CASSANDRA_PORT)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn get_user() -> String {
    env::var(ENV_CASSANDRA_USER).unwrap_or_else(|_| DEFAULT_USER.to_string())
}

pub fn get_password() -> String {
    env::var(ENV_CASSANDRA_PASSWORD).unwrap_or_else(|_| DEFAULT_PASSWORD.to_string())
}

/// Build a connection string for the given node and optional keyspace.
pub fn connection_string(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    keyspace: Option<&str>,
) -> String {
    format!(
        "jdbc:cassandra://{}:{}/{}?user={}&password={}",
        host,
        port,
        keyspace.unwrap_or_default(),
        urlencoding::encode(user),
        urlencoding::encode(password)
    )
}

/// Connection string for the configured node.
pub fn get_test_connection_string(keyspace: Option<&str>) -> String {
    connection_string(
        &get_host(),
        get_port(),
        &get_user(),
        &get_password(),
        keyspace,
    )
}

/// Connect to the configured node, optionally logged into a keyspace.
pub fn get_test_connection(keyspace: Option<&str>) -> Result<Connection, ConnectionError> {
    Driver::new().connect(&get_test_connection_string(keyspace), None)
}

/// Whether the configured node accepts TCP connections.
pub fn is_cassandra_available() -> bool {
    let addr = format!("{}:{}", get_host(), get_port());
    let Ok(addrs) = addr.to_socket_addrs() else {
        return false;
    };
    addrs
        .into_iter()
        .any(|socket_addr| TcpStream::connect_timeout(&socket_addr, Duration::from_secs(2)).is_ok())
}

/// Return early from a test when no node is reachable.
#[macro_export]
macro_rules! skip_if_no_cassandra {
    () => {
        if !$crate::common::is_cassandra_available() {
            eprintln!(
                "Skipping test: Cassandra not available at {}:{}",
                $crate::common::get_host(),
                $crate::common::get_port()
            );
            return;
        }
    };
}

/// Unique keyspace name for one test run.
pub fn generate_test_keyspace_name() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("test_integration_{}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_HOST, "localhost");
        assert_eq!(DEFAULT_PORT, 9042);
        assert_eq!(DEFAULT_USER, "cassandra");
        assert_eq!(DEFAULT_PASSWORD, "cassandra");
    }

    #[test]
    fn test_connection_string_format() {
        assert_eq!(
            connection_string("db1", 9142, "app", "p@ss", Some("shop")),
            "jdbc:cassandra://db1:9142/shop?user=app&password=p%40ss"
        );
        assert_eq!(
            connection_string("db1", 9042, "app", "x", None),
            "jdbc:cassandra://db1:9042/?user=app&password=x"
        );
    }

    #[test]
    fn test_generate_test_keyspace_name() {
        let name = generate_test_keyspace_name();
        assert!(name.starts_with("test_integration_"));
        assert!(name.len() > "test_integration_".len());
    }
}
