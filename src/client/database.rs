//! Connection factory.
//!
//! A `Database` holds parsed connection parameters and the keystore settings
//! and opens any number of independent connections from them.

use crate::client::Connection;
use crate::connection::params::{ConnectionParams, Properties};
use crate::connection::tls::KeyStoreConfig;
use crate::error::ConnectionError;
use std::str::FromStr;

/// Connection factory for one cluster configuration.
///
/// # Example
///
/// ```no_run
/// use cassandra_dbc::Database;
/// use std::str::FromStr;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let database = Database::from_str("jdbc:cassandra://localhost/shop?user=app&password=secret")?;
/// let connection = database.connect()?;
/// connection.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    params: ConnectionParams,
    keystore: KeyStoreConfig,
}

impl Database {
    /// Create a database from parameters; keystore settings come from the
    /// environment.
    ///
    /// # Example
    ///
    /// ```
    /// use cassandra_dbc::Database;
    /// use cassandra_dbc::connection::ConnectionBuilder;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let params = ConnectionBuilder::new()
    ///     .host("localhost")
    ///     .username("cassandra")
    ///     .password("cassandra")
    ///     .build()?;
    ///
    /// let database = Database::new(params);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            params,
            keystore: KeyStoreConfig::from_env(),
        }
    }

    /// Parse a connection string with optional property overrides.
    pub fn parse(url: &str, properties: Option<&Properties>) -> Result<Self, ConnectionError> {
        ConnectionParams::parse(url, properties).map(Self::new)
    }

    /// Replace the keystore settings read from the environment.
    pub fn with_keystore(mut self, keystore: KeyStoreConfig) -> Self {
        self.keystore = keystore;
        self
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn keystore(&self) -> &KeyStoreConfig {
        &self.keystore
    }

    /// Establish a connection to the cluster.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` if a host is unknown, TLS material cannot be
    /// loaded or no session could be opened.
    pub fn connect(&self) -> Result<Connection, ConnectionError> {
        Connection::open(self.params.clone(), &self.keystore)
    }

    /// Connect and immediately close again.
    pub fn test_connection(&self) -> Result<(), ConnectionError> {
        self.connect()?.close()
    }
}

impl FromStr for Database {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let database = Database::from_str("jdbc:cassandra://a,b:9043/ks").unwrap();
        assert_eq!(database.params().host_names(), ["a", "b"]);
        assert_eq!(database.params().effective_port(), 9043);
    }

    #[test]
    fn test_properties_override_uri() {
        let mut props = Properties::new();
        props.insert("CONSISTENCYLEVEL".to_string(), "all".to_string());
        let database =
            Database::parse("jdbc:cassandra://a/ks?consistencyLevel=ONE", Some(&props)).unwrap();
        assert_eq!(database.params().consistency_level().name(), "ALL");
    }

    #[test]
    fn test_with_keystore() {
        let database = Database::from_str("jdbc:cassandra://a")
            .unwrap()
            .with_keystore(KeyStoreConfig::new(Some("/etc/ks.p12"), None, None));
        assert_eq!(
            database.keystore().location.as_deref(),
            Some("file:/etc/ks.p12")
        );
        assert!(!format!("{:?}", database).contains("secret"));
    }

    #[test]
    fn test_invalid_uri() {
        assert!(Database::from_str("cassandra://a").is_err());
    }
}
