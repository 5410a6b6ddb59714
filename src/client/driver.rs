//! Driver entry point.
//!
//! This module provides the `Driver` type which carries metadata about the
//! cassandra-dbc driver, advertises its connection properties and serves as
//! a factory for `Database` instances.

use crate::client::{Connection, Database};
use crate::connection::params::{keys, Properties, URI_PREFIX};
use crate::error::ConnectionError;
use crate::types::ConsistencyLevel;

/// A user-facing connection property, as shown by database tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    /// Property key, as used in connection strings and property bags
    pub name: &'static str,
    /// Value used when the property is not set
    pub default: String,
    pub description: &'static str,
    /// Accepted values
    pub choices: Vec<&'static str>,
    pub required: bool,
}

const BOOLEAN_CHOICES: [&str; 2] = ["true", "false"];

/// Driver for Cassandra clusters.
///
/// # Example
///
/// ```
/// use cassandra_dbc::Driver;
///
/// let driver = Driver::new();
/// println!("Driver: {} v{}", driver.name(), driver.version());
/// assert!(driver.accepts_url("jdbc:cassandra://localhost/shop"));
/// ```
#[derive(Debug, Clone)]
pub struct Driver {
    name: String,
    version: String,
    vendor: String,
    description: String,
}

impl Driver {
    /// Create a new Driver instance.
    ///
    /// # Example
    ///
    /// ```
    /// use cassandra_dbc::Driver;
    ///
    /// let driver = Driver::new();
    /// assert_eq!(driver.name(), "cassandra-dbc");
    /// ```
    pub fn new() -> Self {
        Self {
            name: "cassandra-dbc".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            vendor: "cassandra-dbc contributors".to_string(),
            description: "Relational-style client driver for Apache Cassandra".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version string from the Cargo.toml.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn major_version(&self) -> u32 {
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or_default()
    }

    pub fn minor_version(&self) -> u32 {
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or_default()
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the connection string is meant for this driver.
    ///
    /// Only the prefix is checked; the rest is validated on open.
    pub fn accepts_url(&self, url: &str) -> bool {
        url.starts_with(URI_PREFIX)
    }

    /// Connection properties understood by the driver, with defaults and
    /// accepted values.
    pub fn property_info(&self) -> Vec<PropertyInfo> {
        vec![
            PropertyInfo {
                name: keys::SSL_ENABLED,
                default: "false".to_string(),
                description: "Enable ssl.",
                choices: BOOLEAN_CHOICES.to_vec(),
                required: false,
            },
            PropertyInfo {
                name: keys::VERIFY_SERVER_CERTIFICATE,
                default: "true".to_string(),
                description: "Configure a connection that uses SSL but does not verify the identity of the server.",
                choices: BOOLEAN_CHOICES.to_vec(),
                required: false,
            },
            PropertyInfo {
                name: keys::CONSISTENCY_LEVEL,
                default: ConsistencyLevel::default().name().to_string(),
                description: "Consistency level determines how many nodes in the replica must respond for the coordinator node to successfully process a non-lightweight transaction.",
                choices: ConsistencyLevel::ALL.iter().map(|level| level.name()).collect(),
                required: false,
            },
        ]
    }

    /// Open a database connection factory.
    ///
    /// # Arguments
    ///
    /// * `url` - Connection string in the format:
    ///   `jdbc:cassandra://host1[:port][,host2...]/[keyspace[.table]][?opt=val&...]`
    /// * `properties` - Overrides for the connection string options
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` if the connection string is invalid.
    pub fn open(
        &self,
        url: &str,
        properties: Option<&Properties>,
    ) -> Result<Database, ConnectionError> {
        Database::parse(url, properties)
    }

    /// Parse the connection string and connect in one step.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cassandra_dbc::Driver;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let connection = Driver::new().connect(
    ///     "jdbc:cassandra://node1,node2:9042/shop?consistencyLevel=QUORUM",
    ///     None,
    /// )?;
    /// connection.close()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn connect(
        &self,
        url: &str,
        properties: Option<&Properties>,
    ) -> Result<Connection, ConnectionError> {
        self.open(url, properties)?.connect()
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} ({})", self.name, self.version, self.vendor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_creation() {
        let driver = Driver::new();
        assert_eq!(driver.name(), "cassandra-dbc");
        assert_eq!(driver.vendor(), "cassandra-dbc contributors");
        assert!(!driver.version().is_empty());
        assert!(!driver.description().is_empty());
        assert_eq!(
            driver.version(),
            format!(
                "{}.{}.{}",
                driver.major_version(),
                driver.minor_version(),
                env!("CARGO_PKG_VERSION_PATCH")
            )
        );
    }

    #[test]
    fn test_driver_display() {
        let display = Driver::default().to_string();
        assert!(display.contains("cassandra-dbc"));
        assert!(display.contains("contributors"));
    }

    #[test]
    fn test_accepts_url_checks_prefix_only() {
        let driver = Driver::new();
        assert!(driver.accepts_url("jdbc:cassandra://localhost"));
        assert!(driver.accepts_url("jdbc:cassandra://"));
        assert!(!driver.accepts_url("jdbc:postgresql://localhost"));
        assert!(!driver.accepts_url("cassandra://localhost"));
    }

    #[test]
    fn test_open_valid() {
        let driver = Driver::new();
        let database = driver
            .open("jdbc:cassandra://localhost:9142/shop", None)
            .unwrap();
        assert_eq!(database.params().keyspace(), Some("shop"));
        assert_eq!(database.params().effective_port(), 9142);
    }

    #[test]
    fn test_open_invalid() {
        let driver = Driver::new();
        assert!(matches!(
            driver.open("jdbc:mysql://localhost", None),
            Err(ConnectionError::InvalidUri(_))
        ));
    }

    #[test]
    fn test_property_info() {
        let info = Driver::new().property_info();
        assert_eq!(info.len(), 3);

        assert_eq!(info[0].name, "sslenabled");
        assert_eq!(info[0].default, "false");
        assert_eq!(info[0].description, "Enable ssl.");
        assert_eq!(info[0].choices, vec!["true", "false"]);

        assert_eq!(info[1].name, "verifyServerCertificate");
        assert_eq!(info[1].default, "true");

        assert_eq!(info[2].name, "consistencyLevel");
        assert_eq!(info[2].default, "LOCAL_ONE");
        assert_eq!(info[2].choices.len(), 11);
        assert_eq!(info[2].choices[0], "ALL");
        assert_eq!(info[2].choices[10], "LOCAL_SERIAL");
        assert!(info.iter().all(|p| !p.required));
    }
}
