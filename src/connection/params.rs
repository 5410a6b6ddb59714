//! Connection string parsing and validation.
//!
//! This module turns a `jdbc:cassandra://` connection string plus an optional
//! property bag into an immutable [`ConnectionParams`] value.

use crate::error::ConnectionError;
use crate::types::ConsistencyLevel;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Required connection string prefix.
pub const URI_PREFIX: &str = "jdbc:cassandra://";

/// Port used when no host entry carries one.
pub const DEFAULT_PORT: u16 = 9042;

/// Caller-supplied overrides, keyed like the connection string options.
pub type Properties = HashMap<String, String>;

/// Option and property names understood by the parser.
pub mod keys {
    pub const USER: &str = "user";
    pub const PASSWORD: &str = "password";
    pub const SSL_ENABLED: &str = "sslenabled";
    pub const VERIFY_SERVER_CERTIFICATE: &str = "verifyServerCertificate";
    pub const CONSISTENCY_LEVEL: &str = "consistencyLevel";
    pub const RETURN_NULL_STRINGS_FROM_INTRO_QUERY: &str = "returnNullStringsFromIntroQuery";
}

/// Connection configuration for a cluster.
///
/// Created once per connect call and never mutated afterwards.
#[derive(Clone)]
pub struct ConnectionParams {
    /// Raw `host[:port]` entries, in connection string order
    hosts: Vec<String>,
    /// Host names with any port suffix removed
    host_names: Vec<String>,
    /// Shared port (last port found on any host entry)
    port: Option<u16>,
    keyspace: Option<String>,
    table: Option<String>,
    username: Option<String>,
    /// Never logged or displayed
    password: Option<String>,
    ssl_enabled: bool,
    verify_server_certificate: bool,
    consistency_level: ConsistencyLevel,
    return_null_strings_from_intro_query: bool,
    /// Connection string as given by the caller
    uri: String,
}

impl ConnectionParams {
    /// Parse a connection string, letting `properties` override its options.
    ///
    /// Format:
    /// `jdbc:cassandra://host1[:port][,host2...]/[keyspace[.table]][?opt=val[&opt=val...]]`
    ///
    /// # Examples
    ///
    /// ```
    /// # use cassandra_dbc::connection::{ConnectionParams, Properties};
    /// let mut props = Properties::new();
    /// props.insert("user".to_string(), "admin".to_string());
    ///
    /// let params = ConnectionParams::parse(
    ///     "jdbc:cassandra://node1:9042,node2/shop.orders?user=guest&consistencyLevel=quorum",
    ///     Some(&props),
    /// )?;
    /// assert_eq!(params.hosts().len(), 2);
    /// assert_eq!(params.username(), Some("admin"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(uri: &str, properties: Option<&Properties>) -> Result<Self, ConnectionError> {
        let rest = uri.strip_prefix(URI_PREFIX).ok_or_else(|| {
            ConnectionError::InvalidUri(format!("URI needs to start with {}", URI_PREFIX))
        })?;

        // Server part and namespace part are split on the last slash
        let (server_part, ns_part, options) = match rest.rfind('/') {
            None => {
                if rest.contains('?') {
                    return Err(ConnectionError::InvalidUri(
                        "URI contains options without trailing slash".to_string(),
                    ));
                }
                (rest, None, HashMap::new())
            }
            Some(pos) => {
                let ns = &rest[pos + 1..];
                match ns.split_once('?') {
                    Some((ns, query)) => (&rest[..pos], Some(ns), parse_options(query)),
                    None => (&rest[..pos], Some(ns), HashMap::new()),
                }
            }
        };

        let option = |name: &str| lookup_option(properties, &options, name);

        let mut builder = ConnectionBuilder::new()
            .ssl_enabled(option(keys::SSL_ENABLED).is_some_and(is_true))
            .verify_server_certificate(
                option(keys::VERIFY_SERVER_CERTIFICATE).map_or(true, is_true),
            )
            .consistency_level(ConsistencyLevel::resolve_or_default(option(
                keys::CONSISTENCY_LEVEL,
            )))
            .return_null_strings_from_intro_query(
                option(keys::RETURN_NULL_STRINGS_FROM_INTRO_QUERY).is_some_and(is_true),
            );

        if let Some(user) = option(keys::USER) {
            builder = builder.username(user);
        }
        if let Some(password) = option(keys::PASSWORD) {
            builder = builder.password(password);
        }

        for host in server_part.split(',') {
            builder = builder.host(host);
        }

        if let Some(ns) = ns_part.filter(|ns| !ns.is_empty()) {
            builder = match ns.split_once('.') {
                Some((keyspace, table)) => builder.keyspace(keyspace).table(table),
                None => builder.keyspace(ns),
            };
        }

        let mut params = builder.build()?;
        params.uri = uri.to_string();
        Ok(params)
    }

    /// Create a new ConnectionBuilder.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// Raw `host[:port]` entries in connection string order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Host names without port suffixes.
    pub fn host_names(&self) -> &[String] {
        &self.host_names
    }

    /// Port shared by every contact point, if one was given.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Port that will actually be dialed.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Keyspace the session is bound to.
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// Table named after the keyspace (`keyspace.table`).
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Get the password (for internal use only, never logged).
    pub(crate) fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn ssl_enabled(&self) -> bool {
        self.ssl_enabled
    }

    pub fn verify_server_certificate(&self) -> bool {
        self.verify_server_certificate
    }

    /// Initial consistency level of connections opened with these parameters.
    pub fn consistency_level(&self) -> ConsistencyLevel {
        self.consistency_level
    }

    /// Whether the legacy column introspection query returns real nulls.
    pub fn return_null_strings_from_intro_query(&self) -> bool {
        self.return_null_strings_from_intro_query
    }

    /// Credentials are applied only with a non-empty user and a password.
    pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username(), self.password()) {
            (Some(user), Some(password)) if !user.is_empty() => Some((user, password)),
            _ => None,
        }
    }

    /// The connection string as supplied (may contain secrets).
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl FromStr for ConnectionParams {
    type Err = ConnectionError;

    /// Parse a connection string without property overrides.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, None)
    }
}

// Prevent password from being displayed in debug or display output
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("hosts", &self.hosts)
            .field("port", &self.port)
            .field("keyspace", &self.keyspace)
            .field("table", &self.table)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("ssl_enabled", &self.ssl_enabled)
            .field("verify_server_certificate", &self.verify_server_certificate)
            .field("consistency_level", &self.consistency_level)
            .finish()
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", URI_PREFIX, self.hosts.join(","))?;
        if let Some(keyspace) = &self.keyspace {
            write!(f, "/{}", keyspace)?;
            if let Some(table) = &self.table {
                write!(f, ".{}", table)?;
            }
        }
        Ok(())
    }
}

/// Builder for constructing ConnectionParams with validation.
#[derive(Debug, Clone, Default)]
pub struct ConnectionBuilder {
    hosts: Vec<String>,
    port: Option<u16>,
    keyspace: Option<String>,
    table: Option<String>,
    username: Option<String>,
    password: Option<String>,
    ssl_enabled: Option<bool>,
    verify_server_certificate: Option<bool>,
    consistency_level: Option<ConsistencyLevel>,
    return_null_strings_from_intro_query: Option<bool>,
}

impl ConnectionBuilder {
    /// Create a new ConnectionBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contact point, optionally suffixed with `:port`.
    pub fn host(mut self, host: &str) -> Self {
        self.hosts.push(host.to_string());
        self
    }

    /// Set the port shared by all contact points.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn keyspace(mut self, keyspace: &str) -> Self {
        self.keyspace = Some(keyspace.to_string());
        self
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Enable or disable TLS.
    pub fn ssl_enabled(mut self, enabled: bool) -> Self {
        self.ssl_enabled = Some(enabled);
        self
    }

    /// Enable or disable server certificate verification (TLS only).
    pub fn verify_server_certificate(mut self, verify: bool) -> Self {
        self.verify_server_certificate = Some(verify);
        self
    }

    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = Some(level);
        self
    }

    pub fn return_null_strings_from_intro_query(mut self, enabled: bool) -> Self {
        self.return_null_strings_from_intro_query = Some(enabled);
        self
    }

    /// Build the ConnectionParams with validation.
    pub fn build(self) -> Result<ConnectionParams, ConnectionError> {
        if self.hosts.is_empty() {
            return Err(ConnectionError::InvalidParameter {
                parameter: "host".to_string(),
                message: "At least one host is required".to_string(),
            });
        }

        let mut port = self.port;
        let mut host_names = Vec::with_capacity(self.hosts.len());
        for entry in &self.hosts {
            let (host, entry_port) = parse_host_port(entry)?;
            if host.is_empty() {
                return Err(ConnectionError::InvalidParameter {
                    parameter: "host".to_string(),
                    message: format!("Empty host name in '{}'", entry),
                });
            }
            // One port per cluster: the last one given wins
            if entry_port.is_some() {
                port = entry_port;
            }
            host_names.push(host);
        }

        if port == Some(0) {
            return Err(ConnectionError::InvalidParameter {
                parameter: "port".to_string(),
                message: "Port must be greater than 0".to_string(),
            });
        }

        let uri = {
            let mut uri = format!("{}{}/", URI_PREFIX, self.hosts.join(","));
            if let Some(keyspace) = &self.keyspace {
                uri.push_str(keyspace);
            }
            uri
        };

        Ok(ConnectionParams {
            hosts: self.hosts,
            host_names,
            port,
            keyspace: self.keyspace,
            table: self.table,
            username: self.username,
            password: self.password,
            ssl_enabled: self.ssl_enabled.unwrap_or(false),
            verify_server_certificate: self.verify_server_certificate.unwrap_or(true),
            consistency_level: self.consistency_level.unwrap_or_default(),
            return_null_strings_from_intro_query: self
                .return_null_strings_from_intro_query
                .unwrap_or(false),
            uri,
        })
    }
}

/// Parse the option block after `?`.
///
/// Pairs are separated by `&` or `;`, keys are lowercased, and a repeated key
/// keeps its last value. Tokens without `=` are ignored.
fn parse_options(query: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();

    for pair in query.split(['&', ';']) {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        options.insert(key.to_lowercase(), value);
    }

    options
}

/// Property bag first, then connection string options.
fn lookup_option<'a>(
    properties: Option<&'a Properties>,
    options: &'a HashMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    properties
        .and_then(|props| {
            props
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
        .or_else(|| options.get(&name.to_lowercase()).map(String::as_str))
}

/// `"1"` or `"true"` in any case.
pub(crate) fn is_true(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Parse host and optional port.
fn parse_host_port(entry: &str) -> Result<(String, Option<u16>), ConnectionError> {
    let entry = entry.trim();

    // IPv6 address format [host]:port
    if let Some(stripped) = entry.strip_prefix('[') {
        if let Some(close_bracket) = stripped.find(']') {
            let host = stripped[..close_bracket].to_string();
            let port = match stripped[close_bracket + 1..].strip_prefix(':') {
                Some(port) => Some(parse_port(port)?),
                None => None,
            };
            return Ok((host, port));
        }
    }

    match entry.split_once(':') {
        Some((host, port)) => Ok((host.trim().to_string(), Some(parse_port(port)?))),
        None => Ok((entry.to_string(), None)),
    }
}

fn parse_port(port: &str) -> Result<u16, ConnectionError> {
    port.trim()
        .parse()
        .map_err(|_| ConnectionError::InvalidParameter {
            parameter: "port".to_string(),
            message: format!("Invalid port: {}", port),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_uri_for_different_db() {
        let result = ConnectionParams::parse("jdbc:postgresql://localhost:54332/guest", None);
        assert!(matches!(result, Err(ConnectionError::InvalidUri(_))));
    }

    #[test]
    fn test_missing_prefix_always_fails() {
        for uri in ["", "localhost:9042", "cassandra://localhost/ks", "JDBC:CASSANDRA://h/"] {
            assert!(ConnectionParams::from_str(uri).is_err(), "{uri}");
        }
    }

    #[test]
    fn test_options_without_trailing_slash() {
        let result = ConnectionParams::parse("jdbc:cassandra://localhost:9042?name=cassandra", None);
        assert!(matches!(result, Err(ConnectionError::InvalidUri(msg)) if msg.contains("trailing slash")));
    }

    #[test]
    fn test_simple_uri() {
        let params = ConnectionParams::from_str("jdbc:cassandra://localhost:9042").unwrap();
        assert_eq!(params.hosts(), ["localhost:9042"]);
        assert_eq!(params.host_names(), ["localhost"]);
        assert_eq!(params.port(), Some(9042));
        assert_eq!(params.keyspace(), None);
        assert_eq!(params.uri(), "jdbc:cassandra://localhost:9042");
    }

    #[test]
    fn test_uri_with_user_name() {
        let params =
            ConnectionParams::from_str("jdbc:cassandra://localhost:9042/?user=cassandra").unwrap();
        assert_eq!(params.hosts(), ["localhost:9042"]);
        assert_eq!(params.username(), Some("cassandra"));
        assert_eq!(params.keyspace(), None);
    }

    #[test]
    fn test_options_in_properties_win() {
        let properties = props(&[
            ("user", "NameFromProperties"),
            ("password", "PasswordFromProperties"),
        ]);
        let params = ConnectionParams::parse(
            "jdbc:cassandra://localhost:9042/?user=cassandra&password=cassandra",
            Some(&properties),
        )
        .unwrap();
        assert_eq!(params.username(), Some("NameFromProperties"));
        assert_eq!(params.password(), Some("PasswordFromProperties"));
    }

    #[test]
    fn test_ssl_enabled_resolution() {
        let uri = "jdbc:cassandra://localhost:9042/?name=cassandra&password=cassandra";

        let on = ConnectionParams::parse(uri, Some(&props(&[("sslenabled", "TRUE")]))).unwrap();
        assert!(on.ssl_enabled());

        let off = ConnectionParams::parse(uri, Some(&props(&[("sslenabled", "false")]))).unwrap();
        assert!(!off.ssl_enabled());

        let unset = ConnectionParams::parse(uri, Some(&Properties::new())).unwrap();
        assert!(!unset.ssl_enabled());

        let numeric = ConnectionParams::from_str("jdbc:cassandra://h/?sslenabled=1").unwrap();
        assert!(numeric.ssl_enabled());
    }

    #[test]
    fn test_verify_server_certificate_defaults_to_true() {
        let params = ConnectionParams::from_str("jdbc:cassandra://h/").unwrap();
        assert!(params.verify_server_certificate());

        let params =
            ConnectionParams::from_str("jdbc:cassandra://h/?verifyservercertificate=false")
                .unwrap();
        assert!(!params.verify_server_certificate());
    }

    #[test]
    fn test_consistency_level() {
        let params =
            ConnectionParams::from_str("jdbc:cassandra://localhost:9042/?consistencyLevel=serial")
                .unwrap();
        assert_eq!(params.consistency_level(), ConsistencyLevel::Serial);
    }

    #[test]
    fn test_unknown_consistency_level() {
        let params =
            ConnectionParams::from_str("jdbc:cassandra://localhost:9042/?consistencyLevel=unknown")
                .unwrap();
        assert_eq!(params.consistency_level(), ConsistencyLevel::LocalOne);
    }

    #[test]
    fn test_consistency_level_in_properties() {
        let params = ConnectionParams::parse(
            "jdbc:cassandra://localhost:9042/?",
            Some(&props(&[("consistencyLevel", "EACH_QUORUM")])),
        )
        .unwrap();
        assert_eq!(params.consistency_level(), ConsistencyLevel::EachQuorum);
    }

    #[test]
    fn test_multiple_hosts_keep_order_and_last_port_wins() {
        let params =
            ConnectionParams::from_str("jdbc:cassandra://a:9001,b,c:9003/ks").unwrap();
        assert_eq!(params.hosts(), ["a:9001", "b", "c:9003"]);
        assert_eq!(params.host_names(), ["a", "b", "c"]);
        assert_eq!(params.port(), Some(9003));
        assert_eq!(params.effective_port(), 9003);
    }

    #[test]
    fn test_default_port() {
        let params = ConnectionParams::from_str("jdbc:cassandra://a,b/").unwrap();
        assert_eq!(params.port(), None);
        assert_eq!(params.effective_port(), DEFAULT_PORT);
    }

    #[test]
    fn test_keyspace_and_table() {
        let params = ConnectionParams::from_str("jdbc:cassandra://h/shop.orders?user=u").unwrap();
        assert_eq!(params.keyspace(), Some("shop"));
        assert_eq!(params.table(), Some("orders"));

        let params = ConnectionParams::from_str("jdbc:cassandra://h/shop").unwrap();
        assert_eq!(params.keyspace(), Some("shop"));
        assert_eq!(params.table(), None);
    }

    #[test]
    fn test_repeated_option_last_wins_and_separators() {
        let params =
            ConnectionParams::from_str("jdbc:cassandra://h/?user=first;USER=second&flag").unwrap();
        assert_eq!(params.username(), Some("second"));
    }

    #[test]
    fn test_property_keys_are_case_insensitive() {
        let params = ConnectionParams::parse(
            "jdbc:cassandra://h/",
            Some(&props(&[("CONSISTENCYLEVEL", "two")])),
        )
        .unwrap();
        assert_eq!(params.consistency_level(), ConsistencyLevel::Two);
    }

    #[test]
    fn test_percent_encoded_password() {
        let params =
            ConnectionParams::from_str("jdbc:cassandra://h/?user=u&password=p%40ss").unwrap();
        assert_eq!(params.password(), Some("p@ss"));
        assert_eq!(params.credentials(), Some(("u", "p@ss")));
    }

    #[test]
    fn test_credentials_require_user_and_password() {
        let params = ConnectionParams::from_str("jdbc:cassandra://h/?user=u").unwrap();
        assert_eq!(params.credentials(), None);

        let params = ConnectionParams::from_str("jdbc:cassandra://h/?user=&password=p").unwrap();
        assert_eq!(params.credentials(), None);

        let params = ConnectionParams::from_str("jdbc:cassandra://h/?user=u&password=").unwrap();
        assert_eq!(params.credentials(), Some(("u", "")));
    }

    #[test]
    fn test_ipv6_host() {
        let params = ConnectionParams::from_str("jdbc:cassandra://[::1]:9142/").unwrap();
        assert_eq!(params.host_names(), ["::1"]);
        assert_eq!(params.port(), Some(9142));
    }

    #[test]
    fn test_invalid_port() {
        let result = ConnectionParams::from_str("jdbc:cassandra://h:abc/");
        assert!(matches!(
            result,
            Err(ConnectionError::InvalidParameter { parameter, .. }) if parameter == "port"
        ));
    }

    #[test]
    fn test_empty_host() {
        assert!(ConnectionParams::from_str("jdbc:cassandra:///ks").is_err());
        assert!(ConnectionParams::from_str("jdbc:cassandra://a,,b/ks").is_err());
    }

    #[test]
    fn test_builder() {
        let params = ConnectionBuilder::new()
            .host("db1")
            .host("db2")
            .port(9142)
            .keyspace("shop")
            .username("admin")
            .password("secret")
            .ssl_enabled(true)
            .consistency_level(ConsistencyLevel::Quorum)
            .build()
            .unwrap();

        assert_eq!(params.hosts(), ["db1", "db2"]);
        assert_eq!(params.port(), Some(9142));
        assert_eq!(params.keyspace(), Some("shop"));
        assert!(params.ssl_enabled());
        assert!(params.verify_server_certificate());
        assert_eq!(params.consistency_level(), ConsistencyLevel::Quorum);
        assert!(params.uri().starts_with(URI_PREFIX));
    }

    #[test]
    fn test_builder_requires_host() {
        let result = ConnectionBuilder::new().build();
        assert!(matches!(
            result.unwrap_err(),
            ConnectionError::InvalidParameter { parameter, .. } if parameter == "host"
        ));
    }

    #[test]
    fn test_display_no_password_leak() {
        let params =
            ConnectionParams::from_str("jdbc:cassandra://h1,h2/ks?user=u&password=super_secret")
                .unwrap();

        let display = format!("{}", params);
        assert_eq!(display, "jdbc:cassandra://h1,h2/ks");

        let debug = format!("{:?}", params);
        assert!(!debug.contains("super_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
