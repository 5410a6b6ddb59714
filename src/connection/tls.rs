//! TLS trust configuration for cluster connections.
//!
//! Two policies exist once TLS is enabled: verifying the server against the
//! system trust store, or accepting any server certificate (self-signed test
//! clusters) with an optional client keystore read from the environment.

use crate::connection::params::ConnectionParams;
use crate::error::ConnectionError;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::PKey;
use openssl::ssl::{SslContext, SslContextBuilder, SslMethod, SslVerifyMode};
use openssl::x509::X509;
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable naming the keystore location.
pub const KEYSTORE_ENV: &str = "CASSANDRA_SSL_KEYSTORE";
/// Environment variable naming the keystore format (`PKCS12` or `PEM`).
pub const KEYSTORE_TYPE_ENV: &str = "CASSANDRA_SSL_KEYSTORE_TYPE";
/// Environment variable holding the keystore password.
pub const KEYSTORE_PASSWORD_ENV: &str = "CASSANDRA_SSL_KEYSTORE_PASSWORD";

/// Keystore format used when none is configured.
pub const DEFAULT_KEYSTORE_TYPE: &str = "PKCS12";

/// Locator schemes recognized as already being resource locators.
const KNOWN_SCHEMES: [&str; 5] = ["file", "http", "https", "jar", "ftp"];

/// TLS policy selected from the connection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain TCP
    Disabled,
    /// Verify the server certificate chain
    Verify,
    /// Accept any server certificate
    TrustAll,
}

impl TlsMode {
    /// Pick the policy for a parsed configuration.
    pub fn for_params(params: &ConnectionParams) -> Self {
        match (params.ssl_enabled(), params.verify_server_certificate()) {
            (false, _) => TlsMode::Disabled,
            (true, true) => TlsMode::Verify,
            (true, false) => TlsMode::TrustAll,
        }
    }
}

/// Client key material for the permissive policy.
#[derive(Clone, Default)]
pub struct KeyStoreConfig {
    /// Keystore location as a resource locator (`file:/path/to/store.p12`)
    pub location: Option<String>,
    /// Keystore format
    pub store_type: String,
    /// Keystore password (never logged)
    password: String,
}

impl KeyStoreConfig {
    /// Create a keystore configuration; bare paths are coerced to `file:` locators.
    pub fn new(location: Option<&str>, store_type: Option<&str>, password: Option<&str>) -> Self {
        Self {
            location: location
                .filter(|l| !l.is_empty())
                .map(normalize_locator),
            store_type: store_type
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_KEYSTORE_TYPE)
                .to_string(),
            password: password.unwrap_or_default().to_string(),
        }
    }

    /// Read the keystore settings from the process environment.
    ///
    /// All three variables are optional.
    pub fn from_env() -> Self {
        let location = env::var(KEYSTORE_ENV).ok();
        let store_type = env::var(KEYSTORE_TYPE_ENV).ok();
        let password = env::var(KEYSTORE_PASSWORD_ENV).ok();
        Self::new(
            location.as_deref(),
            store_type.as_deref(),
            password.as_deref(),
        )
    }

    /// Filesystem path behind a `file:` locator.
    fn path(&self) -> Result<Option<PathBuf>, ConnectionError> {
        let Some(location) = &self.location else {
            return Ok(None);
        };
        let path = location.strip_prefix("file:").ok_or_else(|| {
            ConnectionError::Tls(format!("Unsupported keystore location: {}", location))
        })?;
        // file:///abs/path and file:/abs/path both name /abs/path
        let path = path.strip_prefix("//").unwrap_or(path);
        Ok(Some(PathBuf::from(path)))
    }
}

impl fmt::Debug for KeyStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStoreConfig")
            .field("location", &self.location)
            .field("store_type", &self.store_type)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Coerce a bare filesystem path to a `file:` locator.
pub fn normalize_locator(location: &str) -> String {
    let has_scheme = location
        .split_once(':')
        .is_some_and(|(scheme, _)| KNOWN_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()));
    if has_scheme {
        location.to_string()
    } else {
        format!("file:{}", location)
    }
}

/// Build the TLS context for a connection, if TLS is enabled.
///
/// Applied once per cluster handle, never per contact point.
pub fn build_ssl_context(
    params: &ConnectionParams,
    keystore: &KeyStoreConfig,
) -> Result<Option<SslContext>, ConnectionError> {
    let mode = TlsMode::for_params(params);
    info!(sslenabled = params.ssl_enabled(), ?mode, "selected TLS policy");

    match mode {
        TlsMode::Disabled => Ok(None),
        TlsMode::Verify => verifying_context().map(Some),
        TlsMode::TrustAll => trust_all_context(keystore).map(Some),
    }
}

/// Default certificate-verifying policy backed by the system trust store.
fn verifying_context() -> Result<SslContext, ConnectionError> {
    let mut builder = SslContext::builder(SslMethod::tls())?;
    builder.set_default_verify_paths()?;
    builder.set_verify(SslVerifyMode::PEER);
    Ok(builder.build())
}

/// Context that accepts any server certificate.
fn trust_all_context(keystore: &KeyStoreConfig) -> Result<SslContext, ConnectionError> {
    warn!("server certificate verification is disabled");

    let mut builder = SslContext::builder(SslMethod::tls())?;
    builder.set_verify(SslVerifyMode::NONE);

    if let Some(path) = keystore.path()? {
        let bytes = std::fs::read(&path).map_err(|e| {
            ConnectionError::Tls(format!(
                "Cannot read keystore {}: {}",
                path.display(),
                e
            ))
        })?;
        load_key_material(&mut builder, keystore, &bytes)?;
        info!(keystore = %path.display(), "loaded client key material");
    }

    Ok(builder.build())
}

fn load_key_material(
    builder: &mut SslContextBuilder,
    keystore: &KeyStoreConfig,
    bytes: &[u8],
) -> Result<(), ConnectionError> {
    match keystore.store_type.to_ascii_uppercase().as_str() {
        "PKCS12" | "P12" | "PFX" => {
            let parsed = Pkcs12::from_der(bytes)?.parse2(&keystore.password)?;
            if let Some(cert) = parsed.cert {
                builder.set_certificate(&cert)?;
            }
            if let Some(key) = parsed.pkey {
                builder.set_private_key(&key)?;
            }
            for ca in parsed.ca.into_iter().flatten() {
                builder.add_extra_chain_cert(ca)?;
            }
        }
        "PEM" => {
            let mut chain = X509::stack_from_pem(bytes)?.into_iter();
            let cert = chain.next().ok_or_else(|| {
                ConnectionError::Tls("PEM keystore contains no certificate".to_string())
            })?;
            let key = if keystore.password.is_empty() {
                PKey::private_key_from_pem(bytes)?
            } else {
                PKey::private_key_from_pem_passphrase(bytes, keystore.password.as_bytes())?
            };
            builder.set_certificate(&cert)?;
            builder.set_private_key(&key)?;
            for ca in chain {
                builder.add_extra_chain_cert(ca)?;
            }
        }
        other => {
            return Err(ConnectionError::Tls(format!(
                "Unsupported keystore type: {}",
                other
            )))
        }
    }
    Ok(())
}
