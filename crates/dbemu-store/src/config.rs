//! Connection configuration
//!
//! Credentials come from `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD` and
//! the optional `NEO4J_DATABASE`, after an optional `.env` file has been
//! loaded on top of the process environment.

use dbemu_core::errors::{ExError, ExErrorKind};
use dbemu_core_types::Sensitive;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const ENV_URI: &str = "NEO4J_URI";
pub const ENV_USERNAME: &str = "NEO4J_USERNAME";
pub const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";

pub const DEFAULT_DATABASE: &str = "neo4j";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BOLT_PORT: u16 = 7687;
const HTTP_PORT: u16 = 7474;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {name}")]
    MissingVar { name: String },

    #[error("Invalid NEO4J_URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Unsupported URI scheme '{scheme}' (expected neo4j, bolt, http or their +s variants)")]
    UnsupportedScheme { scheme: String },

    #[error("Invalid database name '{name}'")]
    InvalidDatabase { name: String },

    #[error("Cannot load {path}: {message}")]
    EnvFile { path: String, message: String },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        ExError::new(ExErrorKind::Config)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}

/// Load `path` into the process environment, overriding existing variables
///
/// Returns whether the file existed. A missing file is only an error when
/// `required` is set.
///
/// # Errors
///
/// `ConfigError::EnvFile` if the file cannot be parsed, or is required and
/// absent.
pub fn load_env_file(path: &Path, required: bool) -> Result<bool, ConfigError> {
    match dotenvy::from_path_override(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Loaded env file");
            Ok(true)
        }
        Err(err) if err.not_found() && !required => {
            tracing::debug!(path = %path.display(), "No env file, using process environment");
            Ok(false)
        }
        Err(err) => Err(ConfigError::EnvFile {
            path: path.display().to_string(),
            message: err.to_string(),
        }),
    }
}

/// Everything needed to reach one Neo4j database
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// The URI as configured (Bolt or HTTP)
    pub uri: String,
    pub username: String,
    pub password: Sensitive<String>,
    pub database: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ConnectionConfig {
    /// Read the configuration from the process environment
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingVar` for an absent or empty required variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingVar` for an absent or empty required variable;
    /// `ConfigError::InvalidDatabase` for a malformed database name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingVar {
                    name: name.to_string(),
                })
        };

        let uri = required(ENV_URI)?;
        let username = required(ENV_USERNAME)?;
        // Passwords are taken verbatim
        let password = lookup(ENV_PASSWORD)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingVar {
                name: ENV_PASSWORD.to_string(),
            })?;
        let database = lookup(ENV_DATABASE)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Self {
            uri,
            username,
            password: Sensitive::new(password),
            database: DEFAULT_DATABASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
        .with_database(database)
    }

    /// Target another database on the same server
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidDatabase` unless the name is non-empty and made of
    /// ASCII letters, digits, `.`, `-` and `_`.
    pub fn with_database(mut self, database: impl Into<String>) -> Result<Self, ConfigError> {
        let database = database.into();
        let valid = !database.is_empty()
            && database
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(ConfigError::InvalidDatabase { name: database });
        }
        self.database = database;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the HTTP API, always ending in `/`
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidUri` or `ConfigError::UnsupportedScheme`.
    pub fn http_base(&self) -> Result<Url, ConfigError> {
        http_base_for(&self.uri)
    }

    /// `{base}/db/{database}/tx/commit`
    ///
    /// # Errors
    ///
    /// Same as [`ConnectionConfig::http_base`].
    pub fn commit_endpoint(&self) -> Result<Url, ConfigError> {
        let base = self.http_base()?;
        base.join(&format!("db/{}/tx/commit", self.database))
            .map_err(|e| ConfigError::InvalidUri {
                uri: self.uri.clone(),
                reason: e.to_string(),
            })
    }
}

/// Map a Bolt or HTTP URI to the HTTP API base
///
/// `neo4j+s://h` and `bolt+s://h` become `https://h`, `neo4j://h` and
/// `bolt://h` become `http://h:7474`. The Bolt port 7687 is never carried
/// over; any other explicit port is.
fn http_base_for(uri: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUri {
        uri: uri.to_string(),
        reason,
    };
    let parsed = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;

    let (scheme, default_port) = match parsed.scheme() {
        "http" | "https" => {
            let mut base = parsed.clone();
            base.set_query(None);
            base.set_fragment(None);
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            return Ok(base);
        }
        "neo4j+s" | "bolt+s" | "neo4j+ssc" | "bolt+ssc" => ("https", None),
        "neo4j" | "bolt" => ("http", Some(HTTP_PORT)),
        other => {
            return Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            })
        }
    };

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("missing host".to_string()))?;
    let port = match parsed.port() {
        Some(BOLT_PORT) | None => default_port,
        Some(explicit) => Some(explicit),
    };
    let text = match port {
        Some(port) => format!("{}://{}:{}/", scheme, host, port),
        None => format!("{}://{}/", scheme, host),
    };
    Url::parse(&text).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config_from(pairs: &[(&str, &str)]) -> Result<ConnectionConfig, ConfigError> {
        let vars = vars(pairs);
        ConnectionConfig::from_lookup(|name| vars.get(name).cloned())
    }

    fn base(uri: &str) -> String {
        http_base_for(uri).unwrap().to_string()
    }

    #[test]
    fn test_from_lookup_reads_all_vars() {
        let config = config_from(&[
            (ENV_URI, "neo4j+s://abc.databases.neo4j.io"),
            (ENV_USERNAME, "neo4j"),
            (ENV_PASSWORD, " s3cret "),
            (ENV_DATABASE, "school"),
        ])
        .unwrap();

        assert_eq!(config.uri, "neo4j+s://abc.databases.neo4j.io");
        assert_eq!(config.username, "neo4j");
        assert_eq!(config.password.expose(), " s3cret ");
        assert_eq!(config.database, "school");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_database_defaults_to_neo4j() {
        let config = config_from(&[
            (ENV_URI, "bolt://localhost"),
            (ENV_USERNAME, "neo4j"),
            (ENV_PASSWORD, "pw"),
        ])
        .unwrap();
        assert_eq!(config.database, DEFAULT_DATABASE);
    }

    #[test]
    fn test_missing_and_empty_vars_are_reported_by_name() {
        let err = config_from(&[(ENV_USERNAME, "neo4j"), (ENV_PASSWORD, "pw")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVar {
                name: ENV_URI.to_string()
            }
        );

        let err = config_from(&[
            (ENV_URI, "bolt://localhost"),
            (ENV_USERNAME, "neo4j"),
            (ENV_PASSWORD, ""),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required environment variable NEO4J_PASSWORD");

        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let config = config_from(&[
            (ENV_URI, "bolt://localhost"),
            (ENV_USERNAME, "neo4j"),
            (ENV_PASSWORD, "hunter2"),
        ])
        .unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_invalid_database_name_rejected() {
        let err = config_from(&[
            (ENV_URI, "bolt://localhost"),
            (ENV_USERNAME, "neo4j"),
            (ENV_PASSWORD, "pw"),
            (ENV_DATABASE, "../system"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDatabase { .. }));
    }

    #[test]
    fn test_bolt_uris_map_to_http_api() {
        assert_eq!(base("neo4j+s://abc.databases.neo4j.io"), "https://abc.databases.neo4j.io/");
        assert_eq!(base("bolt+s://db.example.com:7687"), "https://db.example.com/");
        assert_eq!(base("neo4j://localhost"), "http://localhost:7474/");
        assert_eq!(base("bolt://localhost:7687"), "http://localhost:7474/");
        assert_eq!(base("neo4j://localhost:8080"), "http://localhost:8080/");
    }

    #[test]
    fn test_http_uris_pass_through() {
        assert_eq!(base("http://127.0.0.1:7474"), "http://127.0.0.1:7474/");
        assert_eq!(base("https://proxy.local/neo4j"), "https://proxy.local/neo4j/");
    }

    #[test]
    fn test_unsupported_and_invalid_uris() {
        assert!(matches!(
            http_base_for("ftp://localhost"),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            http_base_for("not a uri"),
            Err(ConfigError::InvalidUri { .. })
        ));
    }

    #[test]
    fn test_commit_endpoint() {
        let config = config_from(&[
            (ENV_URI, "neo4j://localhost"),
            (ENV_USERNAME, "neo4j"),
            (ENV_PASSWORD, "pw"),
            (ENV_DATABASE, "school"),
        ])
        .unwrap();
        assert_eq!(
            config.commit_endpoint().unwrap().as_str(),
            "http://localhost:7474/db/school/tx/commit"
        );
    }

    #[test]
    fn test_missing_optional_env_file_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let loaded = load_env_file(&dir.path().join(".env"), false).unwrap();
        assert!(!loaded);

        let err = load_env_file(&dir.path().join(".env"), true).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }

    #[test]
    fn test_env_file_overrides_process_environment() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "DBEMU_CONFIG_TEST_OVERRIDE=from_file\n").unwrap();
        std::env::set_var("DBEMU_CONFIG_TEST_OVERRIDE", "from_process");

        assert!(load_env_file(&path, false).unwrap());

        assert_eq!(
            std::env::var("DBEMU_CONFIG_TEST_OVERRIDE").unwrap(),
            "from_file"
        );
    }
}
