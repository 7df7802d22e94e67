//! Exporter configuration.
//!
//! Settings are resolved in three layers: built-in defaults, then environment
//! variables, then an optional YAML file. An environment variable that is
//! unset or empty keeps the default. A key missing from the file, or set to an
//! empty value, keeps whatever the environment resolved.
//!
//! ```
//! # use maxctrl_exporter::config::Config;
//! let mut config = Config::from_lookup(|key| match key {
//!     "MAXSCALE_URL" => Some("https://maxscale.internal:8989".to_string()),
//!     "MAXSCALE_PASSWORD" => Some(String::new()),
//!     _ => None,
//! })
//! .unwrap();
//! assert_eq!("https://maxscale.internal:8989", config.url);
//! assert_eq!("mariadb", config.password);
//!
//! config.merge_yaml("exporter_port: 9105\nmonitors: true\n").unwrap();
//! assert_eq!(9105, config.exporter_port);
//! assert!(config.monitors);
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_yaml::Value;

use crate::error::{Error, Result};

/// Environment variable holding the path of the YAML configuration file.
pub const CONFIG_FILE_ENV: &str = "MAXCTRL_EXPORTER_CFG_FILE";

/// Resolved exporter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the MaxScale REST API.
    pub url: String,
    /// API user.
    pub username: String,
    /// API password.
    pub password: String,
    /// Port the snapshot endpoint listens on.
    pub exporter_port: u16,
    /// Additional trusted CA bundle in PEM format.
    pub ca_certificate: Option<PathBuf>,
    /// Connection limit reported for services that do not configure one.
    pub max_connections: Option<f64>,
    /// Whether `/v1/monitors` is collected.
    pub monitors: bool,
    /// Per-request timeout of API calls.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8989".to_string(),
            username: "admin".to_string(),
            password: "mariadb".to_string(),
            exporter_port: 8080,
            ca_certificate: None,
            max_connections: None,
            monitors: false,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Resolves the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration from environment-like `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for field in Field::ALL {
            if let Some(value) = lookup(field.env()).filter(|v| !v.is_empty()) {
                config.set(field, &value)?;
            }
        }
        Ok(config)
    }

    /// Resolves the environment, then applies the file at `path` if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Some(path) = path {
            config.merge_file(path)?;
        }
        Ok(config)
    }

    /// Applies the YAML file at `path`.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("could not read {}: {e}", path.display())))?;
        self.merge_yaml(&contents)
    }

    /// Applies the keys present in a YAML mapping.
    ///
    /// Values may be strings or any other YAML scalar, e.g. `exporter_port:
    /// 9105` and `exporter_port: "9105"` are equivalent.
    pub fn merge_yaml(&mut self, contents: &str) -> Result<()> {
        if contents.trim().is_empty() {
            return Ok(());
        }

        let mapping = match serde_yaml::from_str::<Value>(contents)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Ok(()),
            _ => return Err(Error::Config("expected a mapping at the top level".to_string())),
        };

        for field in Field::ALL {
            let Some(value) = mapping.get(field.key()) else {
                continue;
            };
            if let Some(value) = scalar(field, value)? {
                self.set(field, &value)?;
            }
        }
        Ok(())
    }

    /// Address the snapshot endpoint binds to.
    pub fn listen_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.exporter_port))
    }

    fn set(&mut self, field: Field, value: &str) -> Result<()> {
        let invalid = |reason: &str| {
            Error::Config(format!(
                "invalid {} ({}) {value:?}: {reason}",
                field.key(),
                field.env()
            ))
        };

        match field {
            Field::Url => self.url = value.to_string(),
            Field::Username => self.username = value.to_string(),
            Field::Password => self.password = value.to_string(),
            Field::ExporterPort => {
                self.exporter_port = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a port number"))?;
            }
            Field::CaCertificate => self.ca_certificate = Some(PathBuf::from(value)),
            Field::MaxConnections => {
                let limit: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a number"))?;
                if !limit.is_finite() || limit < 0.0 {
                    return Err(invalid("expected a non-negative number"));
                }
                self.max_connections = Some(limit);
            }
            Field::Monitors => {
                self.monitors = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => return Err(invalid("expected a boolean")),
                };
            }
            Field::Timeout => {
                let seconds: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected seconds"))?;
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err(invalid("expected a positive number of seconds"));
                }
                self.timeout = Duration::try_from_secs_f64(seconds)
                    .map_err(|_| invalid("timeout out of range"))?;
            }
        }
        Ok(())
    }
}

/// Renders a YAML scalar as the string an environment variable would hold.
/// Null and empty values yield `None`.
fn scalar(field: Field, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(Error::Config(format!("{} must be a scalar", field.key()))),
    }
}

#[derive(Clone, Copy, Debug)]
enum Field {
    Url,
    Username,
    Password,
    ExporterPort,
    CaCertificate,
    MaxConnections,
    Monitors,
    Timeout,
}

impl Field {
    const ALL: [Field; 8] = [
        Field::Url,
        Field::Username,
        Field::Password,
        Field::ExporterPort,
        Field::CaCertificate,
        Field::MaxConnections,
        Field::Monitors,
        Field::Timeout,
    ];

    fn env(&self) -> &'static str {
        match self {
            Field::Url => "MAXSCALE_URL",
            Field::Username => "MAXSCALE_USERNAME",
            Field::Password => "MAXSCALE_PASSWORD",
            Field::ExporterPort => "MAXSCALE_EXPORTER_PORT",
            Field::CaCertificate => "MAXSCALE_CA_CERTIFICATE",
            Field::MaxConnections => "MAXSCALE_MAX_CONNECTIONS",
            Field::Monitors => "MAXSCALE_MONITOR_METRICS",
            Field::Timeout => "MAXSCALE_TIMEOUT_SECONDS",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Field::Url => "url",
            Field::Username => "username",
            Field::Password => "password",
            Field::ExporterPort => "exporter_port",
            Field::CaCertificate => "caCertificate",
            Field::MaxConnections => "maxConnections",
            Field::Monitors => "monitors",
            Field::Timeout => "timeout",
        }
    }
}
