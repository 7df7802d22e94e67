//! Error type shared by the exporter.

use std::path::PathBuf;

/// Errors raised while talking to MaxScale, building the catalogs or starting
/// up the exporter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The MaxScale API could not be reached, e.g. DNS, connect or TLS failure.
    #[error("error while getting {path}: {source}")]
    Transport {
        /// API path of the failed request.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The MaxScale API answered with a non-success status.
    #[error("the MaxScale statistic request for {path} failed with a status: {status}")]
    RemoteStatus {
        /// API path of the failed request.
        path: String,
        /// Status line, e.g. `503 Service Unavailable`.
        status: String,
    },
    /// The response body was not the JSON document we expected.
    #[error("could not decode the response for {path}: {source}")]
    Decode {
        /// API path of the failed request.
        path: String,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// A metric key that is not declared in any catalog was requested.
    #[error("metric {0:?} is not declared in the catalog")]
    NotFound(String),
    /// A sample was emitted with the wrong number of label values.
    #[error("metric {name} expects {expected} label values, got {actual}")]
    LabelArity {
        /// Fully qualified metric name.
        name: String,
        /// Number of declared label names.
        expected: usize,
        /// Number of supplied label values.
        actual: usize,
    },
    /// The trusted certificate bundle could not be loaded.
    #[error("could not load CA certificate from {path:?}: {reason}")]
    Certificate {
        /// Location of the bundle.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
    /// The configuration could not be resolved.
    #[error("config error: {0}")]
    Config(String),
    /// The configuration file is not valid YAML.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(#[source] reqwest::Error),
    /// The tracing filter directive is invalid.
    #[error("tracing_subscriber error: {0}")]
    TracingConfig(#[from] tracing_subscriber::filter::ParseError),
    /// The global tracing subscriber was already installed.
    #[error("tracing error: {0}")]
    Tracing(#[from] tracing::subscriber::SetGlobalDefaultError),
    /// An I/O error, e.g. while binding the listen port.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error indicates a mismatch between the catalogs and the
    /// parsers rather than an environmental failure.
    pub fn is_bug(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::LabelArity { .. })
    }
}

/// Result typedef for the exporter.
pub type Result<T, E = Error> = std::result::Result<T, E>;
