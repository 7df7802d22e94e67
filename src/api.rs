//! Client for the MaxScale REST API.
//!
//! See [`Client`] for details.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Version prefix of every API path.
pub const API_PREFIX: &str = "/v1";

/// Authenticated client for the MaxScale REST API.
///
/// The underlying [`reqwest::Client`] pools connections and is shared by all
/// collection cycles. Every [`Client::get`] performs a live round trip.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl Client {
    /// Builds a client from the connection settings.
    ///
    /// The trust store is the system root store, extended with the PEM bundle
    /// at [`Config::ca_certificate`] if one is configured. A bundle that
    /// cannot be read or holds no certificate is an error.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(true)
            .timeout(config.timeout);

        if let Some(path) = &config.ca_certificate {
            for certificate in load_certificates(path)? {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let http = builder.build().map_err(Error::Client)?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Returns the URL requested for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Fetches `path` and decodes the JSON body into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "requesting MaxScale statistics");

        let transport = |source| Error::Transport {
            path: path.to_string(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteStatus {
                path: path.to_string(),
                status: status.to_string(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            path: path.to_string(),
            source,
        })
    }
}

fn load_certificates(path: &Path) -> Result<Vec<reqwest::Certificate>> {
    let certificate_error = |reason: String| Error::Certificate {
        path: path.to_path_buf(),
        reason,
    };

    let pem = std::fs::read(path).map_err(|e| certificate_error(e.to_string()))?;
    let certificates =
        reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| certificate_error(e.to_string()))?;
    if certificates.is_empty() {
        return Err(certificate_error("no PEM certificate found".to_string()));
    }

    Ok(certificates)
}

/// Top-level JSON document returned by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Document<T> {
    /// Primary data, either one [`Entry`] or a list of them.
    pub data: T,
}

/// One resource object of a [`Document`].
#[derive(Debug, Deserialize)]
pub struct Entry<A> {
    /// Resource identifier, e.g. the server or thread name.
    #[serde(default)]
    pub id: String,
    /// Resource specific attributes.
    pub attributes: A,
}

/// Deserializers tolerating the loosely typed values of MaxScale parameters.
pub(crate) mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Number(f64),
        Text(String),
        // Arrays and objects. Must stay last.
        Other(IgnoredAny),
    }

    /// A number, or a string holding one. Anything else, arrays and objects
    /// included, is `None`.
    pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Number(n)) => Some(n),
            Some(Scalar::Text(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// A boolean, or a string or number spelling one. Arrays and objects are
    /// `false`.
    pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Bool(b)) => b,
            Some(Scalar::Number(n)) => n != 0.0,
            Some(Scalar::Text(s)) => !matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "off" | "no" | "0"
            ),
            Some(Scalar::Other(_)) | None => false,
        })
    }
}
