//! `/v1/servers`: connection counts and up/down state of each backend server.

use serde::Deserialize;

use super::Context;
use crate::api::{Document, Entry};
use crate::error::Result;
use crate::registry::{Catalog, Sample, Subject};

/// API path of the server list.
pub const PATH: &str = "/servers";

/// Server list as returned by MaxScale.
pub type Servers = Document<Vec<Entry<ServerAttributes>>>;

/// Attributes of one server.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerAttributes {
    /// Configured parameters.
    pub parameters: ServerParameters,
    /// Comma separated state, e.g. `Master, Running`.
    pub state: String,
    /// Live statistics.
    pub statistics: ServerStatistics,
}

/// Configured parameters of a server.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerParameters {
    /// Network address of the server.
    pub address: String,
}

/// Live statistics of a server.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerStatistics {
    /// Current number of connections.
    pub connections: f64,
}

pub(crate) async fn parse(ctx: Context<'_>) -> Result<Vec<Sample>> {
    let servers: Servers = ctx.client.get(PATH).await?;
    samples(&servers, ctx.registry.catalog(Subject::Server))
}

/// Translates the server list into samples.
pub fn samples(servers: &Servers, catalog: &Catalog) -> Result<Vec<Sample>> {
    let mut samples = Vec::with_capacity(servers.data.len() * 2);
    for server in &servers.data {
        let address = server.attributes.parameters.address.as_str();
        samples.push(catalog.sample(
            "server_connections",
            server.attributes.statistics.connections,
            &[server.id.as_str(), address],
        )?);

        let status = normalize_status(&server.attributes.state);
        samples.push(catalog.sample(
            "server_up",
            server_up(&status),
            &[server.id.as_str(), address, status.as_str()],
        )?);
    }
    Ok(samples)
}

/// Surrounds the comma separated state list with commas and drops the blanks
/// after each separator, so `Master, Running` becomes `,Master,Running,`.
///
/// Relabeling rules can then match a single state with `,Running,` without
/// caring about its position. Normalizing a normalized state is a no-op.
pub fn normalize_status(state: &str) -> String {
    let tokens: Vec<&str> = state
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();
    format!(",{},", tokens.join(","))
}

/// Derives the up gauge from a normalized state. `Down` wins over `Running`.
pub fn server_up(status: &str) -> u8 {
    if status.contains(",Down,") {
        return 0;
    }
    if status.contains(",Running,") {
        return 1;
    }
    0
}
