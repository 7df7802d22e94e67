//! `/v1/services`: session counts of each routing service.

use serde::Deserialize;

use super::Context;
use crate::api::{lenient, Document, Entry};
use crate::error::Result;
use crate::registry::{Catalog, Sample, Subject};

/// API path of the service list.
pub const PATH: &str = "/services";

/// Service list as returned by MaxScale.
pub type Services = Document<Vec<Entry<ServiceAttributes>>>;

/// Attributes of one service.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceAttributes {
    /// Router module, e.g. `readwritesplit`.
    pub router: String,
    /// Currently open client connections.
    pub connections: f64,
    /// Configured parameters.
    pub parameters: ServiceParameters,
}

/// Configured parameters of a service.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceParameters {
    /// Connection limit, if the service reports a numeric one.
    #[serde(deserialize_with = "lenient::number")]
    pub max_connections: Option<f64>,
}

pub(crate) async fn parse(ctx: Context<'_>) -> Result<Vec<Sample>> {
    let services: Services = ctx.client.get(PATH).await?;
    samples(
        &services,
        ctx.registry.catalog(Subject::Service),
        ctx.max_connections,
    )
}

/// Translates the service list into samples.
///
/// `service_max_connections` falls back to `max_connections` for services
/// that do not report a limit and is left out when neither is known.
pub fn samples(
    services: &Services,
    catalog: &Catalog,
    max_connections: Option<f64>,
) -> Result<Vec<Sample>> {
    let mut samples = Vec::with_capacity(services.data.len() * 3);
    for service in &services.data {
        let labels = [service.id.as_str(), service.attributes.router.as_str()];
        let connections = service.attributes.connections;

        samples.push(catalog.sample("service_current_sessions", connections, &labels)?);
        // MaxScale has no lifetime session count, the live count is reported.
        samples.push(catalog.sample("service_sessions_total", connections, &labels)?);

        if let Some(limit) = service
            .attributes
            .parameters
            .max_connections
            .or(max_connections)
        {
            samples.push(catalog.sample("service_max_connections", limit, &labels)?);
        }
    }
    Ok(samples)
}
