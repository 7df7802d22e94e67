//! `/v1/monitors`: failover settings and primary election of each monitor.

use serde::Deserialize;

use super::Context;
use crate::api::{lenient, Document, Entry};
use crate::error::Result;
use crate::registry::{Catalog, Sample, Subject};

/// API path of the monitor list.
pub const PATH: &str = "/monitors";

/// Monitor list as returned by MaxScale.
pub type Monitors = Document<Vec<Entry<MonitorAttributes>>>;

/// Attributes of one monitor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MonitorAttributes {
    /// Configured parameters.
    pub parameters: MonitorParameters,
    /// Module specific diagnostics.
    pub monitor_diagnostics: MonitorDiagnostics,
}

/// Configured parameters of a monitor.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MonitorParameters {
    /// Whether the monitor promotes a new primary on failure.
    #[serde(deserialize_with = "lenient::flag")]
    pub auto_failover: bool,
    /// Whether the monitor rejoins recovered servers.
    #[serde(deserialize_with = "lenient::flag")]
    pub auto_rejoin: bool,
    /// Lock mode shared between MaxScale instances.
    pub cooperative_monitoring_locks: String,
}

impl Default for MonitorParameters {
    fn default() -> Self {
        Self {
            auto_failover: false,
            auto_rejoin: false,
            cooperative_monitoring_locks: "none".to_string(),
        }
    }
}

/// Diagnostics of a monitor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MonitorDiagnostics {
    /// Name of the server currently acting as primary.
    #[serde(alias = "master")]
    pub primary: Option<String>,
}

impl MonitorDiagnostics {
    fn has_primary(&self) -> bool {
        self.primary.as_deref().is_some_and(|p| !p.is_empty())
    }
}

pub(crate) async fn parse(ctx: Context<'_>) -> Result<Vec<Sample>> {
    let monitors: Monitors = ctx.client.get(PATH).await?;
    samples(&monitors, ctx.registry.catalog(Subject::Monitor))
}

/// Translates the monitor list into samples.
pub fn samples(monitors: &Monitors, catalog: &Catalog) -> Result<Vec<Sample>> {
    let mut samples = Vec::with_capacity(monitors.data.len() * 3);
    for monitor in &monitors.data {
        let attributes = &monitor.attributes;
        let labels = [
            monitor.id.as_str(),
            attributes.parameters.cooperative_monitoring_locks.as_str(),
        ];

        samples.push(catalog.sample(
            "monitor_primary",
            u8::from(attributes.monitor_diagnostics.has_primary()),
            &labels,
        )?);
        samples.push(catalog.sample(
            "monitor_auto_failover",
            u8::from(attributes.parameters.auto_failover),
            &labels,
        )?);
        samples.push(catalog.sample(
            "monitor_auto_rejoin",
            u8::from(attributes.parameters.auto_rejoin),
            &labels,
        )?);
    }
    Ok(samples)
}
