//! `/v1/maxscale`: global state of the MaxScale instance.

use serde::Deserialize;

use super::Context;
use crate::api::{lenient, Document, Entry};
use crate::error::Result;
use crate::registry::{Catalog, Sample, Subject};

/// API path of the instance resource.
pub const PATH: &str = "/maxscale";

/// Instance resource as returned by MaxScale.
pub type MaxscaleStatus = Document<Entry<MaxscaleAttributes>>;

/// Attributes of the MaxScale instance.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MaxscaleAttributes {
    /// Seconds since start-up.
    pub uptime: f64,
    /// Global parameters.
    pub parameters: MaxscaleParameters,
}

/// Global parameters of the MaxScale instance.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MaxscaleParameters {
    /// Number of routing worker threads.
    pub threads: f64,
    /// Whether this instance runs in passive mode.
    pub passive: bool,
    /// High water mark of the network write queue, in bytes.
    #[serde(deserialize_with = "lenient::number")]
    pub writeq_high_water: Option<f64>,
    /// Low water mark of the network write queue, in bytes.
    #[serde(deserialize_with = "lenient::number")]
    pub writeq_low_water: Option<f64>,
}

pub(crate) async fn parse(ctx: Context<'_>) -> Result<Vec<Sample>> {
    let status: MaxscaleStatus = ctx.client.get(PATH).await?;
    samples(&status, ctx.registry.catalog(Subject::MaxscaleStatus))
}

/// Translates the instance resource into samples.
pub fn samples(status: &MaxscaleStatus, catalog: &Catalog) -> Result<Vec<Sample>> {
    let attributes = &status.data.attributes;
    let parameters = &attributes.parameters;

    let mut samples = vec![
        catalog.sample("status_uptime", attributes.uptime, &[])?,
        catalog.sample("status_threads", parameters.threads, &[])?,
        catalog.sample("status_passive", u8::from(parameters.passive), &[])?,
    ];

    if let Some(high_water) = parameters.writeq_high_water {
        samples.push(catalog.sample("status_writeq_high_water", high_water, &[])?);
    }
    if let Some(low_water) = parameters.writeq_low_water {
        samples.push(catalog.sample("status_writeq_low_water", low_water, &[])?);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn status_samples(json: &str) -> Vec<Sample> {
        let status: MaxscaleStatus = serde_json::from_str(json).unwrap();
        let registry = Registry::default();
        samples(&status, registry.catalog(Subject::MaxscaleStatus)).unwrap()
    }

    fn names_and_values(samples: &[Sample]) -> Vec<(&str, f64)> {
        samples
            .iter()
            .map(|s| (s.descriptor().name(), s.value()))
            .collect()
    }

    #[test]
    fn instance_status() {
        let samples = status_samples(
            r#"{
                "data": {
                    "id": "maxscale",
                    "type": "maxscale",
                    "attributes": {
                        "uptime": 3600,
                        "parameters": {
                            "threads": 4,
                            "passive": false,
                            "writeq_high_water": 16777216,
                            "writeq_low_water": "8192"
                        }
                    }
                }
            }"#,
        );

        assert_eq!(
            vec![
                ("maxctrl_status_uptime", 3600.0),
                ("maxctrl_status_threads", 4.0),
                ("maxctrl_status_passive", 0.0),
                ("maxctrl_status_writeq_high_water", 16777216.0),
                ("maxctrl_status_writeq_low_water", 8192.0),
            ],
            names_and_values(&samples)
        );
        assert!(samples.iter().all(|s| s.labels().is_empty()));
    }

    #[test]
    fn passive_without_write_queue_limits() {
        let samples = status_samples(
            r#"{
                "data": {
                    "attributes": {
                        "uptime": 10,
                        "parameters": {"threads": 1, "passive": true, "writeq_high_water": "16Mi"}
                    }
                }
            }"#,
        );

        assert_eq!(
            vec![
                ("maxctrl_status_uptime", 10.0),
                ("maxctrl_status_threads", 1.0),
                ("maxctrl_status_passive", 1.0),
            ],
            names_and_values(&samples)
        );
    }
}
