//! The MaxScale [`Collector`].
//!
//! See [`Exporter`] for details.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::Client;
use crate::collector::{CollectionResult, Collector};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::metrics::counter::Counter;
use crate::metrics::gauge::Gauge;
use crate::parsers::{Context, Resource};
use crate::registry::{Descriptor, Registry, Sample, Subject};

/// Collects MaxScale statistics on every scrape.
///
/// Each cycle fetches every enabled [`Resource`] once, one after the other. A
/// resource that cannot be fetched or decoded is logged and skipped, and the
/// `up` gauge of that cycle reports `0`. The remaining resources still
/// contribute their samples.
#[derive(Debug)]
pub struct Exporter {
    client: Client,
    registry: Registry,
    resources: Vec<Resource>,
    max_connections: Option<f64>,
    up: Gauge,
    total_scrapes: Counter,
}

impl Exporter {
    /// Builds an exporter from the resolved configuration.
    ///
    /// Fails if the certificate bundle cannot be loaded.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::new(config)?;

        let mut resources = Resource::DEFAULT.to_vec();
        if config.monitors {
            resources.push(Resource::Monitors);
        }

        Ok(Self {
            client,
            registry: Registry::default(),
            resources,
            max_connections: config.max_connections,
            up: Gauge::default(),
            total_scrapes: Counter::default(),
        })
    }

    /// The resources fetched on every cycle.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Health reported by the most recently finished cycle, `0` before the
    /// first one.
    pub fn up(&self) -> i64 {
        self.up.get()
    }

    /// Number of cycles started so far.
    pub fn total_scrapes(&self) -> u64 {
        self.total_scrapes.get()
    }

    fn context(&self) -> Context<'_> {
        Context {
            client: &self.client,
            registry: &self.registry,
            max_connections: self.max_connections,
        }
    }

    async fn scrape(&self) -> CollectionResult {
        let total_scrapes = self.total_scrapes.inc() + 1;

        let mut samples = Vec::new();
        let mut up = 1;
        for resource in &self.resources {
            match resource.parse(self.context()).await {
                Ok(parsed) => {
                    debug!(%resource, samples = parsed.len(), "collected resource");
                    samples.extend(parsed);
                }
                Err(e) if e.is_bug() => panic!("inconsistent metric catalog: {e}"),
                Err(e) => {
                    warn!(%resource, error = %e, "failed to collect resource");
                    up = 0;
                }
            }
        }
        self.up.set(up);

        let exporter = self.registry.catalog(Subject::Exporter);
        samples.push(must(exporter.sample("up", up as f64, &[])));
        samples.push(must(exporter.sample(
            "exporter_total_scrapes",
            total_scrapes as f64,
            &[],
        )));

        CollectionResult::new(samples, up, total_scrapes)
    }
}

impl Collector for Exporter {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.resources
            .iter()
            .map(Resource::subject)
            .chain([Subject::Exporter])
            .flat_map(|subject| self.registry.catalog(subject).descriptors())
            .cloned()
            .collect()
    }

    fn collect(&self) -> impl Future<Output = CollectionResult> + Send {
        self.scrape()
    }
}

/// Unwraps a sample of the exporter's own catalog, which is fixed at compile
/// time.
fn must(sample: Result<Sample>) -> Sample {
    match sample {
        Ok(sample) => sample,
        Err(e @ (Error::NotFound(_) | Error::LabelArity { .. })) => {
            panic!("inconsistent metric catalog: {e}")
        }
        Err(e) => panic!("unexpected error while building a sample: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> Config {
        Config {
            // Nothing listens on the discard port.
            url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn monitors_are_opt_in() {
        let exporter = Exporter::new(&unreachable()).unwrap();
        assert_eq!(&Resource::DEFAULT, exporter.resources());

        let exporter = Exporter::new(&Config {
            monitors: true,
            ..unreachable()
        })
        .unwrap();
        assert_eq!(Some(&Resource::Monitors), exporter.resources().last());
    }

    #[test]
    fn describe_enabled_catalogs() {
        let exporter = Exporter::new(&unreachable()).unwrap();
        let names: Vec<_> = exporter
            .describe()
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        assert_eq!(2 + 3 + 5 + 19 + 2, names.len());
        assert!(names.iter().any(|n| n == "maxctrl_service_max_connections"));
        assert!(names.iter().any(|n| n == "maxctrl_up"));
        assert!(!names.iter().any(|n| n.starts_with("maxctrl_monitor_")));
    }

    #[test_log::test(tokio::test)]
    async fn unreachable_api_reports_down() {
        let exporter = Exporter::new(&unreachable()).unwrap();

        let first = exporter.collect().await;
        assert_eq!(0, first.up());
        assert_eq!(1, first.total_scrapes());
        assert_eq!(2, first.samples().len());

        let second = exporter.collect().await;
        assert_eq!(2, second.total_scrapes());
        let scrapes: Vec<_> = second
            .samples_named("maxctrl_exporter_total_scrapes")
            .map(Sample::value)
            .collect();
        assert_eq!(vec![2.0], scrapes);

        assert_eq!(0, exporter.up());
        assert_eq!(2, exporter.total_scrapes());
    }
}
