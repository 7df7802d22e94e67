//! Metric collector implementation.
//!
//! See [`Collector`] for details.

use std::future::Future;
use std::sync::Arc;

use crate::registry::{Descriptor, Sample};

/// The [`Collector`] abstraction produces a fresh set of samples on each
/// scrape.
///
/// Nothing is cached between scrapes: every call to [`Collector::collect`]
/// queries the source again.
///
/// ```
/// # use std::future::Future;
/// # use std::sync::Arc;
/// # use maxctrl_exporter::collector::{CollectionResult, Collector};
/// # use maxctrl_exporter::registry::{Descriptor, Registry, Subject};
/// #
/// #[derive(Debug, Default)]
/// struct Idle {
///     registry: Registry,
/// }
///
/// impl Collector for Idle {
///     fn describe(&self) -> Vec<Arc<Descriptor>> {
///         self.registry.catalog(Subject::Exporter).descriptors().cloned().collect()
///     }
///
///     fn collect(&self) -> impl Future<Output = CollectionResult> + Send {
///         let up = self.registry.catalog(Subject::Exporter).sample("up", 0, &[]);
///         async move { CollectionResult::new(up.into_iter().collect(), 0, 0) }
///     }
/// }
/// ```
pub trait Collector: std::fmt::Debug + Send + Sync + 'static {
    /// Every descriptor this collector may produce samples for.
    fn describe(&self) -> Vec<Arc<Descriptor>>;

    /// Runs one collection cycle. Called on each scrape.
    fn collect(&self) -> impl Future<Output = CollectionResult> + Send;
}

/// The outcome of one collection cycle.
#[derive(Debug, Clone)]
pub struct CollectionResult {
    samples: Vec<Sample>,
    up: i64,
    total_scrapes: u64,
}

impl CollectionResult {
    /// Creates a new [`CollectionResult`].
    pub fn new(samples: Vec<Sample>, up: i64, total_scrapes: u64) -> Self {
        Self {
            samples,
            up,
            total_scrapes,
        }
    }

    /// All samples of the cycle, including the exporter's own.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// `1` if every resource was collected, `0` otherwise.
    pub fn up(&self) -> i64 {
        self.up
    }

    /// Number of scrapes including this one.
    pub fn total_scrapes(&self) -> u64 {
        self.total_scrapes
    }

    /// Samples of the metric with the given fully qualified name.
    pub fn samples_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Sample> + 'a {
        self.samples
            .iter()
            .filter(move |s| s.descriptor().name() == name)
    }
}
