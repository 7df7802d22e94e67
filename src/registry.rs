//! Metric registry implementation.
//!
//! See [`Registry`] for details.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::metrics::counter::Counter;
use crate::metrics::gauge::Gauge;
use crate::metrics::{MetricType, TypedMetric};

/// Namespace every exported metric name starts with.
pub const NAMESPACE: &str = "maxctrl";

/// The MaxScale subsystem a [`Catalog`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Subject {
    Server,
    Service,
    MaxscaleStatus,
    ThreadStatus,
    Monitor,
    Exporter,
}

impl Subject {
    /// All subjects, in the order they are described.
    pub const ALL: [Subject; 6] = [
        Subject::Server,
        Subject::Service,
        Subject::MaxscaleStatus,
        Subject::ThreadStatus,
        Subject::Monitor,
        Subject::Exporter,
    ];

    fn metrics(&self) -> &'static [MetricSpec] {
        match self {
            Subject::Server => SERVER_METRICS,
            Subject::Service => SERVICE_METRICS,
            Subject::MaxscaleStatus => MAXSCALE_STATUS_METRICS,
            Subject::ThreadStatus => THREAD_STATUS_METRICS,
            Subject::Monitor => MONITOR_METRICS,
            Subject::Exporter => EXPORTER_METRICS,
        }
    }
}

/// A metric registry.
///
/// Holds one immutable [`Catalog`] per [`Subject`]. The registry is built once
/// at start-up and shared read-only by every collection cycle, so parsers only
/// ever see the catalog of the resource they translate.
///
/// ```
/// # use maxctrl_exporter::registry::{Registry, Subject};
/// let registry = Registry::default();
///
/// let servers = registry.catalog(Subject::Server);
/// let up = servers.lookup("server_up").unwrap();
/// assert_eq!("maxctrl_server_up", up.name());
///
/// assert!(servers.lookup("service_current_sessions").is_err());
/// ```
#[derive(Debug)]
pub struct Registry {
    catalogs: Vec<Catalog>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_namespace(NAMESPACE)
    }
}

impl Registry {
    /// Builds all catalogs with the given metric name namespace.
    pub fn with_namespace(namespace: &str) -> Self {
        let catalogs = Subject::ALL
            .iter()
            .map(|subject| Catalog::new(*subject, namespace))
            .collect();
        Self { catalogs }
    }

    /// Returns the catalog of the given subject.
    pub fn catalog(&self, subject: Subject) -> &Catalog {
        // Catalogs are built from `Subject::ALL` in declaration order.
        &self.catalogs[subject as usize]
    }

    /// Looks up a key in any catalog.
    pub fn lookup(&self, key: &str) -> Result<&Arc<Descriptor>> {
        self.catalogs
            .iter()
            .find_map(|c| c.metrics.get(key))
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Iterates the descriptors of all catalogs.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.catalogs.iter().flat_map(Catalog::descriptors)
    }
}

/// The metrics of one [`Subject`], indexed by catalog key.
#[derive(Debug)]
pub struct Catalog {
    subject: Subject,
    metrics: BTreeMap<&'static str, Arc<Descriptor>>,
}

impl Catalog {
    fn new(subject: Subject, namespace: &str) -> Self {
        let metrics = subject
            .metrics()
            .iter()
            .map(|spec| {
                let descriptor = Descriptor::new(
                    namespace,
                    spec.subsystem,
                    spec.name,
                    spec.help,
                    spec.labels.iter().map(|l| Cow::Borrowed(*l)).collect(),
                    spec.metric_type,
                );
                (spec.key, Arc::new(descriptor))
            })
            .collect();
        Self { subject, metrics }
    }

    /// The subject this catalog describes.
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Returns the descriptor registered under `key`.
    pub fn lookup(&self, key: &str) -> Result<&Arc<Descriptor>> {
        self.metrics
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Looks up `key` and builds a [`Sample`] from it.
    pub fn sample<V: Into<f64>>(&self, key: &str, value: V, labels: &[&str]) -> Result<Sample> {
        let descriptor = self.lookup(key)?;
        Sample::new(
            descriptor.clone(),
            value.into(),
            labels.iter().map(|l| l.to_string()).collect(),
        )
    }

    /// Iterates the descriptors of this catalog.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.metrics.values()
    }
}

/// Prometheus metric descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    name: String,
    help: String,
    labels: Vec<Cow<'static, str>>,
    metric_type: MetricType,
}

impl Descriptor {
    /// Create new [`Descriptor`].
    ///
    /// The metric name is the underscore-joined non-empty parts of
    /// `namespace`, `subsystem` and `name`.
    pub fn new<H: Into<String>>(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: H,
        labels: Vec<Cow<'static, str>>,
        metric_type: MetricType,
    ) -> Self {
        let name = [namespace, subsystem, name]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_");

        Descriptor {
            name,
            help: help.into(),
            labels,
            metric_type,
        }
    }

    /// Returns the fully qualified name of the metric.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the help text of the metric.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Returns the label names of the metric, in emission order.
    pub fn labels(&self) -> &[Cow<'static, str>] {
        &self.labels
    }

    /// Returns the value kind of the metric.
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }
}

/// One observation of a metric produced during a collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    descriptor: Arc<Descriptor>,
    value: f64,
    labels: Vec<String>,
    timestamp: Option<i64>,
}

impl Sample {
    /// Creates a new [`Sample`], checking the label values against the label
    /// names of the descriptor.
    pub fn new(descriptor: Arc<Descriptor>, value: f64, labels: Vec<String>) -> Result<Self> {
        if descriptor.labels.len() != labels.len() {
            return Err(Error::LabelArity {
                name: descriptor.name.clone(),
                expected: descriptor.labels.len(),
                actual: labels.len(),
            });
        }

        Ok(Self {
            descriptor,
            value,
            labels,
            timestamp: None,
        })
    }

    /// Attaches a timestamp in milliseconds since the epoch.
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    /// The descriptor this sample belongs to.
    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    /// The sample value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The label values, in the order of the descriptor's label names.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Optional timestamp in milliseconds since the epoch.
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Returns the value of the label called `name`, if any.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .labels
            .iter()
            .position(|l| l == name)
            .map(|i| self.labels[i].as_str())
    }
}

struct MetricSpec {
    key: &'static str,
    subsystem: &'static str,
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
    metric_type: MetricType,
}

const fn gauge(
    key: &'static str,
    subsystem: &'static str,
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
) -> MetricSpec {
    MetricSpec {
        key,
        subsystem,
        name,
        help,
        labels,
        metric_type: <Gauge as TypedMetric>::TYPE,
    }
}

const fn counter(
    key: &'static str,
    subsystem: &'static str,
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
) -> MetricSpec {
    MetricSpec {
        key,
        subsystem,
        name,
        help,
        labels,
        metric_type: <Counter as TypedMetric>::TYPE,
    }
}

const SERVER_LABELS: &[&str] = &["server", "address"];
const SERVER_UP_LABELS: &[&str] = &["server", "address", "status"];
const SERVICE_LABELS: &[&str] = &["name", "router"];
const MONITOR_LABELS: &[&str] = &["name", "cooperative_monitoring_locks"];
const STATUS_LABELS: &[&str] = &["id"];

#[rustfmt::skip]
const SERVER_METRICS: &[MetricSpec] = &[
    gauge("server_connections", "server", "connections", "Amount of connections to the server", SERVER_LABELS),
    gauge("server_up", "server", "up", "Is the server up", SERVER_UP_LABELS),
];

#[rustfmt::skip]
const SERVICE_METRICS: &[MetricSpec] = &[
    gauge("service_current_sessions", "service", "current_sessions", "Amount of sessions currently active", SERVICE_LABELS),
    counter("service_sessions_total", "service", "total_sessions", "Total amount of sessions", SERVICE_LABELS),
    gauge("service_max_connections", "service", "max_connections", "Max connections allowed", SERVICE_LABELS),
];

#[rustfmt::skip]
const MAXSCALE_STATUS_METRICS: &[MetricSpec] = &[
    gauge("status_uptime", "status", "uptime", "How long has the server been running", &[]),
    gauge("status_threads", "status", "threads", "Number of worker threads", &[]),
    gauge("status_passive", "status", "passive", "Has passive mode", &[]),
    gauge("status_writeq_high_water", "status", "writeq_high_water", "High water mark for network write buffer", &[]),
    gauge("status_writeq_low_water", "status", "writeq_low_water", "Low water mark for network write buffer", &[]),
];

#[rustfmt::skip]
const THREAD_STATUS_METRICS: &[MetricSpec] = &[
    counter("status_read_events", "status", "read_events", "How many read events happened", STATUS_LABELS),
    counter("status_write_events", "status", "write_events", "How many write events happened", STATUS_LABELS),
    counter("status_error_events", "status", "error_events", "How many error events happened", STATUS_LABELS),
    counter("status_hangup_events", "status", "hangup_events", "How many hangup events happened", STATUS_LABELS),
    counter("status_accept_events", "status", "accept_events", "How many accept events happened", STATUS_LABELS),
    gauge("status_avg_event_queue_length", "status", "avg_event_queue_length", "The average length of the event queue", STATUS_LABELS),
    gauge("status_max_event_queue_length", "status", "max_event_queue_length", "The maximum length of the event queue", STATUS_LABELS),
    gauge("status_max_event_exec_time", "status", "max_event_exec_time", "The maximum event execution time", STATUS_LABELS),
    gauge("status_max_event_queue_time", "status", "max_event_queue_time", "The maximum event queue time", STATUS_LABELS),
    gauge("status_current_descriptors", "status", "current_descriptors", "How many current descriptors there are", STATUS_LABELS),
    counter("status_total_descriptors", "status", "total_descriptors", "How many total descriptors there are", STATUS_LABELS),
    gauge("status_load_last_second", "status", "load_last_second", "The load during the last measured second", STATUS_LABELS),
    gauge("status_load_last_minute", "status", "load_last_minute", "The load during the last measured minute", STATUS_LABELS),
    gauge("status_load_last_hour", "status", "load_last_hour", "The load during the last measured hour", STATUS_LABELS),
    gauge("status_query_classifier_cache_size", "status", "query_classifier_cache_size", "The query classifier cache size", STATUS_LABELS),
    gauge("status_query_classifier_cache_inserts", "status", "query_classifier_cache_inserts", "The number of inserts into the query classifier cache", STATUS_LABELS),
    gauge("status_query_classifier_cache_hits", "status", "query_classifier_cache_hits", "The number of hits in the query classifier cache", STATUS_LABELS),
    gauge("status_query_classifier_cache_misses", "status", "query_classifier_cache_misses", "The number of misses in the query classifier cache", STATUS_LABELS),
    gauge("status_query_classifier_cache_evictions", "status", "query_classifier_cache_evictions", "The number of evictions in the query classifier cache", STATUS_LABELS),
];

#[rustfmt::skip]
const MONITOR_METRICS: &[MetricSpec] = &[
    gauge("monitor_primary", "monitor", "primary", "Is a primary node", MONITOR_LABELS),
    counter("monitor_auto_failover", "monitor", "auto_failover", "Is auto-failover enable", MONITOR_LABELS),
    gauge("monitor_auto_rejoin", "monitor", "auto_rejoin", "Is auto-rejoin enable", MONITOR_LABELS),
];

#[rustfmt::skip]
const EXPORTER_METRICS: &[MetricSpec] = &[
    gauge("up", "", "up", "Was the last scrape of MaxScale successful?", &[]),
    counter("exporter_total_scrapes", "", "exporter_total_scrapes", "Current total MaxScale scrapes", &[]),
];
