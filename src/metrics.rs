//! Metric type implementations.

pub mod counter;
pub mod gauge;

/// A metric that is aware of its Prometheus metric type.
pub trait TypedMetric {
    /// The Prometheus metric type.
    const TYPE: MetricType;
}

/// Prometheus metric type, i.e. the value kind of a
/// [`Descriptor`](crate::registry::Descriptor).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    /// Returns the given metric type's str representation.
    pub fn as_str(&self) -> &str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}
