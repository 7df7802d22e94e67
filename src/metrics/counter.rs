//! Module implementing a Prometheus counter.
//!
//! See [`Counter`] for details.

use super::{MetricType, TypedMetric};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Prometheus [`Counter`] to measure discrete events, e.g. scrapes.
///
/// Single monotonically increasing value metric. Clones share the same
/// underlying value, so a [`Counter`] can be handed to concurrent scrapes.
///
/// ```
/// # use maxctrl_exporter::metrics::counter::Counter;
/// let counter: Counter = Counter::default();
/// counter.inc();
/// assert_eq!(1, counter.get());
/// ```
#[derive(Debug)]
pub struct Counter<A = AtomicU64> {
    value: Arc<A>,
}

impl<A> Clone for Counter<A> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<A: Default> Default for Counter<A> {
    fn default() -> Self {
        Counter {
            value: Arc::new(A::default()),
        }
    }
}

impl<A: Atomic> Counter<A> {
    /// Increase the [`Counter`] by 1, returning the previous value.
    pub fn inc(&self) -> A::Number {
        self.value.inc()
    }

    /// Get the current value of the [`Counter`].
    pub fn get(&self) -> A::Number {
        self.value.get()
    }
}

/// Atomic operations for a [`Counter`] value store.
pub trait Atomic {
    /// The numeric type of the value.
    type Number;

    /// Increase the value by `1`, returning the previous value.
    fn inc(&self) -> Self::Number;

    /// Get the value.
    fn get(&self) -> Self::Number;
}

impl Atomic for AtomicU64 {
    type Number = u64;

    fn inc(&self) -> Self::Number {
        self.fetch_add(1, Ordering::Relaxed)
    }

    fn get(&self) -> Self::Number {
        self.load(Ordering::Relaxed)
    }
}

impl<A> TypedMetric for Counter<A> {
    const TYPE: MetricType = MetricType::Counter;
}
