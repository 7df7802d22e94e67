//! `/v1/maxscale/threads`: event loop statistics of each routing worker.

use serde::Deserialize;

use super::Context;
use crate::api::{Document, Entry};
use crate::error::Result;
use crate::registry::{Catalog, Sample, Subject};

/// API path of the worker list.
pub const PATH: &str = "/maxscale/threads";

/// Worker list as returned by MaxScale.
pub type ThreadStatus = Document<Vec<Entry<ThreadAttributes>>>;

/// Attributes of one worker.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThreadAttributes {
    /// Worker statistics.
    pub stats: ThreadStats,
}

/// Statistics of one worker.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ThreadStats {
    pub reads: f64,
    pub writes: f64,
    pub errors: f64,
    pub hangups: f64,
    pub accepts: f64,
    pub avg_event_queue_length: f64,
    pub max_event_queue_length: f64,
    pub max_exec_time: f64,
    pub max_queue_time: f64,
    pub current_descriptors: f64,
    pub total_descriptors: f64,
    pub load: Load,
    pub query_classifier_cache: QueryClassifierCache,
}

/// Worker load in percent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct Load {
    pub last_second: f64,
    pub last_minute: f64,
    pub last_hour: f64,
}

/// Query classifier cache statistics of one worker.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct QueryClassifierCache {
    pub size: f64,
    pub inserts: f64,
    pub hits: f64,
    pub misses: f64,
    pub evictions: f64,
}

impl ThreadStats {
    /// Pairs every statistic with its catalog key.
    fn values(&self) -> [(&'static str, f64); 19] {
        let cache = &self.query_classifier_cache;
        [
            ("status_read_events", self.reads),
            ("status_write_events", self.writes),
            ("status_error_events", self.errors),
            ("status_hangup_events", self.hangups),
            ("status_accept_events", self.accepts),
            ("status_avg_event_queue_length", self.avg_event_queue_length),
            ("status_max_event_queue_length", self.max_event_queue_length),
            ("status_max_event_exec_time", self.max_exec_time),
            ("status_max_event_queue_time", self.max_queue_time),
            ("status_current_descriptors", self.current_descriptors),
            ("status_total_descriptors", self.total_descriptors),
            ("status_load_last_second", self.load.last_second),
            ("status_load_last_minute", self.load.last_minute),
            ("status_load_last_hour", self.load.last_hour),
            ("status_query_classifier_cache_size", cache.size),
            ("status_query_classifier_cache_inserts", cache.inserts),
            ("status_query_classifier_cache_hits", cache.hits),
            ("status_query_classifier_cache_misses", cache.misses),
            ("status_query_classifier_cache_evictions", cache.evictions),
        ]
    }
}

pub(crate) async fn parse(ctx: Context<'_>) -> Result<Vec<Sample>> {
    let threads: ThreadStatus = ctx.client.get(PATH).await?;
    samples(&threads, ctx.registry.catalog(Subject::ThreadStatus))
}

/// Translates the worker list into samples, 19 per worker.
pub fn samples(threads: &ThreadStatus, catalog: &Catalog) -> Result<Vec<Sample>> {
    let mut samples = Vec::with_capacity(threads.data.len() * 19);
    for thread in &threads.data {
        for (key, value) in thread.attributes.stats.values() {
            samples.push(catalog.sample(key, value, &[thread.id.as_str()])?);
        }
    }
    Ok(samples)
}
