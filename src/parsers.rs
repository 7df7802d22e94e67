//! Translation of MaxScale API resources into metric samples.
//!
//! There is one parser per [`Resource`]. Each fetches its resource exactly once
//! per collection cycle and either returns all of its samples or an error; a
//! failed fetch never yields a partial sample set.

use std::fmt;

use crate::api::Client;
use crate::error::Result;
use crate::registry::{Registry, Sample, Subject};

pub mod maxscale;
pub mod monitors;
pub mod servers;
pub mod services;
pub mod threads;

/// Everything a parser needs during one collection cycle.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    /// API client shared by all cycles.
    pub client: &'a Client,
    /// Metric catalogs.
    pub registry: &'a Registry,
    /// Fallback for services that do not report `max_connections`.
    pub max_connections: Option<f64>,
}

/// A MaxScale REST API resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// `/v1/servers`
    Servers,
    /// `/v1/services`
    Services,
    /// `/v1/maxscale`
    MaxscaleStatus,
    /// `/v1/maxscale/threads`
    ThreadStatus,
    /// `/v1/monitors`
    Monitors,
}

impl Resource {
    /// Resources collected on every scrape.
    pub const DEFAULT: [Resource; 4] = [
        Resource::Servers,
        Resource::Services,
        Resource::MaxscaleStatus,
        Resource::ThreadStatus,
    ];

    /// API path below the version prefix.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Servers => servers::PATH,
            Resource::Services => services::PATH,
            Resource::MaxscaleStatus => maxscale::PATH,
            Resource::ThreadStatus => threads::PATH,
            Resource::Monitors => monitors::PATH,
        }
    }

    /// Catalog holding the metrics of this resource.
    pub fn subject(&self) -> Subject {
        match self {
            Resource::Servers => Subject::Server,
            Resource::Services => Subject::Service,
            Resource::MaxscaleStatus => Subject::MaxscaleStatus,
            Resource::ThreadStatus => Subject::ThreadStatus,
            Resource::Monitors => Subject::Monitor,
        }
    }

    /// Fetches the resource and translates it into samples.
    pub async fn parse(&self, ctx: Context<'_>) -> Result<Vec<Sample>> {
        match self {
            Resource::Servers => servers::parse(ctx).await,
            Resource::Services => services::parse(ctx).await,
            Resource::MaxscaleStatus => maxscale::parse(ctx).await,
            Resource::ThreadStatus => threads::parse(ctx).await,
            Resource::Monitors => monitors::parse(ctx).await,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
