#![deny(dead_code)]
#![deny(missing_docs)]
#![deny(unused)]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

//! Prometheus exporter for the [MariaDB MaxScale](https://mariadb.com/kb/en/maxscale/)
//! REST API.
//!
//! On every scrape the [`Exporter`](exporter::Exporter) queries the MaxScale
//! administrative API, translates the returned JSON documents into metric
//! [`Sample`](registry::Sample)s and hands them to the text encoder.
//!
//! # Examples
//!
//! ```no_run
//! use maxctrl_exporter::collector::Collector;
//! use maxctrl_exporter::config::Config;
//! use maxctrl_exporter::encoding::text::encode;
//! use maxctrl_exporter::exporter::Exporter;
//!
//! # async fn run() -> maxctrl_exporter::Result<()> {
//! // Resolve the connection settings from the environment.
//! let config = Config::from_env()?;
//!
//! // Build the exporter once at start-up. This loads the certificate bundle
//! // and the metric catalogs.
//! let exporter = Exporter::new(&config)?;
//!
//! // When Prometheus scrapes, run one collection cycle and encode it.
//! let result = exporter.collect().await;
//! let mut buffer = String::new();
//! encode(&mut buffer, result.samples()).unwrap();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod collector;
pub mod config;
pub mod encoding;
pub mod error;
pub mod exporter;
pub mod metrics;
pub mod parsers;
pub mod registry;
pub mod server;

pub use error::{Error, Result};
