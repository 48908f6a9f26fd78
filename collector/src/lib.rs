//! # AWX Exporter Collector
//!
//! Polls the AWX (Ansible Tower) REST API and republishes hosts and job templates as Prometheus
//! gauges.
//!
//! ## Architecture
//!
//! - **`client`**: authenticated, timeout-bounded GET with response validation
//! - **`pagination`**: follows `next` links and hands decoded pages to a collector
//! - **`models`**: the subset of the AWX payloads that is exported
//! - **`collectors`**: per-entity mapping to observations, plus the `Orchestrator` running a scrape
//! - **`metrics`**: metric families, observations and the shared `MetricsRegistry`
//! - **`scheduler`**: runs a scrape at startup and then on a fixed interval until cancelled
//!
//! A scrape is all-or-nothing: observations are staged in a `ScrapeBatch` and only published
//! once every page of every target was fetched and decoded. Until then the registry keeps serving
//! the previous scrape.

pub mod client;
pub mod collectors;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use client::AwxClient;
pub use collectors::*;
pub use error::{
    FetchError,
    ScrapeError,
    TimestampParseError,
};
pub use metrics::*;
pub use pagination::PageWalker;
pub use scheduler::{
    Scheduler,
    SchedulerPhase,
    SchedulerState,
};
