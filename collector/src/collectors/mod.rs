//! # Collectors Module
//!
//! Turns AWX API listings into metric observations.
//!
//! ## Architecture
//!
//! - **`Collector` trait**: walks one paginated endpoint into a `ScrapeBatch`
//! - **`HostCollector`**: `/api/v2/hosts/` into host info, status, timestamps and group metrics
//! - **`JobTemplateCollector`**: `/api/v2/job_templates` into last run and inventory health
//! - **`Orchestrator`**: runs all configured collectors and publishes the batch in one step
//!
//! The per-entity mapping (`host_observations`, `job_template_observations`) is pure and does not
//! know about HTTP or pagination.

pub mod collector;
pub mod host_collector;
pub mod job_template_collector;
pub mod orchestrator;
mod timestamp;

// Re-export the main types for easy access
pub use collector::Collector;
pub use host_collector::{
    host_observations,
    HostCollector,
    NO_GROUP,
};
pub use job_template_collector::{
    job_template_observations,
    JobTemplateCollector,
};
pub use orchestrator::{
    Orchestrator,
    ScrapeSummary,
};
pub use timestamp::parse_timestamp;
