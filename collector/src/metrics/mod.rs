//! # Metrics
//!
//! Typed observations produced by the collectors and the registry they are published to.
//!
//! - **`Family`**: every entity metric family with its fixed label schema
//! - **`Observation`**: one label tuple and value for one family
//! - **`ScrapeBatch`**: all observations of one scrape, published in one step
//! - **`MetricsRegistry`**: the prometheus registry shared by the scheduler and the HTTP server

pub mod registry;

pub use registry::{
    MetricsRegistry,
    Snapshot,
};
use strum::{
    EnumIter,
    IntoStaticStr,
};

/// Entity metric families. All of them are cleared and rebuilt on every published scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Family {
    HostInfo,
    HostStatus,
    HostTimestamps,
    HostGroupMembership,
    GroupInfo,
    JobTemplateLastRun,
    JobTemplateFailedHosts,
    JobTemplateTotalHosts,
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Family::HostInfo => "awx_host_info",
            Family::HostStatus => "awx_host_status",
            Family::HostTimestamps => "awx_host_timestamps",
            Family::HostGroupMembership => "awx_host_group_membership",
            Family::GroupInfo => "awx_group_info",
            Family::JobTemplateLastRun => "awx_job_template_last_run_timestamp",
            Family::JobTemplateFailedHosts => "awx_job_template_failed_hosts",
            Family::JobTemplateTotalHosts => "awx_job_template_total_hosts",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            Family::HostInfo => "Information about AWX hosts including inventory and enabled status",
            Family::HostStatus => "Status metrics for AWX hosts including failures and inventory sources",
            Family::HostTimestamps => "Unix timestamps for AWX host events (created, modified, facts modified)",
            Family::HostGroupMembership => "Host to group membership relationships in AWX (1 = member)",
            Family::GroupInfo => "Information about AWX groups and their inventory associations",
            Family::JobTemplateLastRun => "Unix timestamp of the last job run of an AWX job template",
            Family::JobTemplateFailedHosts => "Hosts with active failures in the inventory of an AWX job template",
            Family::JobTemplateTotalHosts => "Total hosts in the inventory of an AWX job template",
        }
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            Family::HostInfo => &["id", "name", "inventory_id", "inventory_name", "enabled", "instance_id"],
            Family::HostStatus => &["id", "name", "metric", "group"],
            Family::HostTimestamps => &["id", "name", "event"],
            Family::HostGroupMembership => &["host_id", "host_name", "group_id", "group_name"],
            Family::GroupInfo => &["group_id", "group_name", "inventory_id"],
            Family::JobTemplateLastRun | Family::JobTemplateFailedHosts | Family::JobTemplateTotalHosts => {
                &["id", "name"]
            }
        }
    }
}

/// `metric` label of [`Family::HostStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum HostStatusMetric {
    ActiveFailures,
    InventorySources,
}

/// `event` label of [`Family::HostTimestamps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TimestampEvent {
    Created,
    Modified,
    AnsibleFactsModified,
}

/// A single gauge write: `family{labels} = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub family: Family,
    pub labels: Vec<String>,
    pub value: f64,
}

impl Observation {
    pub fn new(family: Family, labels: Vec<String>, value: f64) -> Self {
        debug_assert_eq!(labels.len(), family.label_names().len(), "label arity of {}", family.name());
        Self { family, labels, value }
    }
}

/// Everything one scrape produced. Nothing of it is visible until the registry publishes it.
#[derive(Debug, Clone, Default)]
pub struct ScrapeBatch {
    pub observations: Vec<Observation>,
    pub pages: usize,
    pub hosts: usize,
    pub job_templates: usize,
}

impl ScrapeBatch {
    pub fn extend(&mut self, observations: impl IntoIterator<Item = Observation>) {
        self.observations.extend(observations);
    }
}

pub(crate) fn as_gauge(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}
