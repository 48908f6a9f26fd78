use crate::{
    collectors::{
        timestamp::parse_timestamp,
        Collector,
    },
    error::ScrapeError,
    metrics::{
        as_gauge,
        Family,
        HostStatusMetric,
        Observation,
        ScrapeBatch,
        TimestampEvent,
    },
    models::{
        Group,
        Host,
    },
    pagination::PageWalker,
};
use awx_exporter_config::ScrapeTarget;
use std::{
    future::Future,
    pin::Pin,
};
use tracing::{
    debug,
    warn,
};

/// `group` label of host status series for hosts that are in no group at all.
pub const NO_GROUP: &str = "none";

const PROGRESS_PAGE_SIZE: usize = 100;
const PROGRESS_EVERY: usize = 50;

/// Exports `/api/v2/hosts/` as host info, status, timestamp, group membership and group info.
#[derive(Debug, Default)]
pub struct HostCollector;

impl Collector for HostCollector {
    fn collect<'a>(
        &'a self,
        walker: &'a PageWalker,
        batch: &'a mut ScrapeBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), ScrapeError>> + Send + 'a>> {
        Box::pin(async move {
            let summary = walker
                .walk::<Host, _>(ScrapeTarget::Hosts.start_path(), |hosts| {
                    let count = hosts.len();
                    for (index, host) in hosts.iter().enumerate() {
                        batch.extend(host_observations(host));
                        if count > PROGRESS_PAGE_SIZE && (index + 1) % PROGRESS_EVERY == 0 {
                            debug!("processed {}/{} hosts", index + 1, count);
                        }
                    }
                    batch.hosts += count;
                })
                .await?;
            batch.pages += summary.pages;
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "hosts"
    }
}

/// Label values shared by all series of one host.
struct HostLabels<'a> {
    id: String,
    name: &'a str,
    inventory_id: String,
}

impl<'a> HostLabels<'a> {
    fn new(host: &'a Host) -> Self {
        Self {
            id: host.id.to_string(),
            name: &host.name,
            inventory_id: host.summary_fields.inventory.id.to_string(),
        }
    }

    fn info(&self, host: &Host) -> Observation {
        let enabled = if host.enabled { "true" } else { "false" };
        Observation::new(
            Family::HostInfo,
            vec![
                self.id.clone(),
                self.name.to_string(),
                self.inventory_id.clone(),
                host.summary_fields.inventory.name.clone(),
                enabled.to_string(),
                host.instance_id.clone(),
            ],
            1.0,
        )
    }

    fn status(&self, metric: HostStatusMetric, group: &str, value: f64) -> Observation {
        let metric: &'static str = metric.into();
        Observation::new(
            Family::HostStatus,
            vec![
                self.id.clone(),
                self.name.to_string(),
                metric.to_string(),
                group.to_string(),
            ],
            value,
        )
    }

    fn timestamp(&self, event: TimestampEvent, value: f64) -> Observation {
        let event: &'static str = event.into();
        Observation::new(
            Family::HostTimestamps,
            vec![self.id.clone(), self.name.to_string(), event.to_string()],
            value,
        )
    }

    fn membership(&self, group: &Group) -> Observation {
        Observation::new(
            Family::HostGroupMembership,
            vec![
                self.id.clone(),
                self.name.to_string(),
                group.id.to_string(),
                group.name.clone(),
            ],
            1.0,
        )
    }

    fn group_info(&self, group: &Group) -> Observation {
        Observation::new(
            Family::GroupInfo,
            vec![group.id.to_string(), group.name.clone(), self.inventory_id.clone()],
            1.0,
        )
    }
}

/// All observations derived from a single host.
///
/// Status series fan out across every group of the host (or the `none` group). A timestamp
/// that cannot be parsed is logged and skipped without affecting the other series.
pub fn host_observations(host: &Host) -> Vec<Observation> {
    let labels = HostLabels::new(host);
    let groups = host.groups();
    let mut observations = Vec::with_capacity(4 + 4 * groups.len().max(1));

    observations.push(labels.info(host));

    let active_failures = as_gauge(host.has_active_failures);
    let inventory_sources = as_gauge(host.has_inventory_sources);
    let group_names: Vec<&str> = if groups.is_empty() {
        vec![NO_GROUP]
    } else {
        groups.iter().map(|group| group.name.as_str()).collect()
    };
    for group in group_names {
        observations.push(labels.status(HostStatusMetric::ActiveFailures, group, active_failures));
        observations.push(labels.status(HostStatusMetric::InventorySources, group, inventory_sources));
    }

    let timestamps = [
        (TimestampEvent::Created, Some(host.created.as_str())),
        (TimestampEvent::Modified, Some(host.modified.as_str())),
        (TimestampEvent::AnsibleFactsModified, host.ansible_facts_modified.as_deref()),
    ];
    for (event, value) in timestamps {
        let Some(value) = value else {
            continue;
        };
        match parse_timestamp(value) {
            Ok(seconds) => observations.push(labels.timestamp(event, seconds)),
            Err(err) => {
                let event: &'static str = event.into();
                warn!(host = %host.name, id = host.id, event, "skipping timestamp: {err}");
            }
        }
    }

    for group in groups {
        observations.push(labels.membership(group));
        observations.push(labels.group_info(group));
    }

    observations
}
