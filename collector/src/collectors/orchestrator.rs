use crate::{
    client::AwxClient,
    collectors::{
        Collector,
        HostCollector,
        JobTemplateCollector,
    },
    error::{
        FetchError,
        ScrapeError,
    },
    metrics::{
        MetricsRegistry,
        ScrapeBatch,
    },
    pagination::PageWalker,
};
use awx_exporter_config::{
    Config,
    ScrapeTarget,
};
use std::{
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};
use tracing::{
    debug,
    info,
};

/// Result of one published scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub pages: usize,
    pub hosts: usize,
    pub job_templates: usize,
    pub observations: usize,
    pub elapsed: Duration,
}

/// Runs every configured collector into one batch and publishes it.
///
/// A failing collector aborts the scrape before anything is published, so the registry keeps
/// serving the last complete scrape.
pub struct Orchestrator {
    walker: PageWalker,
    collectors: Vec<Box<dyn Collector>>,
    registry: Arc<MetricsRegistry>,
}

impl Orchestrator {
    pub fn new(client: AwxClient, max_pages: usize, targets: &[ScrapeTarget], registry: Arc<MetricsRegistry>) -> Self {
        let collectors = targets
            .iter()
            .map(|target| -> Box<dyn Collector> {
                match target {
                    ScrapeTarget::Hosts => Box::new(HostCollector),
                    ScrapeTarget::JobTemplates => Box::new(JobTemplateCollector),
                }
            })
            .collect();

        Self {
            walker: PageWalker::new(client, max_pages),
            collectors,
            registry,
        }
    }

    pub fn from_config(config: &Config, registry: Arc<MetricsRegistry>) -> Result<Self, FetchError> {
        let client = AwxClient::from_config(config)?;
        Ok(Self::new(client, config.max_pages, &config.targets, registry))
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    pub async fn scrape(&self) -> Result<ScrapeSummary, ScrapeError> {
        let started = Instant::now();
        let mut batch = ScrapeBatch::default();

        for collector in &self.collectors {
            let pages_before = batch.pages;
            collector.collect(&self.walker, &mut batch).await?;
            debug!(collector = collector.name(), pages = batch.pages - pages_before, "collector finished");
        }

        let elapsed = started.elapsed();
        self.registry.publish(&batch, elapsed)?;

        let summary = ScrapeSummary {
            pages: batch.pages,
            hosts: batch.hosts,
            job_templates: batch.job_templates,
            observations: batch.observations.len(),
            elapsed,
        };
        info!(
            pages = summary.pages,
            hosts = summary.hosts,
            job_templates = summary.job_templates,
            elapsed_ms = elapsed.as_millis() as u64,
            "metrics collection completed"
        );
        Ok(summary)
    }
}
