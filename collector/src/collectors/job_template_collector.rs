use crate::{
    collectors::{
        timestamp::parse_timestamp,
        Collector,
    },
    error::ScrapeError,
    metrics::{
        Family,
        Observation,
        ScrapeBatch,
    },
    models::JobTemplate,
    pagination::PageWalker,
};
use awx_exporter_config::ScrapeTarget;
use std::{
    future::Future,
    pin::Pin,
};
use tracing::warn;

/// Exports `/api/v2/job_templates` as last-run timestamp and inventory host health.
#[derive(Debug, Default)]
pub struct JobTemplateCollector;

impl Collector for JobTemplateCollector {
    fn collect<'a>(
        &'a self,
        walker: &'a PageWalker,
        batch: &'a mut ScrapeBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), ScrapeError>> + Send + 'a>> {
        Box::pin(async move {
            let summary = walker
                .walk::<JobTemplate, _>(ScrapeTarget::JobTemplates.start_path(), |templates| {
                    for template in &templates {
                        batch.extend(job_template_observations(template));
                    }
                    batch.job_templates += templates.len();
                })
                .await?;
            batch.pages += summary.pages;
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "job-templates"
    }
}

pub fn job_template_observations(template: &JobTemplate) -> Vec<Observation> {
    let labels = vec![template.id.to_string(), template.name.clone()];
    let mut observations = Vec::with_capacity(3);

    match template.last_job_run.as_deref().map(str::trim) {
        None | Some("") => {}
        Some(last_run) => match parse_timestamp(last_run) {
            Ok(seconds) => observations.push(Observation::new(Family::JobTemplateLastRun, labels.clone(), seconds)),
            Err(err) => warn!(template = %template.name, id = template.id, "skipping last run: {err}"),
        },
    }

    if let Some(inventory) = &template.summary_fields.inventory {
        observations.push(Observation::new(
            Family::JobTemplateFailedHosts,
            labels.clone(),
            inventory.hosts_with_active_failures as f64,
        ));
        observations.push(Observation::new(
            Family::JobTemplateTotalHosts,
            labels,
            inventory.total_hosts as f64,
        ));
    }

    observations
}
