use super::{
    Family,
    ScrapeBatch,
};
use parking_lot::RwLock;
use prometheus::{
    core::Collector as PrometheusCollector,
    proto::MetricFamily,
    Encoder as _,
    Gauge,
    GaugeVec,
    Histogram,
    HistogramOpts,
    IntCounter,
    Opts,
    Registry,
    TextEncoder,
};
use std::{
    collections::BTreeMap,
    time::Duration,
};
use strum::IntoEnumIterator as _;

/// Process-wide metric registry, created once at startup and shared (behind an `Arc`) by the
/// scheduler and the HTTP server.
///
/// Entity families are only ever written through [`MetricsRegistry::publish`], which swaps the
/// complete contents under a write lock. Readers gather under the read lock and therefore see
/// either the previous or the new scrape, never a mix of both. The self-monitoring counters and
/// the duration histogram are never reset.
pub struct MetricsRegistry {
    registry: Registry,
    families: BTreeMap<Family, GaugeVec>,
    scrape_duration: Histogram,
    scrape_errors: IntCounter,
    hosts_processed: IntCounter,
    job_templates_processed: IntCounter,
    last_success: Gauge,
    publish_lock: RwLock<()>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let mut families = BTreeMap::new();
        for family in Family::iter() {
            let gauge = GaugeVec::new(Opts::new(family.name(), family.help()), family.label_names())?;
            families.insert(family, register(&registry, gauge)?);
        }

        let scrape_duration = register(
            &registry,
            Histogram::with_opts(HistogramOpts::new(
                "awx_exporter_scrape_duration_seconds",
                "Duration of successful AWX API scrapes",
            ))?,
        )?;
        let scrape_errors = register(
            &registry,
            IntCounter::new(
                "awx_exporter_scrape_errors_total",
                "Total number of failed AWX API scrapes",
            )?,
        )?;
        let hosts_processed = register(
            &registry,
            IntCounter::new(
                "awx_exporter_hosts_processed_total",
                "Total number of hosts processed by the exporter",
            )?,
        )?;
        let job_templates_processed = register(
            &registry,
            IntCounter::new(
                "awx_exporter_job_templates_processed_total",
                "Total number of job templates processed by the exporter",
            )?,
        )?;
        let last_success = register(
            &registry,
            Gauge::new(
                "awx_exporter_last_success_timestamp_seconds",
                "Unix timestamp of the last successfully published scrape",
            )?,
        )?;

        Ok(Self {
            registry,
            families,
            scrape_duration,
            scrape_errors,
            hosts_processed,
            job_templates_processed,
            last_success,
            publish_lock: RwLock::new(()),
        })
    }

    /// Replaces the contents of every entity family with `batch`.
    ///
    /// The batch is validated up front, a rejected batch leaves the registry untouched.
    pub fn publish(&self, batch: &ScrapeBatch, elapsed: Duration) -> Result<(), prometheus::Error> {
        for observation in &batch.observations {
            let expect = observation.family.label_names().len();
            if observation.labels.len() != expect {
                return Err(prometheus::Error::InconsistentCardinality {
                    expect,
                    got: observation.labels.len(),
                });
            }
        }

        let _guard = self.publish_lock.write();
        for gauge in self.families.values() {
            gauge.reset();
        }
        for observation in &batch.observations {
            let Some(gauge) = self.families.get(&observation.family) else {
                continue;
            };
            let labels: Vec<&str> = observation.labels.iter().map(String::as_str).collect();
            gauge.get_metric_with_label_values(&labels)?.set(observation.value);
        }

        self.hosts_processed.inc_by(batch.hosts as u64);
        self.job_templates_processed.inc_by(batch.job_templates as u64);
        self.scrape_duration.observe(elapsed.as_secs_f64());
        self.last_success.set(chrono::Utc::now().timestamp() as f64);
        Ok(())
    }

    pub fn record_scrape_error(&self) {
        self.scrape_errors.inc();
    }

    pub fn scrape_errors(&self) -> u64 {
        self.scrape_errors.get()
    }

    pub fn hosts_processed(&self) -> u64 {
        self.hosts_processed.get()
    }

    pub fn successful_scrapes(&self) -> u64 {
        self.scrape_duration.get_sample_count()
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        let _guard = self.publish_lock.read();
        self.registry.gather()
    }

    /// Text exposition format of every registered family.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let families = self.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }

    /// Current values of the entity families, keyed by label values in schema order.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for metric_family in self.gather() {
            let Some(family) = Family::iter().find(|family| family.name() == metric_family.get_name()) else {
                continue;
            };
            for metric in metric_family.get_metric() {
                let labels = family
                    .label_names()
                    .iter()
                    .map(|name| {
                        metric
                            .get_label()
                            .iter()
                            .find(|pair| pair.get_name() == *name)
                            .map(|pair| pair.get_value().to_string())
                            .unwrap_or_default()
                    })
                    .collect();
                snapshot
                    .series
                    .entry(family)
                    .or_default()
                    .insert(labels, metric.get_gauge().get_value());
            }
        }
        snapshot
    }
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: PrometheusCollector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

/// Point-in-time copy of the entity families.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    series: BTreeMap<Family, BTreeMap<Vec<String>, f64>>,
}

impl Snapshot {
    pub fn len(&self, family: Family) -> usize {
        self.series.get(&family).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(BTreeMap::is_empty)
    }

    pub fn value(&self, family: Family, labels: &[&str]) -> Option<f64> {
        let key: Vec<String> = labels.iter().map(|label| label.to_string()).collect();
        self.series.get(&family)?.get(&key).copied()
    }

    pub fn series(&self, family: Family) -> impl Iterator<Item = (&[String], f64)> + '_ {
        self.series
            .get(&family)
            .into_iter()
            .flat_map(|series| series.iter().map(|(labels, value)| (labels.as_slice(), *value)))
    }

    /// Whether any series of any family carries `value` for the label called `name`.
    pub fn has_label(&self, name: &str, value: &str) -> bool {
        self.series.iter().any(|(family, series)| {
            family
                .label_names()
                .iter()
                .position(|label| *label == name)
                .is_some_and(|index| series.keys().any(|labels| labels[index] == value))
        })
    }
}
