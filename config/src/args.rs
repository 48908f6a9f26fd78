use crate::ScrapeTarget;
use clap::Parser;

/// AWX Prometheus exporter
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// AWX host, optionally with port (e.g. `awx.example.com:8043`). A value with an explicit
    /// `http://` or `https://` scheme is used as-is.
    #[arg(long, env = "AWX_HOST")]
    pub awx_host: Option<String>,

    /// User for basic authentication against the AWX API.
    #[arg(long, env = "AWX_USER")]
    pub awx_user: Option<String>,

    /// Password for basic authentication against the AWX API.
    #[arg(long, env = "AWX_PASSWORD", hide_env_values = true)]
    pub awx_password: Option<String>,

    /// Talk plain HTTP to AWX instead of HTTPS.
    #[arg(long, action, env = "HTTP")]
    pub http: bool,

    /// Skip verification of the AWX TLS certificate.
    #[arg(long, action, env = "TLS_INSECURE")]
    pub tls_insecure: bool,

    /// Time between two scrapes (e.g. "30s", "5m"). A bare number is read as minutes.
    #[arg(long, env = "SCRAPE_INTERVAL", default_value = "5m")]
    pub scrape_interval: String,

    /// Port the metrics server listens on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Deadline for a single request against the AWX API.
    #[arg(long, env = "AWX_REQUEST_TIMEOUT", default_value = "30s")]
    pub request_timeout: String,

    /// Upper bound of pages followed per endpoint before a scrape is aborted.
    #[arg(long, env = "AWX_MAX_PAGES", default_value_t = 10_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_pages: u64,

    /// Which AWX endpoints to export.
    #[arg(
        long,
        env = "AWX_SCRAPE_TARGETS",
        value_delimiter = ',',
        default_value = "hosts,job-templates"
    )]
    pub targets: Vec<ScrapeTarget>,

    /// Upper bound for draining open HTTP connections on shutdown.
    #[arg(long, env = "SHUTDOWN_GRACE", default_value = "30s")]
    pub shutdown_grace: String,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("awx_host", &self.awx_host)
            .field("awx_user", &self.awx_user)
            .field("awx_password", &self.awx_password.as_ref().map(|_| "***"))
            .field("http", &self.http)
            .field("tls_insecure", &self.tls_insecure)
            .field("scrape_interval", &self.scrape_interval)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("max_pages", &self.max_pages)
            .field("targets", &self.targets)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}
