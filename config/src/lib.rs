//! # Configuration
//!
//! Command line / environment handling for the AWX exporter.
//!
//! [`Args`] is what clap parses (every flag can also be given as an environment variable, e.g.
//! `AWX_HOST`, `AWX_USER`, `AWX_PASSWORD`, `SCRAPE_INTERVAL`, `PORT`). [`Config::from_args`]
//! validates these into a [`Config`]. Any [`ConfigError`] is meant to be fatal at startup.

mod args;
mod target;

pub use args::Args;
use std::{
    net::{
        Ipv4Addr,
        SocketAddr,
    },
    time::Duration,
};
pub use target::ScrapeTarget;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{var} environment variable is required")]
    Missing { var: &'static str },
    #[error("invalid duration {value:?} for {name}: {reason}")]
    InvalidDuration {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("invalid AWX host {host:?}: {reason}")]
    InvalidHost { host: String, reason: String },
    #[error("at least one scrape target must be configured")]
    NoTargets,
}

/// Basic-auth credentials for the AWX API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `{scheme}://{host}/`, relative pagination links are resolved against it.
    pub api_base: Url,
    pub credentials: Credentials,
    pub tls_insecure: bool,
    pub scrape_interval: Duration,
    pub request_timeout: Duration,
    pub max_pages: usize,
    pub targets: Vec<ScrapeTarget>,
    pub listen_address: SocketAddr,
    pub shutdown_grace: Duration,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let host = required(args.awx_host, "AWX_HOST")?;
        let user = required(args.awx_user, "AWX_USER")?;
        let password = required(args.awx_password, "AWX_PASSWORD")?;

        let api_base = api_base(host.trim(), args.http)?;
        let scrape_interval = parse_interval(&args.scrape_interval)?;
        let request_timeout = parse_duration("AWX_REQUEST_TIMEOUT", &args.request_timeout)?;
        let shutdown_grace = parse_duration("SHUTDOWN_GRACE", &args.shutdown_grace)?;

        let mut targets = Vec::with_capacity(args.targets.len());
        for target in args.targets {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        Ok(Self {
            api_base,
            credentials: Credentials { user, password },
            tls_insecure: args.tls_insecure,
            scrape_interval,
            request_timeout,
            max_pages: usize::try_from(args.max_pages).unwrap_or(usize::MAX),
            targets,
            listen_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port)),
            shutdown_grace,
        })
    }

    /// Host part of the API base, used for log lines.
    pub fn host(&self) -> &str {
        self.api_base.host_str().unwrap_or_default()
    }
}

/// A blank value counts as missing. Anything else is returned as given, credentials may carry
/// meaningful whitespace.
fn required(value: Option<String>, var: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { var }),
    }
}

fn api_base(host: &str, use_http: bool) -> Result<Url, ConfigError> {
    let raw = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        let scheme = if use_http { "http" } else { "https" };
        format!("{scheme}://{host}")
    };

    let invalid = |reason: String| ConfigError::InvalidHost {
        host: host.to_string(),
        reason,
    };
    let mut url = Url::parse(&raw).map_err(|err| invalid(err.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("no host name".to_string()));
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// A bare number is a count of minutes, anything else is a humantime duration.
fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let minutes: u64 = trimmed.parse().map_err(|err: std::num::ParseIntError| ConfigError::InvalidDuration {
            name: "SCRAPE_INTERVAL",
            value: value.to_string(),
            reason: err.to_string(),
        })?;
        return non_zero("SCRAPE_INTERVAL", value, Duration::from_secs(minutes.saturating_mul(60)));
    }
    parse_duration("SCRAPE_INTERVAL", value)
}

fn parse_duration(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value.trim()).map_err(|err| ConfigError::InvalidDuration {
        name,
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    non_zero(name, value, duration)
}

fn non_zero(name: &'static str, value: &str, duration: Duration) -> Result<Duration, ConfigError> {
    if duration.is_zero() {
        return Err(ConfigError::InvalidDuration {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}
