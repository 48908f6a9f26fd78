use crate::error::{
    preview,
    FetchError,
};
use awx_exporter_config::{
    Config,
    Credentials,
};
use bytes::Bytes;
use reqwest::header::{
    HeaderValue,
    ACCEPT,
};
use std::time::Duration;
use tracing::trace;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_IDLE_PER_HOST: usize = 10;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const SNIPPET_CHARS: usize = 200;
const USER_AGENT: &str = concat!("awx-exporter/", env!("CARGO_PKG_VERSION"));

/// Authenticated, timeout-bounded GET access to the AWX API.
///
/// Cloning is cheap, all clones share one connection pool. A scrape issues many sequential
/// requests against the same host, so idle connections are kept around between pages.
#[derive(Clone)]
pub struct AwxClient {
    http: reqwest::Client,
    base: Url,
    credentials: Credentials,
}

impl AwxClient {
    pub fn new(base: Url, credentials: Credentials, timeout: Duration, tls_insecure: bool) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .danger_accept_invalid_certs(tls_insecure)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            config.api_base.clone(),
            config.credentials.clone(),
            config.request_timeout,
            config.tls_insecure,
        )
    }

    /// `{scheme}://{host}/` that relative links are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Fetches `url` and returns the raw body of a successful JSON response.
    pub async fn get(&self, url: &Url) -> Result<Bytes, FetchError> {
        trace!(%url, "GET");
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url.clone())
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(FetchError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                snippet: preview(&body, SNIPPET_CHARS),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        if looks_like_html(&body) {
            return Err(FetchError::UnexpectedContent { url: url.to_string() });
        }

        Ok(body)
    }
}

fn looks_like_html(body: &[u8]) -> bool {
    const MARKER: &[u8] = b"<html";
    body.windows(MARKER.len()).any(|window| window.eq_ignore_ascii_case(MARKER))
}
