/// Failure of a single request against the AWX API.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("failed to build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API request to {url} failed with status {status}, body: {snippet}")]
    Api { url: String, status: u16, snippet: String },
    #[error("received HTML instead of JSON from {url} (likely a login or error page)")]
    UnexpectedContent { url: String },
}

/// Anything that aborts a scrape. The previously published metrics stay in place.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("error parsing JSON from {url}: {source} (response starts with: {preview})")]
    Decode {
        url: String,
        preview: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("pagination exceeded {limit} pages, last page was {url}")]
    PageLimit { limit: usize, url: String },
    #[error("cannot resolve next page link {next:?}: {source}")]
    InvalidNext {
        next: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to publish metrics: {0}")]
    Registry(#[from] prometheus::Error),
}

/// A single timestamp field that could not be read. Only the affected metric is skipped.
#[derive(thiserror::Error, Debug)]
#[error("cannot parse timestamp {value:?}: {source}")]
pub struct TimestampParseError {
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// First `max_chars` characters of a response body for diagnostics.
pub(crate) fn preview(body: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(body);
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
