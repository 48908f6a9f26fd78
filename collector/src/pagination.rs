use crate::{
    client::AwxClient,
    error::{
        preview,
        ScrapeError,
    },
    models::Page,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 10_000;
const PREVIEW_CHARS: usize = 200;

/// Turns a `next` link into the URL to fetch, or `None` when pagination is exhausted.
///
/// Absolute links are used verbatim. Everything else is resolved against the scheme and host of
/// `base`, with a leading `/` added when missing.
pub fn resolve_next(base: &Url, next: Option<&str>) -> Result<Option<Url>, ScrapeError> {
    let next = match next.map(str::trim) {
        None | Some("") | Some("/") => return Ok(None),
        Some(next) => next,
    };

    let invalid = |source| ScrapeError::InvalidNext {
        next: next.to_string(),
        source,
    };

    if next.starts_with("http://") || next.starts_with("https://") {
        return Url::parse(next).map(Some).map_err(invalid);
    }

    let relative = if next.starts_with('/') {
        next.to_string()
    } else {
        format!("/{next}")
    };
    base.join(&relative).map(Some).map_err(invalid)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: usize,
    pub entities: usize,
}

/// Follows `next` links of a paginated listing and hands every decoded page to a callback.
///
/// A page that fails to download or decode aborts the whole walk. The walker itself keeps no
/// entities.
pub struct PageWalker {
    client: AwxClient,
    max_pages: usize,
}

impl PageWalker {
    pub fn new(client: AwxClient, max_pages: usize) -> Self {
        Self {
            client,
            max_pages: max_pages.max(1),
        }
    }

    pub fn client(&self) -> &AwxClient {
        &self.client
    }

    pub async fn walk<T, F>(&self, start_path: &str, mut on_page: F) -> Result<WalkSummary, ScrapeError>
    where
        T: DeserializeOwned + Send,
        F: FnMut(Vec<T>) + Send,
    {
        let mut summary = WalkSummary::default();
        let mut next_url = resolve_next(self.client.base(), Some(start_path))?;

        while let Some(url) = next_url {
            if summary.pages >= self.max_pages {
                return Err(ScrapeError::PageLimit {
                    limit: self.max_pages,
                    url: url.to_string(),
                });
            }

            let body = self.client.get(&url).await?;
            let page: Page<T> = serde_json::from_slice(&body).map_err(|source| ScrapeError::Decode {
                url: url.to_string(),
                preview: preview(&body, PREVIEW_CHARS),
                source,
            })?;

            summary.pages += 1;
            summary.entities += page.results.len();
            debug!(page = summary.pages, entities = page.results.len(), total = page.count, %url, "fetched page");

            next_url = resolve_next(self.client.base(), page.next.as_deref())?;
            on_page(page.results);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::DEFAULT_TIMEOUT;
    use awx_exporter_config::Credentials;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use wiremock::{
        matchers::{
            method,
            path,
            query_param,
        },
        Mock,
        MockServer,
        ResponseTemplate,
    };

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    fn base() -> Url {
        Url::parse("https://awx.example.com/").unwrap()
    }

    fn walker(server: &MockServer, max_pages: usize) -> PageWalker {
        let credentials = Credentials {
            user: "user".to_string(),
            password: "pass".to_string(),
        };
        let client = AwxClient::new(Url::parse(&server.uri()).unwrap(), credentials, DEFAULT_TIMEOUT, false).unwrap();
        PageWalker::new(client, max_pages)
    }

    fn page(ids: &[u32], next: serde_json::Value) -> ResponseTemplate {
        let results: Vec<_> = ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": ids.len(),
            "next": next,
            "previous": null,
            "results": results,
        }))
    }

    #[test]
    fn end_of_pagination_sentinels() {
        assert_eq!(resolve_next(&base(), None).unwrap(), None);
        assert_eq!(resolve_next(&base(), Some("")).unwrap(), None);
        assert_eq!(resolve_next(&base(), Some("/")).unwrap(), None);
    }

    #[test]
    fn relative_and_absolute_links() {
        assert_eq!(
            resolve_next(&base(), Some("/api/v2/hosts/?format=json&page=2"))
                .unwrap()
                .unwrap()
                .as_str(),
            "https://awx.example.com/api/v2/hosts/?format=json&page=2"
        );
        assert_eq!(
            resolve_next(&base(), Some("api/v2/hosts/?page=3")).unwrap().unwrap().as_str(),
            "https://awx.example.com/api/v2/hosts/?page=3"
        );
        assert_eq!(
            resolve_next(&base(), Some("http://other.example.com/api/v2/hosts/?page=4"))
                .unwrap()
                .unwrap()
                .as_str(),
            "http://other.example.com/api/v2/hosts/?page=4"
        );
    }

    #[test]
    fn relative_links_keep_the_configured_port() {
        let base = Url::parse("http://127.0.0.1:8052/").unwrap();
        assert_eq!(
            resolve_next(&base, Some("/api/v2/hosts/?page=2")).unwrap().unwrap().as_str(),
            "http://127.0.0.1:8052/api/v2/hosts/?page=2"
        );
    }

    #[tokio::test]
    async fn follows_next_links_until_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/items/"))
            .and(query_param("page", "2"))
            .respond_with(page(&[3, 4], serde_json::json!(format!("{}/api/v2/items/?page=3", server.uri()))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/items/"))
            .and(query_param("page", "3"))
            .respond_with(page(&[5], serde_json::json!("/")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/items/"))
            .respond_with(page(&[1, 2], serde_json::json!("/api/v2/items/?page=2")))
            .with_priority(10)
            .expect(1)
            .mount(&server)
            .await;

        let mut seen = Vec::new();
        let summary = walker(&server, DEFAULT_MAX_PAGES)
            .walk::<Item, _>("/api/v2/items/", |items| seen.extend(items.into_iter().map(|item| item.id)))
            .await
            .unwrap();

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(summary, WalkSummary { pages: 3, entities: 5 });
    }

    #[tokio::test]
    async fn null_next_stops_after_one_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/items/"))
            .respond_with(page(&[1], serde_json::Value::Null))
            .expect(1)
            .mount(&server)
            .await;

        let summary = walker(&server, DEFAULT_MAX_PAGES)
            .walk::<Item, _>("/api/v2/items/", |_| {})
            .await
            .unwrap();
        assert_eq!(summary.pages, 1);
    }

    #[tokio::test]
    async fn self_referencing_next_hits_the_page_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/items/"))
            .respond_with(page(&[1], serde_json::json!("/api/v2/items/")))
            .expect(3)
            .mount(&server)
            .await;

        let result = walker(&server, 3).walk::<Item, _>("/api/v2/items/", |_| {}).await;
        assert!(matches!(result, Err(ScrapeError::PageLimit { limit: 3, .. })), "{result:?}");
    }

    #[tokio::test]
    async fn malformed_page_aborts_the_walk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/items/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"results\": [tru"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/items/"))
            .respond_with(page(&[1], serde_json::json!("/api/v2/items/?page=2")))
            .with_priority(10)
            .mount(&server)
            .await;

        let mut pages = 0;
        let result = walker(&server, DEFAULT_MAX_PAGES)
            .walk::<Item, _>("/api/v2/items/", |_| pages += 1)
            .await;
        match result {
            Err(ScrapeError::Decode { preview, .. }) => assert_eq!(preview, "{\"results\": [tru"),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert_eq!(pages, 1);
    }
}
