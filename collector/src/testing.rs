//! Fixtures for tests that talk to a mocked AWX API.

use crate::{
    client::{
        AwxClient,
        DEFAULT_TIMEOUT,
    },
    collectors::Orchestrator,
    metrics::MetricsRegistry,
    pagination::DEFAULT_MAX_PAGES,
};
use awx_exporter_config::{
    Credentials,
    ScrapeTarget,
};
use serde_json::{
    json,
    Value,
};
use std::sync::Arc;
use url::Url;
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

pub const HOSTS_PATH: &str = "/api/v2/hosts/";
pub const JOB_TEMPLATES_PATH: &str = "/api/v2/job_templates";

pub fn host_json(id: i64, name: &str, groups: &[(i64, &str)]) -> Value {
    let groups: Vec<Value> = groups.iter().map(|(id, name)| json!({ "id": id, "name": name })).collect();
    json!({
        "id": id,
        "type": "host",
        "created": "2024-01-02T03:04:05.123456Z",
        "modified": "2024-01-03T03:04:05Z",
        "name": name,
        "inventory": 3,
        "enabled": true,
        "instance_id": "",
        "has_active_failures": false,
        "has_inventory_sources": true,
        "ansible_facts_modified": null,
        "summary_fields": {
            "inventory": { "id": 3, "name": "prod" },
            "groups": { "count": groups.len(), "results": groups }
        }
    })
}

pub fn job_template_json(id: i64, name: &str, failed: u64, total: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "last_job_run": "2024-01-05T00:00:00Z",
        "summary_fields": {
            "inventory": { "id": 3, "hosts_with_active_failures": failed, "total_hosts": total }
        }
    })
}

pub fn page(results: Vec<Value>, next: Option<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "count": results.len(),
        "next": next,
        "previous": null,
        "results": results,
    }))
}

/// Serves `pages` of `endpoint`, page `n > 1` is addressed by `?page=n`.
pub async fn mount_pages(server: &MockServer, endpoint: &str, pages: Vec<Vec<Value>>) {
    let total = pages.len();
    for (index, results) in pages.into_iter().enumerate() {
        let number = index + 1;
        let next = (number < total).then(|| format!("{endpoint}?format=json&page={}", number + 1));
        mount_page(server, endpoint, number, page(results, next)).await;
    }
}

pub async fn mount_page(server: &MockServer, endpoint: &str, number: usize, response: ResponseTemplate) {
    let mock = Mock::given(method("GET")).and(path(endpoint));
    if number == 1 {
        mock.respond_with(response).with_priority(10).mount(server).await;
    } else {
        mock.and(query_param("page", number.to_string()))
            .respond_with(response)
            .mount(server)
            .await;
    }
}

pub fn client(server: &MockServer) -> AwxClient {
    let credentials = Credentials {
        user: "admin".to_string(),
        password: "password".to_string(),
    };
    AwxClient::new(Url::parse(&server.uri()).unwrap(), credentials, DEFAULT_TIMEOUT, false).unwrap()
}

pub fn orchestrator(server: &MockServer, targets: &[ScrapeTarget]) -> Orchestrator {
    let registry = Arc::new(MetricsRegistry::new().unwrap());
    Orchestrator::new(client(server), DEFAULT_MAX_PAGES, targets, registry)
}
