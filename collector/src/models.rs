//! # AWX API payloads
//!
//! Only the fields the exporter turns into metrics are modelled. Missing and `null` fields fall
//! back to their defaults so that schema drift in unrelated parts of AWX does not abort a scrape.

use serde::{
    Deserialize,
    Deserializer,
};

/// Envelope of every paginated AWX listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    /// Absolute or host-relative URL of the next page. `null`, `""` and `"/"` mean there is none.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Host {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created: String,
    #[serde(deserialize_with = "null_as_default")]
    pub modified: String,
    #[serde(deserialize_with = "null_as_default")]
    pub inventory: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub instance_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub has_active_failures: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_inventory_sources: bool,
    pub ansible_facts_modified: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_fields: HostSummaryFields,
}

impl Host {
    pub fn groups(&self) -> &[Group] {
        &self.summary_fields.groups.results
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostSummaryFields {
    #[serde(deserialize_with = "null_as_default")]
    pub inventory: InventoryRef,
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Groups,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InventoryRef {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Groups {
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<Group>,
}

/// Group as embedded in a host's summary. It belongs to the inventory of the reporting host.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Group {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobTemplate {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub last_job_run: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_fields: JobTemplateSummaryFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobTemplateSummaryFields {
    /// Absent for templates that prompt for an inventory on launch.
    pub inventory: Option<InventoryHealth>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InventoryHealth {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub hosts_with_active_failures: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_hosts: u64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_host_page() {
        let page: Page<Host> = serde_json::from_str(
            r#"{
                "count": 1,
                "next": "/api/v2/hosts/?format=json&page=2",
                "previous": null,
                "results": [{
                    "id": 7,
                    "type": "host",
                    "created": "2024-01-02T03:04:05.123456Z",
                    "modified": "2024-02-03T04:05:06Z",
                    "name": "web-1",
                    "inventory": 3,
                    "enabled": true,
                    "instance_id": null,
                    "has_active_failures": false,
                    "has_inventory_sources": true,
                    "ansible_facts_modified": null,
                    "summary_fields": {
                        "inventory": {"id": 3, "name": "prod", "kind": ""},
                        "groups": {"count": 1, "results": [{"id": 11, "name": "web"}]}
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(page.next.as_deref(), Some("/api/v2/hosts/?format=json&page=2"));
        let host = &page.results[0];
        assert_eq!(host.id, 7);
        assert_eq!(host.instance_id, "");
        assert!(host.ansible_facts_modified.is_none());
        assert_eq!(host.summary_fields.inventory.name, "prod");
        assert_eq!(host.groups(), &[Group { id: 11, name: "web".to_string() }]);
    }

    #[test]
    fn decodes_job_template_without_inventory() {
        let page: Page<JobTemplate> = serde_json::from_str(
            r#"{"count": 1, "next": null, "results": [
                {"id": 4, "name": "deploy", "last_job_run": null, "summary_fields": {}}
            ]}"#,
        )
        .unwrap();
        let template = &page.results[0];
        assert!(template.last_job_run.is_none());
        assert!(template.summary_fields.inventory.is_none());
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let page: Page<Host> = serde_json::from_str(
            r#"{
                "count": null,
                "next": null,
                "results": [{
                    "id": 9,
                    "name": "orphan",
                    "created": "2024-01-02T03:04:05Z",
                    "inventory": null,
                    "enabled": null,
                    "has_active_failures": null,
                    "has_inventory_sources": true,
                    "summary_fields": {"inventory": null, "groups": null}
                }, {
                    "id": 10,
                    "name": "sparse",
                    "summary_fields": {
                        "inventory": {"id": null, "name": "prod"},
                        "groups": {"count": 1, "results": null}
                    }
                }, {
                    "id": 11,
                    "name": "bare",
                    "summary_fields": null
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(page.count, 0);
        let orphan = &page.results[0];
        assert_eq!(orphan.id, 9);
        assert_eq!(orphan.inventory, 0);
        assert!(!orphan.enabled);
        assert!(!orphan.has_active_failures);
        assert!(orphan.has_inventory_sources);
        assert_eq!(orphan.summary_fields.inventory.id, 0);
        assert_eq!(orphan.summary_fields.inventory.name, "");
        assert!(orphan.groups().is_empty());

        let sparse = &page.results[1];
        assert_eq!(sparse.summary_fields.inventory.id, 0);
        assert_eq!(sparse.summary_fields.inventory.name, "prod");
        assert!(sparse.groups().is_empty());

        assert!(page.results[2].groups().is_empty());
    }

    #[test]
    fn job_template_with_null_counts() {
        let page: Page<JobTemplate> = serde_json::from_str(
            r#"{"results": [{
                "id": 4,
                "name": null,
                "summary_fields": {"inventory": {"id": 3, "hosts_with_active_failures": null, "total_hosts": 12}}
            }, {
                "id": 5,
                "name": "adhoc",
                "summary_fields": null
            }]}"#,
        )
        .unwrap();

        let inventory = page.results[0].summary_fields.inventory.as_ref().unwrap();
        assert_eq!(page.results[0].name, "");
        assert_eq!(inventory.hosts_with_active_failures, 0);
        assert_eq!(inventory.total_hosts, 12);
        assert!(page.results[1].summary_fields.inventory.is_none());
    }

    #[test]
    fn page_without_results_is_rejected() {
        let result = serde_json::from_str::<Page<Host>>(r#"{"detail": "Authentication credentials were not provided."}"#);
        assert!(result.is_err());
    }
}
