use strum::{
    Display,
    EnumString,
};

/// AWX endpoint family that is walked and exported on every scrape.
#[derive(Debug, Clone, Copy, Display, EnumString, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum ScrapeTarget {
    Hosts,
    JobTemplates,
}

impl ScrapeTarget {
    /// First page of the paginated listing, relative to the API base.
    pub fn start_path(&self) -> &'static str {
        match self {
            ScrapeTarget::Hosts => "/api/v2/hosts/?format=json",
            ScrapeTarget::JobTemplates => "/api/v2/job_templates",
        }
    }
}
