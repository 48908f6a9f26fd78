use crate::{
    error::ScrapeError,
    metrics::ScrapeBatch,
    pagination::PageWalker,
};
use std::{
    future::Future,
    pin::Pin,
};

/// One AWX endpoint family turned into metric observations.
pub trait Collector: Send + Sync {
    /// Walk every page of the endpoint and append the derived observations to `batch`.
    fn collect<'a>(
        &'a self,
        walker: &'a PageWalker,
        batch: &'a mut ScrapeBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), ScrapeError>> + Send + 'a>>;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}
