use freightdesk_core::{CompiledQuery, ContentRange, CountQuery, RangeRequest, Result};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// One materialized record, as a JSON object.
pub type Row = serde_json::Map<String, JsonValue>;

/// Runs compiled queries against some backing store. Failures are returned
/// as-is to the caller; no retries happen at this layer.
#[async_trait::async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn fetch(&self, query: &CompiledQuery) -> Result<Vec<Row>>;
    async fn count(&self, query: &CountQuery) -> Result<u64>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub rows: Vec<Row>,
    pub total: u64,
}

impl Page {
    pub fn content_range(&self, range: Option<&RangeRequest>) -> String {
        ContentRange::format(range, self.total)
    }
}

/// Run the data and count queries concurrently.
pub async fn run_collection(
    executor: &dyn Executor,
    data: &CompiledQuery,
    count: &CountQuery,
) -> Result<Page> {
    let (rows, total) = futures::try_join!(executor.fetch(data), executor.count(count))?;
    Ok(Page { rows, total })
}
