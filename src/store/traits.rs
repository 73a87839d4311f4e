use anyhow::Result;
use serde_json::Value;

use crate::model::{MutationResult, QuerySpec, UpdateStatement};

/// Executes validated statements. Every method is a single bounded statement;
/// timeouts, pooling and retries are the implementation's business.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Number of rows matching the query's filters, ignoring the window
    async fn count(&self, query: &QuerySpec) -> Result<i64>;
    /// One page of rows as JSON objects, in the query's order
    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Value>>;
    /// Apply a conditional update; `matched` is false when no row had the key
    async fn update(&self, statement: &UpdateStatement) -> Result<MutationResult>;
}
