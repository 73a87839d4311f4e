use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Response body of every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEnvelope {
    pub data: Vec<Value>,
    pub pagination: Pagination,
}
