use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{bail, Result};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::model::{
    AssignedValue, FilterCondition, FilterOp, MutationResult, QuerySpec, SortDirection, TypedValue, UpdateStatement,
};
use crate::store::traits::RecordStore;

/// Statement kinds seen by [`MemoryStore`], with the table they targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Count(String),
    Fetch(String),
    Update(String),
}

/// In-process store over JSON rows, keyed by schema-qualified table name.
/// Test double only; built for unit tests and behind the `test-support`
/// feature for the integration tests.
///
/// Follows PostgreSQL ordering rules closely enough for paging tests
/// (NULLs sort last ascending, first descending) and records every call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    calls: Mutex<Vec<StoreCall>>,
    failure: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.write().insert(table.to_string(), rows);
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Make every following call fail with `message`, or succeed again with `None`.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock() = message.map(str::to_string);
    }

    fn record(&self, call: StoreCall) -> Result<()> {
        self.calls.lock().push(call);
        if let Some(message) = self.failure.lock().as_ref() {
            bail!("{}", message);
        }
        Ok(())
    }

    fn matching(&self, query: &QuerySpec) -> Vec<Value> {
        self.tables
            .read()
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|c| matches_condition(row, c)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn count(&self, query: &QuerySpec) -> Result<i64> {
        self.record(StoreCall::Count(query.table.clone()))?;
        Ok(self.matching(query).len() as i64)
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Value>> {
        self.record(StoreCall::Fetch(query.table.clone()))?;
        let mut rows = self.matching(query);
        rows.sort_by(|a, b| {
            let primary = compare(field(a, query.sort.field), field(b, query.sort.field));
            let primary = match query.sort.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            query
                .sort
                .tiebreak
                .iter()
                .fold(primary, |ord, column| ord.then_with(|| compare(field(a, column), field(b, column))))
        });

        Ok(rows
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn update(&self, statement: &UpdateStatement) -> Result<MutationResult> {
        self.record(StoreCall::Update(statement.table.clone()))?;
        let mut tables = self.tables.write();
        let row = tables.get_mut(&statement.table).and_then(|rows| {
            rows.iter_mut()
                .find(|row| field(row, statement.primary_key).as_str() == Some(statement.key.as_str()))
        });

        let Some(Value::Object(row)) = row else {
            return Ok(MutationResult { matched: false });
        };

        for (column, value) in &statement.assignments {
            let value = match value {
                AssignedValue::Bind(value) => serde_json::to_value(value)?,
                AssignedValue::Now => Value::String(chrono::Utc::now().to_rfc3339()),
            };
            row.insert(column.to_string(), value);
        }

        Ok(MutationResult { matched: true })
    }
}

fn field<'a>(row: &'a Value, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn matches_condition(row: &Value, condition: &FilterCondition) -> bool {
    let actual = field(row, condition.column);
    match (condition.op, &condition.value) {
        (FilterOp::Eq, TypedValue::Text(v) | TypedValue::Enum(v)) => actual.as_str() == Some(v.as_str()),
        (FilterOp::Eq, TypedValue::Bool(v)) => actual.as_bool() == Some(*v),
        (FilterOp::Eq, TypedValue::Int(v)) => actual.as_i64() == Some(*v),
        (FilterOp::Gte, TypedValue::Int(v)) => actual.as_i64().is_some_and(|a| a >= *v),
        (FilterOp::Lte, TypedValue::Int(v)) => actual.as_i64().is_some_and(|a| a <= *v),
        (FilterOp::Contains, TypedValue::Text(term)) => actual
            .as_str()
            .is_some_and(|a| a.to_lowercase().contains(&term.to_lowercase())),
        (FilterOp::AnyOf, TypedValue::TextList(items)) => {
            actual.as_str().is_some_and(|a| items.iter().any(|item| item == a))
        }
        _ => false,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
