use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::logic::filter::escape_like;
use crate::model::{AssignedValue, FilterCondition, FilterOp, MutationResult, QuerySpec, TypedValue, UpdateStatement};
use crate::store::traits::RecordStore;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresStore {
    async fn count(&self, query: &QuerySpec) -> Result<i64> {
        let mut builder = count_query(query);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {} records", query.resource))
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Value>> {
        let mut builder = select_query(query);
        builder
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch {} records", query.resource))
    }

    async fn update(&self, statement: &UpdateStatement) -> Result<MutationResult> {
        let mut builder = update_query(statement);
        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to update {}", statement.table))?;

        Ok(MutationResult {
            matched: row.is_some(),
        })
    }
}

/// `SELECT COUNT(*)` under the query's filters.
pub fn count_query(query: &QuerySpec) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(&query.table);
    push_filters(&mut builder, &query.filters);
    builder
}

/// One page of rows, each rendered as a JSON object by the database.
pub fn select_query(query: &QuerySpec) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT row_to_json(t) AS record FROM ");
    builder.push(&query.table).push(" t");
    push_filters(&mut builder, &query.filters);

    builder
        .push(" ORDER BY ")
        .push(query.sort.field)
        .push(" ")
        .push(query.sort.direction.as_sql());
    for column in &query.sort.tiebreak {
        builder.push(", ").push(*column).push(" ASC");
    }

    builder.push(" LIMIT ").push_bind(query.limit);
    builder.push(" OFFSET ").push_bind(query.offset);
    builder
}

/// `UPDATE ... WHERE pk = $n RETURNING pk`: no returned row means no match.
pub fn update_query(statement: &UpdateStatement) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(&statement.table).push(" SET ");

    for (i, (column, value)) in statement.assignments.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(*column).push(" = ");
        match value {
            // Goes through the column's own input function, so text and
            // PostgreSQL enum columns both accept the label.
            AssignedValue::Bind(TypedValue::Enum(label)) => {
                builder
                    .push("(json_populate_record(NULL::")
                    .push(&statement.table)
                    .push(", json_build_object('")
                    .push(*column)
                    .push("', ")
                    .push_bind(label.clone())
                    .push("::text))).")
                    .push(*column);
            }
            AssignedValue::Bind(value) => push_value(&mut builder, value),
            AssignedValue::Now => {
                builder.push("NOW()");
            }
        }
    }

    builder
        .push(" WHERE ")
        .push(statement.primary_key)
        .push(" = ")
        .push_bind(statement.key.clone())
        .push(" RETURNING ")
        .push(statement.primary_key);
    builder
}

fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, filters: &[FilterCondition]) {
    for (i, condition) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(condition.column);
        if matches!(condition.value, TypedValue::Enum(_)) {
            // compares against text and PostgreSQL enum columns alike
            builder.push("::text");
        }

        match (condition.op, &condition.value) {
            (FilterOp::Contains, TypedValue::Text(term)) => {
                builder
                    .push(" ILIKE ")
                    .push_bind(format!("%{}%", escape_like(term)))
                    .push(" ESCAPE '\\'");
            }
            (FilterOp::AnyOf, value) => {
                builder.push(" = ANY(");
                push_value(builder, value);
                builder.push(")");
            }
            (op, value) => {
                builder.push(match op {
                    FilterOp::Gte => " >= ",
                    FilterOp::Lte => " <= ",
                    _ => " = ",
                });
                push_value(builder, value);
            }
        }
    }
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &TypedValue) {
    match value {
        TypedValue::Text(v) | TypedValue::Enum(v) => builder.push_bind(v.clone()),
        TypedValue::Bool(v) => builder.push_bind(*v),
        TypedValue::Int(v) => builder.push_bind(*v),
        TypedValue::TextList(v) => builder.push_bind(v.clone()),
    };
}
