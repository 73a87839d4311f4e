use serde::Serialize;

/// Predicate operator applied to a filter column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    Contains,
    AnyOf,
}

/// Parsed filter value, always bound as a statement parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Text(String),
    /// Member of a fixed label set; the column may be text or a PostgreSQL enum
    Enum(String),
    Bool(bool),
    Int(i64),
    TextList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCondition {
    /// Query parameter the condition came from
    pub field: &'static str,
    pub column: &'static str,
    pub op: FilterOp,
    pub value: TypedValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Accepts `asc` / `desc` in any case.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Resolved ordering: the requested key plus primary-key tiebreakers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub direction: SortDirection,
    /// Appended ascending after `field`
    pub tiebreak: Vec<&'static str>,
}

/// A fully validated read against one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub resource: &'static str,
    pub table: String,
    pub filters: Vec<FilterCondition>,
    pub sort: SortSpec,
    pub limit: i64,
    pub offset: i64,
}
