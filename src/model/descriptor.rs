use crate::model::{FilterOp, SortDirection};

/// How a raw query-string value is parsed for a filter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    /// Exactly `true` / `false`, case-insensitive
    Boolean,
    /// Base-10 integer, optionally bounded (inclusive)
    Integer { min: Option<i64>, max: Option<i64> },
    Enum(&'static [&'static str]),
    /// Case-insensitive partial match
    Search,
    /// Comma-separated list, matched by membership
    StringList,
}

impl ValueType {
    pub const fn bounded(min: i64, max: i64) -> Self {
        ValueType::Integer {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// One entry of a resource's filter allow-list.
///
/// `param` is the query-string name clients use, `column` the store column
/// the predicate applies to. Range filters use distinct params that share a
/// column (`release_year_min` / `release_year_max` -> `release_year`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    pub param: &'static str,
    pub column: &'static str,
    pub value_type: ValueType,
    pub op: FilterOp,
}

impl FilterField {
    /// Filter whose param names its column, with the operator implied by the type.
    pub fn new(name: &'static str, value_type: ValueType) -> Self {
        let op = match value_type {
            ValueType::Search => FilterOp::Contains,
            ValueType::StringList => FilterOp::AnyOf,
            _ => FilterOp::Eq,
        };
        Self {
            param: name,
            column: name,
            value_type,
            op,
        }
    }

    pub fn at_least(param: &'static str, column: &'static str, value_type: ValueType) -> Self {
        Self {
            param,
            column,
            value_type,
            op: FilterOp::Gte,
        }
    }

    pub fn at_most(param: &'static str, column: &'static str, value_type: ValueType) -> Self {
        Self {
            param,
            column,
            value_type,
            op: FilterOp::Lte,
        }
    }
}

/// Shape of identifiers accepted in mutation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    /// `tt` followed by 7 or 8 digits
    ImdbId,
    /// 40 lowercase hexadecimal characters
    Sha1Hex,
}

impl IdFormat {
    pub fn matches(&self, id: &str) -> bool {
        match self {
            IdFormat::ImdbId => id
                .strip_prefix("tt")
                .map(|digits| {
                    (7..=8).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
                })
                .unwrap_or(false),
            IdFormat::Sha1Hex => {
                id.len() == 40 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            IdFormat::ImdbId => "tt followed by 7-8 digits",
            IdFormat::Sha1Hex => "a 40-character lowercase hexadecimal string",
        }
    }
}

/// Allowed values of a mutable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDomain {
    Enum(&'static [&'static str]),
    Boolean,
}

/// A field clients may change through `PATCH /{resource}/{id}/{segment}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableField {
    /// URL path segment, e.g. `rejection-status`
    pub segment: &'static str,
    /// Column written, also the JSON body key carrying the new value
    pub column: &'static str,
    pub domain: FieldDomain,
    /// Columns forced to a fixed value alongside the target column
    pub side_effects: &'static [(&'static str, bool)],
    /// Optional second column the client may set in the same update
    pub companion: Option<CompanionField>,
    pub success_message: &'static str,
}

/// A column written alongside a [`MutableField`] only when the body carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionField {
    /// Column written, also the JSON body key
    pub column: &'static str,
    pub domain: FieldDomain,
}

/// Static allow-list and shape of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    /// Schema-qualified table or view
    pub table: String,
    pub primary_key: &'static [&'static str],
    /// Body key carrying the identifier in mutation requests
    pub id_field: &'static str,
    pub id_format: Option<IdFormat>,
    pub filterable: Vec<FilterField>,
    pub sortable: &'static [&'static str],
    pub default_sort_field: &'static str,
    pub default_sort_direction: SortDirection,
    pub max_limit: i64,
    pub mutable: Vec<MutableField>,
}

impl ResourceDescriptor {
    pub fn filter_field(&self, param: &str) -> Option<&FilterField> {
        self.filterable.iter().find(|f| f.param == param)
    }

    pub fn sortable_field(&self, field: &str) -> Option<&'static str> {
        self.sortable.iter().copied().find(|f| *f == field)
    }

    pub fn mutable_field(&self, segment: &str) -> Option<&MutableField> {
        self.mutable.iter().find(|m| m.segment == segment)
    }

    pub fn is_read_only(&self) -> bool {
        self.mutable.is_empty()
    }
}
