use crate::error::CoreError;
use crate::model::{FilterCondition, FilterField, ResourceDescriptor, TypedValue, ValueType};

/// Turn raw `(param, value)` pairs into typed conditions, using the
/// descriptor as the allow-list. Conditions keep the order of the input and
/// combine with AND; params that are absent impose no constraint.
pub fn build_filters<'a, I>(descriptor: &ResourceDescriptor, params: I) -> Result<Vec<FilterCondition>, CoreError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    params
        .into_iter()
        .map(|(param, raw)| {
            let field = descriptor
                .filter_field(param)
                .ok_or_else(|| CoreError::UnknownFilterField(param.to_string()))?;
            Ok(FilterCondition {
                field: field.param,
                column: field.column,
                op: field.op,
                value: parse_value(field, raw)?,
            })
        })
        .collect()
}

/// Parse one raw value according to the field's type.
pub fn parse_value(field: &FilterField, raw: &str) -> Result<TypedValue, CoreError> {
    let invalid = |reason: String| CoreError::InvalidFilterValue {
        field: field.param.to_string(),
        value: raw.to_string(),
        reason,
    };

    match &field.value_type {
        ValueType::String | ValueType::Search => Ok(TypedValue::Text(raw.to_string())),
        ValueType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(TypedValue::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(TypedValue::Bool(false))
            } else {
                Err(invalid("expected true or false".to_string()))
            }
        }
        ValueType::Integer { min, max } => {
            let value: i64 = raw
                .parse()
                .map_err(|_| invalid("expected a base-10 integer".to_string()))?;
            if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
                return Err(invalid(format!(
                    "must be between {} and {}",
                    min.map_or("-inf".to_string(), |v| v.to_string()),
                    max.map_or("inf".to_string(), |v| v.to_string()),
                )));
            }
            Ok(TypedValue::Int(value))
        }
        ValueType::Enum(allowed) => allowed
            .iter()
            .find(|v| **v == raw)
            .map(|v| TypedValue::Enum(v.to_string()))
            .ok_or_else(|| invalid(format!("expected one of: {}", allowed.join(", ")))),
        ValueType::StringList => {
            let items: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if items.is_empty() {
                return Err(invalid("expected at least one value".to_string()));
            }
            Ok(TypedValue::TextList(items))
        }
    }
}

/// Escape `LIKE` wildcards so a search term only ever matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::logic::ResourceRegistry;
    use crate::model::FilterOp;

    fn registry() -> ResourceRegistry {
        ResourceRegistry::new(&PaginationConfig::default(), "atp").unwrap()
    }

    #[test]
    fn builds_typed_conditions_in_input_order() {
        let registry = registry();
        let training = registry.describe("training").unwrap();
        let filters = build_filters(
            training,
            vec![("label", "would_watch"), ("reviewed", "TRUE"), ("imdb_id", "tt0111161")],
        )
        .unwrap();

        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].column, "label");
        assert_eq!(filters[0].value, TypedValue::Enum("would_watch".to_string()));
        assert_eq!(filters[1].value, TypedValue::Bool(true));
        assert_eq!(filters[2].op, FilterOp::Eq);
    }

    #[test]
    fn no_params_means_no_constraint() {
        let registry = registry();
        let filters = build_filters(registry.describe("media").unwrap(), vec![]).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn undeclared_fields_are_rejected() {
        let registry = registry();
        let err = build_filters(
            registry.describe("training").unwrap(),
            vec![("label", "would_watch"), ("1=1; --", "x")],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnknownFilterField(f) if f == "1=1; --"));

        // a media-only field is not filterable on predictions
        let err = build_filters(registry.describe("prediction").unwrap(), vec![("hash", "abc")]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownFilterField(_)));
    }

    #[test]
    fn booleans_are_strict() {
        let registry = registry();
        let field = registry.describe("media").unwrap().filter_field("error_status").unwrap();
        assert_eq!(parse_value(field, "False").unwrap(), TypedValue::Bool(false));
        for raw in ["1", "yes", "", "truee"] {
            assert!(matches!(
                parse_value(field, raw),
                Err(CoreError::InvalidFilterValue { .. })
            ));
        }
    }

    #[test]
    fn enum_values_must_be_members() {
        let registry = registry();
        let field = registry.describe("media").unwrap().filter_field("pipeline_status").unwrap();
        assert!(parse_value(field, "metadata_collected").is_ok());
        let err = parse_value(field, "finished").unwrap_err();
        assert!(err.to_string().contains("complete"));
    }

    #[test]
    fn integers_respect_bounds() {
        let registry = registry();
        let field = registry.describe("prediction").unwrap().filter_field("prediction").unwrap();
        assert_eq!(parse_value(field, "1").unwrap(), TypedValue::Int(1));
        assert!(parse_value(field, "2").is_err());
        assert!(parse_value(field, "-1").is_err());
        assert!(parse_value(field, "one").is_err());
    }

    #[test]
    fn range_params_share_a_column() {
        let registry = registry();
        let movies = registry.describe("movies").unwrap();
        let filters = build_filters(movies, vec![("release_year_min", "1990"), ("release_year_max", "1999")]).unwrap();
        assert_eq!(filters[0].column, "release_year");
        assert_eq!(filters[0].op, FilterOp::Gte);
        assert_eq!(filters[1].column, "release_year");
        assert_eq!(filters[1].op, FilterOp::Lte);
    }

    #[test]
    fn id_lists_are_split_and_trimmed() {
        let registry = registry();
        let field = registry.describe("movies").unwrap().filter_field("imdb_id").unwrap();
        assert_eq!(
            parse_value(field, "tt1234567, tt7654321,,").unwrap(),
            TypedValue::TextList(vec!["tt1234567".to_string(), "tt7654321".to_string()])
        );
        assert!(parse_value(field, " , ").is_err());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
        assert_eq!(escape_like("the matrix"), "the matrix");
    }
}
