use serde_json::Value;

use crate::error::CoreError;
use crate::model::{
    AssignedValue, FieldDomain, MutableField, MutationRequest, MutationResult, ResourceDescriptor, TypedValue,
    UpdateStatement,
};

/// A mutation that passed every check and is ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMutation<'a> {
    pub field: &'a MutableField,
    pub statement: UpdateStatement,
}

/// Validate a mutation without touching the store.
///
/// Checks run in a fixed order: known field, identifiers agree, identifier
/// well-formed, value in the field's domain, companion value (when sent) in
/// its domain. The resulting statement sets the target column, the companion
/// column, any fixed side-effect columns and `updated_at`, and is
/// keyed on the primary key alone so at most one row can change.
pub fn validate_mutation<'a>(
    descriptor: &'a ResourceDescriptor,
    request: &MutationRequest,
) -> Result<ValidatedMutation<'a>, CoreError> {
    let field = descriptor.mutable_field(&request.target_field).ok_or_else(|| {
        CoreError::invalid_parameter(
            "field",
            format!("'{}' is not a mutable field of {}", request.target_field, descriptor.name),
        )
    })?;

    if request.body_identifier.as_deref() != Some(request.path_identifier.as_str()) {
        return Err(CoreError::IdentifierMismatch {
            path: request.path_identifier.clone(),
            body: request.body_identifier.clone(),
        });
    }

    if let Some(format) = descriptor.id_format {
        if !format.matches(&request.path_identifier) {
            return Err(CoreError::invalid_parameter(
                descriptor.id_field,
                format!("'{}' must be {}", request.path_identifier, format.describe()),
            ));
        }
    }

    let value = check_domain(field.column, &field.domain, &request.new_value)?;
    let companion = match (&field.companion, &request.companion_value) {
        (Some(companion), Some(raw)) => Some((
            companion.column,
            check_domain(companion.column, &companion.domain, raw)?,
        )),
        _ => None,
    };

    let mut assignments = vec![(field.column, AssignedValue::Bind(value))];
    assignments.extend(companion.map(|(column, value)| (column, AssignedValue::Bind(value))));
    assignments.extend(
        field
            .side_effects
            .iter()
            .map(|(column, flag)| (*column, AssignedValue::Bind(TypedValue::Bool(*flag)))),
    );
    assignments.push(("updated_at", AssignedValue::Now));

    Ok(ValidatedMutation {
        field,
        statement: UpdateStatement {
            table: descriptor.table.clone(),
            primary_key: descriptor.primary_key[0],
            key: request.path_identifier.clone(),
            assignments,
        },
    })
}

fn check_domain(column: &str, domain: &FieldDomain, value: &Value) -> Result<TypedValue, CoreError> {
    let invalid = |allowed: String| CoreError::InvalidEnumValue {
        field: column.to_string(),
        value: value.to_string(),
        allowed,
    };

    match domain {
        FieldDomain::Enum(allowed) => value
            .as_str()
            .and_then(|s| allowed.iter().find(|v| **v == s))
            .map(|v| TypedValue::Enum(v.to_string()))
            .ok_or_else(|| invalid(allowed.join(", "))),
        FieldDomain::Boolean => value
            .as_bool()
            .map(TypedValue::Bool)
            .ok_or_else(|| invalid("true, false".to_string())),
    }
}

/// Final step: an update that matched no row means the target is absent.
pub fn resolve_outcome(
    descriptor: &ResourceDescriptor,
    key: &str,
    result: MutationResult,
) -> Result<(), CoreError> {
    if result.matched {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            resource: descriptor.name.to_string(),
            key: descriptor.id_field.to_string(),
            id: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::logic::ResourceRegistry;
    use serde_json::json;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    fn registry() -> ResourceRegistry {
        ResourceRegistry::new(&PaginationConfig::default(), "atp").unwrap()
    }

    fn request(path: &str, field: &str, body: Value, id_field: &str, value_field: &str) -> MutationRequest {
        MutationRequest::from_body(path, field, id_field, value_field, &body)
    }

    #[test]
    fn label_update_carries_side_effects() {
        let registry = registry();
        let training = registry.describe("training").unwrap();
        let req = request(
            "tt0111161",
            "label",
            json!({"imdb_id": "tt0111161", "label": "would_watch"}),
            "imdb_id",
            "label",
        );

        let validated = validate_mutation(training, &req).unwrap();
        let stmt = validated.statement;
        assert_eq!(stmt.table, "atp.training");
        assert_eq!(stmt.primary_key, "imdb_id");
        assert_eq!(stmt.key, "tt0111161");
        assert_eq!(
            stmt.assignments,
            vec![
                ("label", AssignedValue::Bind(TypedValue::Enum("would_watch".to_string()))),
                ("human_labeled", AssignedValue::Bind(TypedValue::Bool(true))),
                ("reviewed", AssignedValue::Bind(TypedValue::Bool(true))),
                ("updated_at", AssignedValue::Now),
            ]
        );
    }

    #[test]
    fn mismatched_identifiers_fail_first() {
        let registry = registry();
        let media = registry.describe("media").unwrap();
        // the value is also invalid, but the mismatch wins
        let req = request(
            HASH,
            "rejection-status",
            json!({"hash": "ffffffffffffffffffffffffffffffffffffffff", "rejection_status": "bogus"}),
            "hash",
            "rejection_status",
        );
        assert!(matches!(
            validate_mutation(media, &req),
            Err(CoreError::IdentifierMismatch { .. })
        ));

        let req = request(HASH, "rejection-status", json!({"rejection_status": "accepted"}), "hash", "rejection_status");
        assert!(matches!(
            validate_mutation(media, &req),
            Err(CoreError::IdentifierMismatch { body: None, .. })
        ));
    }

    #[test]
    fn values_outside_the_domain_are_rejected() {
        let registry = registry();
        let media = registry.describe("media").unwrap();
        for value in [json!("bogus"), json!("ACCEPTED"), json!(1), Value::Null] {
            let req = request(
                HASH,
                "rejection-status",
                json!({"hash": HASH, "rejection_status": value.clone()}),
                "hash",
                "rejection_status",
            );
            assert!(
                matches!(validate_mutation(media, &req), Err(CoreError::InvalidEnumValue { .. })),
                "{value}"
            );
        }
    }

    #[test]
    fn pipeline_status_accepts_every_stage() {
        let registry = registry();
        let media = registry.describe("media").unwrap();
        for stage in crate::logic::registry::PIPELINE_STATUSES {
            let req = request(
                HASH,
                "pipeline-status",
                json!({"hash": HASH, "pipeline_status": stage}),
                "hash",
                "pipeline_status",
            );
            let validated = validate_mutation(media, &req).unwrap();
            assert_eq!(validated.statement.assignments[0].0, "pipeline_status");
        }
    }

    #[test]
    fn pipeline_status_sets_error_status_in_the_same_statement() {
        let registry = registry();
        let media = registry.describe("media").unwrap();
        let body = json!({"hash": HASH, "pipeline_status": "paused", "error_status": false});
        let req = request(HASH, "pipeline-status", body.clone(), "hash", "pipeline_status")
            .with_companion("error_status", &body);

        let validated = validate_mutation(media, &req).unwrap();
        assert_eq!(
            validated.statement.assignments,
            vec![
                ("pipeline_status", AssignedValue::Bind(TypedValue::Enum("paused".to_string()))),
                ("error_status", AssignedValue::Bind(TypedValue::Bool(false))),
                ("updated_at", AssignedValue::Now),
            ]
        );
    }

    #[test]
    fn error_status_is_left_alone_when_omitted() {
        let registry = registry();
        let media = registry.describe("media").unwrap();
        let body = json!({"hash": HASH, "pipeline_status": "paused"});
        let req = request(HASH, "pipeline-status", body.clone(), "hash", "pipeline_status")
            .with_companion("error_status", &body);

        let validated = validate_mutation(media, &req).unwrap();
        assert!(validated.statement.assignments.iter().all(|(column, _)| *column != "error_status"));
    }

    #[test]
    fn error_status_must_be_a_boolean() {
        let registry = registry();
        let media = registry.describe("media").unwrap();
        for value in [json!("false"), json!(0), Value::Null] {
            let body = json!({"hash": HASH, "pipeline_status": "paused", "error_status": value.clone()});
            let req = request(HASH, "pipeline-status", body.clone(), "hash", "pipeline_status")
                .with_companion("error_status", &body);
            let err = validate_mutation(media, &req).unwrap_err();
            assert!(
                matches!(&err, CoreError::InvalidEnumValue { field, .. } if field == "error_status"),
                "{value}"
            );
        }
    }

    #[test]
    fn reviewed_takes_a_boolean() {
        let registry = registry();
        let training = registry.describe("training").unwrap();
        let ok = request("tt0111161", "reviewed", json!({"imdb_id": "tt0111161", "reviewed": false}), "imdb_id", "reviewed");
        assert!(validate_mutation(training, &ok).is_ok());

        let bad = request("tt0111161", "reviewed", json!({"imdb_id": "tt0111161", "reviewed": "yes"}), "imdb_id", "reviewed");
        assert!(matches!(validate_mutation(training, &bad), Err(CoreError::InvalidEnumValue { .. })));
    }

    #[test]
    fn malformed_identifiers_are_invalid_parameters() {
        let registry = registry();
        let training = registry.describe("training").unwrap();
        let req = request("tt12", "label", json!({"imdb_id": "tt12", "label": "would_watch"}), "imdb_id", "label");
        assert!(matches!(validate_mutation(training, &req), Err(CoreError::InvalidParameter { .. })));
    }

    #[test]
    fn unknown_or_read_only_fields_are_rejected() {
        let registry = registry();
        let training = registry.describe("training").unwrap();
        let req = request("tt0111161", "anomalous", json!({"imdb_id": "tt0111161"}), "imdb_id", "anomalous");
        assert!(matches!(validate_mutation(training, &req), Err(CoreError::InvalidParameter { .. })));

        let prediction = registry.describe("prediction").unwrap();
        let req = request("tt0111161", "cm_value", json!({"imdb_id": "tt0111161", "cm_value": "tp"}), "imdb_id", "cm_value");
        assert!(validate_mutation(prediction, &req).is_err());
    }

    #[test]
    fn unmatched_update_is_not_found() {
        let registry = registry();
        let training = registry.describe("training").unwrap();
        assert!(resolve_outcome(training, "tt0111161", MutationResult { matched: true }).is_ok());
        let err = resolve_outcome(training, "tt0111161", MutationResult { matched: false }).unwrap_err();
        assert_eq!(err.kind().status(), 404);
    }
}
