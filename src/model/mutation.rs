use serde_json::Value;

use crate::model::TypedValue;

/// A single-field change as received at the boundary, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub path_identifier: String,
    /// `None` when the body carried no identifier
    pub body_identifier: Option<String>,
    /// Path segment naming the field, e.g. `label`
    pub target_field: String,
    pub new_value: Value,
    /// Value of the field's companion column; `None` when the body omits it
    pub companion_value: Option<Value>,
}

impl MutationRequest {
    /// Pull the identifier and the new value out of a JSON body.
    pub fn from_body(
        path_identifier: impl Into<String>,
        target_field: impl Into<String>,
        id_field: &str,
        value_field: &str,
        body: &Value,
    ) -> Self {
        let body_identifier = body
            .get(id_field)
            .and_then(Value::as_str)
            .map(str::to_string);
        let new_value = body.get(value_field).cloned().unwrap_or(Value::Null);

        Self {
            path_identifier: path_identifier.into(),
            body_identifier,
            target_field: target_field.into(),
            new_value,
            companion_value: None,
        }
    }

    /// Also pick up `companion_field` from the body, if present.
    pub fn with_companion(mut self, companion_field: &str, body: &Value) -> Self {
        self.companion_value = body.get(companion_field).cloned();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignedValue {
    Bind(TypedValue),
    /// The store's current timestamp
    Now,
}

/// Conditional single-row update keyed on the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub primary_key: &'static str,
    pub key: String,
    pub assignments: Vec<(&'static str, AssignedValue)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    pub matched: bool,
}
