//! Closed-schema JSON validator for tool arguments.
//!
//! Tool input schemas are a deliberately small subset of JSON Schema:
//! typed object properties, `required`, `enum`, numeric ranges, string
//! length/pattern, array item constraints, and `additionalProperties`
//! (closed by default). Coercion is never performed — a string `"true"`
//! submitted for a boolean property is a validation error, not a cast.

use serde_json::Value;

/// One structured validation failure, with a JSON-pointer-style path to
/// the offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub path: String,
    pub kind: String,
    pub message: String,
}

impl FieldError {
    fn new(path: impl Into<String>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Validate `value` against `schema`, collecting every violation rather
/// than stopping at the first one.
pub fn validate(value: &Value, schema: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate_node(value, schema, "", &mut errors);
    errors
}

fn validate_node(value: &Value, schema: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(schema_type) = schema.get("type").and_then(Value::as_str) else {
        return;
    };

    if !type_matches(value, schema_type) {
        errors.push(FieldError::new(
            pointer(path),
            "type",
            format!("expected {schema_type}, got {}", value_type_name(value)),
        ));
        return;
    }

    match schema_type {
        "object" => validate_object(value, schema, path, errors),
        "array" => validate_array(value, schema, path, errors),
        "string" => validate_string(value, schema, path, errors),
        "integer" | "number" => validate_number(value, schema, path, errors),
        _ => {}
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.iter().any(|v| v == value) {
            errors.push(FieldError::new(pointer(path), "enum", "value is not one of the allowed options"));
        }
    }
}

fn validate_object(value: &Value, schema: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(obj) = value.as_object() else { return };

    let properties = schema.get("properties").and_then(Value::as_object);
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();

    for name in &required {
        if !obj.contains_key(*name) {
            errors.push(FieldError::new(
                pointer(&format!("{path}/{name}")),
                "required",
                format!("missing required property '{name}'"),
            ));
        }
    }

    let additional_allowed = schema
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    for (key, child_value) in obj {
        match properties.and_then(|p| p.get(key)) {
            Some(child_schema) => {
                validate_node(child_value, child_schema, &format!("{path}/{key}"), errors);
            }
            None if !additional_allowed => {
                errors.push(FieldError::new(
                    pointer(&format!("{path}/{key}")),
                    "additional-property",
                    format!("unexpected property '{key}'"),
                ));
            }
            None => {}
        }
    }
}

fn validate_array(value: &Value, schema: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(items) = value.as_array() else { return };

    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min {
            errors.push(FieldError::new(pointer(path), "minItems", format!("expected at least {min} items")));
        }
    }
    if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
        if (items.len() as u64) > max {
            errors.push(FieldError::new(pointer(path), "maxItems", format!("expected at most {max} items")));
        }
    }

    if let Some(item_schema) = schema.get("items") {
        for (index, item) in items.iter().enumerate() {
            validate_node(item, item_schema, &format!("{path}/{index}"), errors);
        }
    }
}

fn validate_string(value: &Value, schema: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(s) = value.as_str() else { return };

    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if (s.chars().count() as u64) < min {
            errors.push(FieldError::new(pointer(path), "minLength", format!("expected at least {min} characters")));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if (s.chars().count() as u64) > max {
            errors.push(FieldError::new(pointer(path), "maxLength", format!("expected at most {max} characters")));
        }
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        match regex_lite_match(pattern, s) {
            Ok(matched) if !matched => {
                errors.push(FieldError::new(pointer(path), "pattern", format!("does not match pattern {pattern}")));
            }
            Ok(_) => {}
            Err(_) => {
                errors.push(FieldError::new(pointer(path), "pattern", "schema pattern is not a valid regex"));
            }
        }
    }
}

fn validate_number(value: &Value, schema: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(n) = value.as_f64() else { return };

    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
        if n < min {
            errors.push(FieldError::new(pointer(path), "minimum", format!("expected >= {min}")));
        }
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
        if n > max {
            errors.push(FieldError::new(pointer(path), "maximum", format!("expected <= {max}")));
        }
    }
}

fn type_matches(value: &Value, schema_type: &str) -> bool {
    match schema_type {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn pointer(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// `jsonschema`'s `pattern` support is used here rather than a hand-rolled
/// regex engine, since anchoring/escaping semantics for JSON Schema
/// `pattern` are exactly what that crate already implements correctly.
fn regex_lite_match(pattern: &str, value: &str) -> Result<bool, jsonschema::ValidationError<'static>> {
    let schema = serde_json::json!({"type": "string", "pattern": pattern});
    let compiled = jsonschema::validator_for(&schema).map_err(|e| e.to_owned())?;
    Ok(compiled.is_valid(&Value::String(value.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scale_service_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "service": {"type": "string"},
                "replicas": {"type": "integer", "minimum": 0}
            },
            "required": ["service", "replicas"],
            "additionalProperties": false
        })
    }

    #[test]
    fn test_valid_value_has_no_errors() {
        let value = json!({"service": "web", "replicas": 3});
        assert!(validate(&value, &scale_service_schema()).is_empty());
    }

    #[test]
    fn test_missing_required_field_is_reported_with_path() {
        let value = json!({"service": "web"});
        let errors = validate(&value, &scale_service_schema());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/replicas");
        assert_eq!(errors[0].kind, "required");
    }

    #[test]
    fn test_additional_property_rejected_on_closed_schema() {
        let value = json!({"service": "web", "replicas": 1, "bogus": true});
        let errors = validate(&value, &scale_service_schema());
        assert!(errors.iter().any(|e| e.kind == "additional-property"));
    }

    #[test]
    fn test_string_is_not_coerced_to_integer() {
        let value = json!({"service": "web", "replicas": "3"});
        let errors = validate(&value, &scale_service_schema());
        assert!(errors.iter().any(|e| e.path == "/replicas" && e.kind == "type"));
    }

    #[test]
    fn test_boolean_string_is_not_coerced() {
        let schema = json!({
            "type": "object",
            "properties": {"all": {"type": "boolean"}},
            "required": ["all"],
            "additionalProperties": false
        });
        let value = json!({"all": "true"});
        let errors = validate(&value, &schema);
        assert!(errors.iter().any(|e| e.path == "/all" && e.kind == "type"));
    }

    #[test]
    fn test_enum_rejects_value_outside_set() {
        let schema = json!({"type": "string", "enum": ["start", "stop"]});
        let value = json!("pause");
        let errors = validate(&value, &schema);
        assert!(errors.iter().any(|e| e.kind == "enum"));
    }

    #[test]
    fn test_negative_replicas_violates_minimum() {
        let value = json!({"service": "web", "replicas": -1});
        let errors = validate(&value, &scale_service_schema());
        assert!(errors.iter().any(|e| e.kind == "minimum"));
    }
}
