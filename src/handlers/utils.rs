use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::Row;

/// A non-empty string, or `None`
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Presence test for loosely typed body fields: null, "", 0, false and
/// empty collections all count as missing
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Validate a UUID query parameter
pub fn parse_uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid User ID format. Must be a valid UUID."))
}

/// Render an identifier for a message: strings unquoted, null as `None`
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Column value, null when absent
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

/// Strict JSON equality, except that numbers compare by value (`1 == 1.0`).
/// A number never equals a string.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_presence_rules() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!(["a"])));
    }

    #[test]
    fn present_rejects_empty_strings() {
        assert_eq!(present(&Some("a".into())), Some("a"));
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&None), None);
    }

    #[test]
    fn uuid_validation_is_a_client_error() {
        assert!(parse_uuid("7f1d2c4e-0b7a-4d5e-9a51-3c1f0e2b6a90").is_ok());
        for bad in ["", "123", "not-a-uuid", "7f1d2c4e-0b7a-4d5e-9a51-3c1f0e2b6a9"] {
            let err = parse_uuid(bad).unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn displays_identifiers_plainly() {
        assert_eq!(display_value(&json!("p-1")), "p-1");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&Value::Null), "None");
    }

    #[test]
    fn same_value_is_strict_across_types() {
        assert!(same_value(&json!(1), &json!(1)));
        assert!(same_value(&json!(1), &json!(1.0)));
        assert!(same_value(&json!("p-1"), &json!("p-1")));
        assert!(!same_value(&json!(1), &json!("1")));
        assert!(!same_value(&Value::Null, &json!(1)));
        assert!(!same_value(&json!(true), &json!(1)));
    }
}
