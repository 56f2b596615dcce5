use serde_json::Value;

use super::Row;

/// Row filter supported by the store: equality and membership.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: String, value: Value },
    In { column: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// PostgREST query-string value, e.g. `eq.42`, `is.null`, `in.("a","b")`
    pub fn to_postgrest(&self) -> String {
        match self {
            Filter::Eq { value: Value::Null, .. } => "is.null".to_string(),
            Filter::Eq { value, .. } => format!("eq.{}", text_form(value).unwrap_or_default()),
            Filter::In { values, .. } => {
                let items: Vec<String> = values.iter().map(quote_list_item).collect();
                format!("in.({})", items.join(","))
            }
        }
    }

    /// Evaluate the filter against an in-memory row
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq { value, .. } => loose_eq(cell, value),
            Filter::In { values, .. } => values.iter().any(|v| loose_eq(cell, v)),
        }
    }
}

/// Text form of a scalar as it travels in a query string. `None` for null.
pub fn text_form(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Compare two cells the way the hosted store compares a column with a
/// query-string literal: by text form. Null only equals null.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (text_form(left), text_form(right)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

fn quote_list_item(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            let raw = text_form(other).unwrap_or_default();
            format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
        }
    }
}
