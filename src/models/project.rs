use serde::Serialize;
use serde_json::Value;

/// Row inserted into `projects`.
/// `company` holds whatever reference the caller sent, name or id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub company: Value,
}
