use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Row inserted into `comments`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewComment {
    #[serde(rename = "projectId")]
    pub project_id: Value,
    pub content: String,
    pub created_at: String,
    #[serde(rename = "userAuthId")]
    pub user_auth_id: Value,
}

/// ISO-8601 UTC timestamp without offset, microsecond precision
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}
