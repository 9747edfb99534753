use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
}

/// A search hit as the news provider hands it over. Every field is optional and
/// the timestamp may be a string or an epoch number depending on the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNewsRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub href: Option<String>,
    pub source: Option<String>,
    pub date: Option<Value>,
    pub published: Option<Value>,
}
