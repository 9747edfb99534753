use common::models::RawNewsRecord;
use serde::Deserialize;
use serde_json::Value;

/// Yahoo Finance search payload; only the news hits are of interest.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub news: Vec<NewsHit>,
}

#[derive(Debug, Deserialize)]
pub struct NewsHit {
    pub title: Option<String>,
    pub link: Option<String>,
    pub publisher: Option<String>,
    #[serde(rename(deserialize = "providerPublishTime"))]
    pub provider_publish_time: Option<i64>,
}

impl SearchResponse {
    /// Hits published at or after `cutoff` (epoch seconds). Hits without a
    /// timestamp are kept and left for the normalizer to date.
    pub fn into_records(self, cutoff: i64, max_results: usize) -> Vec<RawNewsRecord> {
        self.news
            .into_iter()
            .filter(|hit| hit.provider_publish_time.is_none_or(|ts| ts >= cutoff))
            .take(max_results)
            .map(|hit| RawNewsRecord {
                title: hit.title,
                url: hit.link,
                href: None,
                source: hit.publisher,
                date: hit.provider_publish_time.map(Value::from),
                published: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_stale_hits_and_caps() {
        let body = r#"{"news":[
            {"title":"fresh","link":"https://a","publisher":"Reuters","providerPublishTime":2000},
            {"title":"stale","link":"https://b","publisher":"AP","providerPublishTime":10},
            {"title":"undated","publisher":"Blog"},
            {"title":"extra","providerPublishTime":3000}
        ]}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        let records = resp.into_records(1000, 2);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title.as_deref(), Some("fresh"));
        assert_eq!(records[0].url.as_deref(), Some("https://a"));
        assert_eq!(records[0].date, Some(Value::from(2000)));
        assert_eq!(records[1].title.as_deref(), Some("undated"));
        assert!(records[1].url.is_none());
    }

    #[test]
    fn test_missing_news_field() {
        let resp: SearchResponse = serde_json::from_str(r#"{"quotes":[]}"#).unwrap();
        assert!(resp.into_records(0, 3).is_empty());
    }
}
