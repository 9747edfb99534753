use chrono::{DateTime, NaiveDateTime, Utc};
use common::models::{NewsItem, RawNewsRecord};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_MAX_NEWS: usize = 3;
const UNKNOWN_SOURCE: &str = "Unknown";

/// Turns provider hits into headline records, preserving order.
///
/// Individual records degrade instead of failing the batch: a missing source
/// becomes "Unknown", a missing url becomes "", an unreadable timestamp becomes
/// `now`. Only records without a headline are dropped.
pub fn normalize(records: Vec<RawNewsRecord>, max_results: usize, now: DateTime<Utc>) -> Vec<NewsItem> {
    records
        .into_iter()
        .filter_map(|record| normalize_one(record, now))
        .take(max_results)
        .collect()
}

fn normalize_one(record: RawNewsRecord, now: DateTime<Utc>) -> Option<NewsItem> {
    let headline = record.title.as_deref().map(str::trim).unwrap_or_default();
    if headline.is_empty() {
        debug!("Dropping news record without headline");
        return None;
    }

    let url = [record.url.as_deref(), record.href.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|u| !u.is_empty())
        .unwrap_or_default();

    let source = record
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SOURCE);

    let published_at = record
        .date
        .as_ref()
        .or(record.published.as_ref())
        .and_then(parse_timestamp)
        .unwrap_or(now);

    Some(NewsItem {
        headline: headline.to_string(),
        url: url.to_string(),
        source: source.to_string(),
        published_at,
    })
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(epoch) = s.parse::<i64>() {
        return from_epoch(epoch);
    }

    // Offset-less ISO timestamps are taken as UTC.
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn from_epoch(epoch: i64) -> Option<DateTime<Utc>> {
    // Some backends report milliseconds.
    if epoch.abs() >= 100_000_000_000 {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    }
}
