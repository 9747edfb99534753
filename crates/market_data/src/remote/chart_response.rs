use chrono::DateTime;
use common::models::OhlcvBar;
use serde::Deserialize;

use crate::{error::RemoteError, traits::RemoteResponse};

/// Yahoo Finance v8 chart payload.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteData {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl RemoteResponse<Vec<OhlcvBar>> for ChartResponse {
    fn to_domain(&self) -> Result<Vec<OhlcvBar>, RemoteError> {
        let Some(results) = &self.chart.result else {
            return match &self.chart.error {
                Some(err) if err.code == "Not Found" => Ok(Vec::new()),
                Some(err) => Err(RemoteError::Decode(format!(
                    "chart error {}: {}",
                    err.code, err.description
                ))),
                None => Ok(Vec::new()),
            };
        };

        let Some(data) = results.first() else {
            return Ok(Vec::new());
        };
        let Some(timestamps) = &data.timestamp else {
            return Ok(Vec::new());
        };
        let Some(quote) = data.indicators.quote.first() else {
            return Ok(Vec::new());
        };

        let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            // Gaps in the hourly series come back as nulls; a bar without a
            // close is useless to the indicators.
            let Some(close) = at(&quote.close, i) else {
                continue;
            };
            let Some(time) = DateTime::from_timestamp(ts, 0) else {
                return Err(RemoteError::Decode(format!("invalid timestamp: {}", ts)));
            };

            bars.push(OhlcvBar {
                time,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64,
            });
        }

        Ok(bars)
    }
}
