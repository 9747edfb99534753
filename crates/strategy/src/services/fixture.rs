use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::models::{AnalysisResult, MarketSnapshot, NewsItem, OhlcvBar, SignalKind, TradeSignal};

use crate::repair::RepairError;
use crate::services::pipeline::{Analyst, FailureReason};

/// Deterministic, network-free stand-in for the live analyst. Used by mock
/// runs and integration tests.
pub struct FixtureAnalyst;

impl FixtureAnalyst {
    pub fn result_for(ticker: &str, now: DateTime<Utc>) -> Result<AnalysisResult, FailureReason> {
        let ticker = ticker.trim().to_uppercase();

        let signal = TradeSignal::new(
            SignalKind::Hold,
            0.65,
            format!(
                "Mock analysis for {}: Price is consolidating near the 50-period EMA. RSI is neutral. \
                 Waiting for a clearer catalyst before taking a position.",
                ticker
            ),
            None,
        )
        .map_err(RepairError::from)?;

        let bar = OhlcvBar {
            time: now,
            open: 150.0,
            high: 152.0,
            low: 149.0,
            close: 151.0,
            volume: 1_000_000,
        };
        let snapshot =
            MarketSnapshot::new(&ticker, vec![bar], 55.0, 150.5).ok_or(FailureReason::NoMarketData)?;

        let news = vec![
            NewsItem {
                headline: format!(
                    "{} announces new AI chip, investors are cautiously optimistic.",
                    ticker
                ),
                url: "https://example.com/news1".to_string(),
                source: "Mock News Service".to_string(),
                published_at: now - Duration::hours(3),
            },
            NewsItem {
                headline: "Analysts debate future growth prospects for the semiconductor industry."
                    .to_string(),
                url: "https://example.com/news2".to_string(),
                source: "Fauxancial Times".to_string(),
                published_at: now - Duration::hours(8),
            },
        ];

        Ok(AnalysisResult {
            signal,
            snapshot,
            news,
        })
    }
}

#[async_trait]
impl Analyst for FixtureAnalyst {
    async fn analyze(&self, ticker: &str) -> Result<AnalysisResult, FailureReason> {
        Self::result_for(ticker, Utc::now())
    }
}
