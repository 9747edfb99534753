use async_trait::async_trait;
use common::models::{OhlcvBar, RawNewsRecord};

use crate::error::RemoteError;

/// Range and granularity of a price history request, in Yahoo notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub range: &'static str,
    pub interval: &'static str,
}

impl HistoryWindow {
    /// What a live analysis looks at.
    pub const RECENT: Self = Self {
        range: "5d",
        interval: "1h",
    };

    pub const BACKTEST: Self = Self {
        range: "60d",
        interval: "1h",
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Chronological bars. An unknown or unlisted ticker yields an empty vec,
    /// not an error.
    async fn price_history(
        &self,
        ticker: &str,
        window: HistoryWindow,
    ) -> Result<Vec<OhlcvBar>, RemoteError>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Raw hits from roughly the last 24 hours, at most `max_results`.
    async fn recent_news(
        &self,
        ticker: &str,
        max_results: usize,
    ) -> Result<Vec<RawNewsRecord>, RemoteError>;
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// `Ok(None)` when the model answered without any content.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, RemoteError>;
}

pub trait RemoteResponse<T> {
    fn to_domain(&self) -> Result<T, RemoteError>;
}
