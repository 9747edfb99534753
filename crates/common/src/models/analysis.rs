use serde::Serialize;

use super::{MarketSnapshot, NewsItem, TradeSignal};

/// Everything a successful analysis produced. Never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub signal: TradeSignal,
    pub snapshot: MarketSnapshot,
    pub news: Vec<NewsItem>,
}
