use async_trait::async_trait;

use crate::models::{LoggedSignal, MarketSnapshot, TradeSignal};

/// Append-only store of produced signals.
#[async_trait]
pub trait SignalLog: Send + Sync {
    async fn record(
        &self,
        signal: &TradeSignal,
        snapshot: &MarketSnapshot,
    ) -> anyhow::Result<LoggedSignal>;

    /// Newest first.
    async fn recent(&self, limit: u32) -> anyhow::Result<Vec<LoggedSignal>>;
}

/// Best-effort push channel for signals (Telegram in production).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, ticker: &str, signal: &TradeSignal) -> anyhow::Result<()>;
}
