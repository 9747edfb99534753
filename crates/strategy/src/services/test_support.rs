use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use common::models::{LoggedSignal, MarketSnapshot, OhlcvBar, RawNewsRecord, TradeSignal};
use common::sinks::{Notifier, SignalLog};
use market_data::{
    CompletionProvider, CompletionRequest, HistoryWindow, MarketDataProvider, NewsProvider,
    RemoteError,
};
use mockall::mock;

mock! {
    pub Market {}

    #[async_trait]
    impl MarketDataProvider for Market {
        async fn price_history(
            &self,
            ticker: &str,
            window: HistoryWindow,
        ) -> Result<Vec<OhlcvBar>, RemoteError>;
    }
}

mock! {
    pub News {}

    #[async_trait]
    impl NewsProvider for News {
        async fn recent_news(
            &self,
            ticker: &str,
            max_results: usize,
        ) -> Result<Vec<RawNewsRecord>, RemoteError>;
    }
}

mock! {
    pub Model {}

    #[async_trait]
    impl CompletionProvider for Model {
        async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, RemoteError>;
    }
}

mock! {
    pub Log {}

    #[async_trait]
    impl SignalLog for Log {
        async fn record(
            &self,
            signal: &TradeSignal,
            snapshot: &MarketSnapshot,
        ) -> anyhow::Result<LoggedSignal>;

        async fn recent(&self, limit: u32) -> anyhow::Result<Vec<LoggedSignal>>;
    }
}

mock! {
    pub Notify {}

    #[async_trait]
    impl Notifier for Notify {
        async fn notify(&self, ticker: &str, signal: &TradeSignal) -> anyhow::Result<()>;
    }
}

pub fn logged(signal: &TradeSignal, snapshot: &MarketSnapshot) -> LoggedSignal {
    LoggedSignal {
        id: 1,
        timestamp: Utc::now(),
        ticker: snapshot.ticker().to_string(),
        signal: signal.signal(),
        confidence: signal.confidence(),
        reasoning: signal.reasoning().to_string(),
        price_at_signal: snapshot.current_price(),
        stop_loss: signal.stop_loss(),
    }
}

/// `len` hourly bars rising by 1.0 from 100.0.
pub fn rising_bars(len: usize) -> Vec<OhlcvBar> {
    let start = Utc.with_ymd_and_hms(2025, 1, 6, 14, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let close = 100.0 + i as f64;
            OhlcvBar {
                time: start + Duration::hours(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10_000,
            }
        })
        .collect()
}
