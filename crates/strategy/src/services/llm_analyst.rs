use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::config::Settings;
use common::models::{AnalysisResult, MarketSnapshot, NewsItem, OhlcvBar, TradeSignal};
use market_data::{
    CompletionProvider, CompletionRequest, HistoryWindow, MarketDataProvider, NewsProvider,
    RemoteError,
};
use tracing::{debug, info, warn};

use crate::indicators;
use crate::news::{self, DEFAULT_MAX_NEWS};
use crate::prompt::{SYSTEM_PROMPT, build_context};
use crate::repair::parse_signal;
use crate::retry::RetryPolicy;
use crate::services::pipeline::{Analyst, FailureReason};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalystOptions {
    pub news_max_results: usize,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for AnalystOptions {
    fn default() -> Self {
        Self {
            news_max_results: DEFAULT_MAX_NEWS,
            temperature: 0.3,
            max_tokens: 256,
        }
    }
}

impl AnalystOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            news_max_results: settings.news_max_results,
            temperature: settings.llm.temperature,
            max_tokens: settings.llm.max_tokens,
        }
    }
}

/// Live analyst: market data, headlines and a model verdict, each remote call
/// wrapped in the retry policy.
pub struct LlmAnalyst {
    market: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    model: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
    options: AnalystOptions,
}

impl LlmAnalyst {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        model: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            market,
            news,
            model,
            retry: RetryPolicy::default(),
            options: AnalystOptions::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_options(mut self, options: AnalystOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn price_history(
        &self,
        ticker: &str,
        window: HistoryWindow,
    ) -> Result<Vec<OhlcvBar>, FailureReason> {
        let market = self.market.as_ref();
        self.retry
            .run_if(
                "market data",
                move || market.price_history(ticker, window),
                RemoteError::is_retryable,
            )
            .await
            .map_err(|e| FailureReason::UpstreamError(format!("market data: {}", e)))
    }

    pub async fn fetch_snapshot(&self, ticker: &str) -> Result<MarketSnapshot, FailureReason> {
        let bars = self.price_history(ticker, HistoryWindow::RECENT).await?;
        if bars.is_empty() {
            info!("Could not retrieve market data for {}", ticker);
            return Err(FailureReason::NoMarketData);
        }

        let len = bars.len();
        indicators::snapshot(ticker, bars).ok_or_else(|| {
            warn!("{} bars for {} are not enough for RSI/EMA", len, ticker);
            FailureReason::NoMarketData
        })
    }

    /// Headlines are optional context; any failure yields an empty list.
    pub async fn fetch_news(&self, ticker: &str) -> Vec<NewsItem> {
        let provider = self.news.as_ref();
        let max_results = self.options.news_max_results;

        match self
            .retry
            .run_if(
                "news",
                move || provider.recent_news(ticker, max_results),
                RemoteError::is_retryable,
            )
            .await
        {
            Ok(raw) => news::normalize(raw, max_results, Utc::now()),
            Err(e) => {
                warn!("News unavailable for {} ({}), continuing without headlines", ticker, e);
                Vec::new()
            }
        }
    }

    /// Prompt, model call and repair for an already assembled context.
    pub async fn judge(
        &self,
        snapshot: &MarketSnapshot,
        news: &[NewsItem],
    ) -> Result<TradeSignal, FailureReason> {
        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: build_context(snapshot, news),
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };
        debug!("Prompt for {}:\n{}", snapshot.ticker(), request.user);

        let model = self.model.as_ref();
        let request = &request;
        let raw = self
            .retry
            .run_if(
                "model call",
                move || model.complete(request),
                RemoteError::is_retryable,
            )
            .await
            .map_err(|e| FailureReason::UpstreamError(format!("model: {}", e)))?;

        let raw = raw
            .filter(|text| !text.trim().is_empty())
            .ok_or(FailureReason::EmptyResponse)?;

        parse_signal(&raw).map_err(|e| {
            warn!("Rejected model output for {}: {}", snapshot.ticker(), e);
            FailureReason::InvalidSignal(e)
        })
    }
}

#[async_trait]
impl Analyst for LlmAnalyst {
    async fn analyze(&self, ticker: &str) -> Result<AnalysisResult, FailureReason> {
        let snapshot = self.fetch_snapshot(ticker).await?;
        let news = self.fetch_news(ticker).await;
        let signal = self.judge(&snapshot, &news).await?;

        Ok(AnalysisResult {
            signal,
            snapshot,
            news,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::repair::RepairError;
    use crate::services::pipeline::{AnalysisPipeline, PipelineOutcome};
    use crate::services::test_support::{
        MockLog, MockMarket, MockModel, MockNews, logged, rising_bars,
    };
    use common::models::{RawNewsRecord, SignalKind};

    const FENCED_BUY: &str = "```json\n{\"signal\":\"Buy\",\"confidence\":0.9,\"reasoning\":\"momentum\",\"stop_loss\":140.0}\n```";

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(2))
    }

    fn market_with(bars: Vec<OhlcvBar>) -> MockMarket {
        let mut market = MockMarket::new();
        market
            .expect_price_history()
            .withf(|ticker, window| ticker == "NVDA" && *window == HistoryWindow::RECENT)
            .returning(move |_, _| Ok(bars.clone()));
        market
    }

    fn news_with(titles: &[&str]) -> MockNews {
        let records: Vec<RawNewsRecord> = titles
            .iter()
            .map(|t| RawNewsRecord {
                title: Some(t.to_string()),
                source: Some("Reuters".to_string()),
                ..Default::default()
            })
            .collect();
        let mut news = MockNews::new();
        news.expect_recent_news()
            .returning(move |_, _| Ok(records.clone()));
        news
    }

    fn model_answering(answer: &'static str) -> MockModel {
        let mut model = MockModel::new();
        model
            .expect_complete()
            .times(1)
            .returning(move |_| Ok(Some(answer.to_string())));
        model
    }

    fn analyst(market: MockMarket, news: MockNews, model: MockModel) -> LlmAnalyst {
        LlmAnalyst::new(Arc::new(market), Arc::new(news), Arc::new(model)).with_retry(fast_retry())
    }

    fn pipeline(analyst: LlmAnalyst, log: MockLog) -> AnalysisPipeline {
        AnalysisPipeline::new(Box::new(analyst), Arc::new(log))
    }

    fn recording_log() -> MockLog {
        let mut log = MockLog::new();
        log.expect_record()
            .times(1)
            .returning(|s, snap| Ok(logged(s, snap)));
        log
    }

    fn silent_log() -> MockLog {
        let mut log = MockLog::new();
        log.expect_record().never();
        log
    }

    #[tokio::test]
    async fn test_fenced_answer_reaches_done() {
        let analyst = analyst(
            market_with(rising_bars(60)),
            news_with(&["NVDA unveils chip"]),
            model_answering(FENCED_BUY),
        );

        let outcome = pipeline(analyst, recording_log()).run("NVDA").await;
        let result = outcome.into_result().unwrap();

        assert_eq!(result.signal.signal(), SignalKind::Buy);
        assert_eq!(result.signal.stop_loss(), Some(140.0));
        assert_eq!(result.snapshot.current_price(), 159.0);
        assert_eq!(result.news.len(), 1);
        assert_eq!(result.news[0].source, "Reuters");
    }

    #[tokio::test]
    async fn test_empty_series_is_no_market_data_without_model_call() {
        let mut model = MockModel::new();
        model.expect_complete().never();
        let mut news = MockNews::new();
        news.expect_recent_news().never();

        let analyst = analyst(market_with(Vec::new()), news, model);
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        assert_eq!(outcome, PipelineOutcome::Failed(FailureReason::NoMarketData));
    }

    #[tokio::test]
    async fn test_short_series_is_no_market_data() {
        let mut model = MockModel::new();
        model.expect_complete().never();

        let analyst = analyst(market_with(rising_bars(49)), MockNews::new(), model);
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        assert_eq!(outcome, PipelineOutcome::Failed(FailureReason::NoMarketData));
    }

    #[tokio::test]
    async fn test_model_transport_errors_exhaust_retries() {
        let mut model = MockModel::new();
        model
            .expect_complete()
            .times(3)
            .returning(|_| Err(RemoteError::Transport("connection reset".into())));

        let analyst = analyst(market_with(rising_bars(60)), news_with(&[]), model);
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        match outcome {
            PipelineOutcome::Failed(FailureReason::UpstreamError(msg)) => {
                assert!(msg.contains("connection reset"), "{}", msg)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_market_transport_error_is_upstream_not_no_data() {
        let mut market = MockMarket::new();
        market
            .expect_price_history()
            .times(3)
            .returning(|_, _| Err(RemoteError::Transport("timeout".into())));

        let analyst = analyst(market, MockNews::new(), MockModel::new());
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failed(FailureReason::UpstreamError(_))
        ));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut model = MockModel::new();
        model.expect_complete().times(1).returning(|_| {
            Err(RemoteError::Status {
                endpoint: "chat/completions".into(),
                status: 401,
                body: "bad key".into(),
            })
        });

        let analyst = analyst(market_with(rising_bars(60)), news_with(&[]), model);
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failed(FailureReason::UpstreamError(_))
        ));
    }

    #[tokio::test]
    async fn test_news_failure_is_not_fatal() {
        let mut news = MockNews::new();
        news.expect_recent_news()
            .times(3)
            .returning(|_, _| Err(RemoteError::Transport("dns".into())));

        let mut model = MockModel::new();
        model
            .expect_complete()
            .times(1)
            .withf(|req| req.user.contains("No significant news in the last 24 hours."))
            .returning(|_| {
                Ok(Some(
                    r#"{"signal":"Hold","confidence":0.5,"reasoning":"quiet","stop_loss":null}"#
                        .to_string(),
                ))
            });

        let analyst = analyst(market_with(rising_bars(60)), news, model);
        let result = pipeline(analyst, recording_log())
            .run("NVDA")
            .await
            .into_result()
            .unwrap();

        assert!(result.news.is_empty());
        assert_eq!(result.signal.signal(), SignalKind::Hold);
    }

    #[tokio::test]
    async fn test_empty_model_response() {
        let mut model = MockModel::new();
        model.expect_complete().times(1).returning(|_| Ok(None));

        let analyst = analyst(market_with(rising_bars(60)), news_with(&[]), model);
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        assert_eq!(outcome, PipelineOutcome::Failed(FailureReason::EmptyResponse));
    }

    #[tokio::test]
    async fn test_invalid_signal_is_rejected() {
        let analyst = analyst(
            market_with(rising_bars(60)),
            news_with(&[]),
            model_answering(r#"{"signal":"Maybe","confidence":0.4,"reasoning":"unsure"}"#),
        );
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        match outcome {
            PipelineOutcome::Failed(FailureReason::InvalidSignal(RepairError::SchemaViolation {
                field,
                ..
            })) => assert_eq!(field, "signal"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prose_answer_is_malformed() {
        let analyst = analyst(
            market_with(rising_bars(60)),
            news_with(&[]),
            model_answering("I would hold for now."),
        );
        let outcome = pipeline(analyst, silent_log()).run("NVDA").await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failed(FailureReason::InvalidSignal(
                RepairError::MalformedResponse { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_request_carries_persona_and_options() {
        let mut model = MockModel::new();
        model
            .expect_complete()
            .times(1)
            .withf(|req| {
                req.system == SYSTEM_PROMPT
                    && req.max_tokens == 128
                    && req.user.contains("Ticker: NVDA")
                    && req.user.contains("- Fed holds rates (Reuters)")
            })
            .returning(|_| Ok(Some(FENCED_BUY.to_string())));

        let analyst = analyst(market_with(rising_bars(60)), news_with(&["Fed holds rates"]), model)
            .with_options(AnalystOptions {
                max_tokens: 128,
                ..AnalystOptions::default()
            });

        assert!(analyst.analyze("NVDA").await.is_ok());
    }
}
