use std::sync::Arc;

use async_trait::async_trait;
use common::models::AnalysisResult;
use common::sinks::{Notifier, SignalLog};
use thiserror::Error;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::repair::RepairError;

/// Why an invocation produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureReason {
    #[error("no usable market data")]
    NoMarketData,

    #[error("upstream call failed: {0}")]
    UpstreamError(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model output rejected: {0}")]
    InvalidSignal(#[from] RepairError),
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Done(AnalysisResult),
    Failed(FailureReason),
}

impl PipelineOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Done(result) => Some(result),
            Self::Failed(_) => None,
        }
    }

    pub fn into_result(self) -> Result<AnalysisResult, FailureReason> {
        match self {
            Self::Done(result) => Ok(result),
            Self::Failed(reason) => Err(reason),
        }
    }
}

/// Produces a full analysis for a ticker: the fetch, prompt, model and repair
/// stages. Live and fixture inputs are interchangeable behind this trait.
#[async_trait]
pub trait Analyst: Send + Sync {
    async fn analyze(&self, ticker: &str) -> Result<AnalysisResult, FailureReason>;
}

/// Runs an [`Analyst`], then hands the result to the log store and, when
/// configured, the notifier. Sinks are best-effort: their failures are logged
/// and never turn a produced result into a failure.
pub struct AnalysisPipeline {
    analyst: Box<dyn Analyst>,
    log: Arc<dyn SignalLog>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl AnalysisPipeline {
    pub fn new(analyst: Box<dyn Analyst>, log: Arc<dyn SignalLog>) -> Self {
        Self {
            analyst,
            log,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub async fn run(&self, ticker: &str) -> PipelineOutcome {
        let ticker = ticker.trim().to_uppercase();
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", ticker = %ticker, %run_id);
        self.run_stages(&ticker).instrument(span).await
    }

    async fn run_stages(&self, ticker: &str) -> PipelineOutcome {
        info!("Analyzing {}...", ticker);

        let result = match self.analyst.analyze(ticker).await {
            Ok(result) => result,
            Err(reason) => {
                warn!("Could not perform analysis for {}: {}", ticker, reason);
                return PipelineOutcome::Failed(reason);
            }
        };

        self.persist(&result).await;
        self.notify(ticker, &result).await;

        info!(
            "{} -> {} ({:.0}%)",
            ticker,
            result.signal.signal(),
            result.signal.confidence() * 100.0
        );
        PipelineOutcome::Done(result)
    }

    async fn persist(&self, result: &AnalysisResult) {
        match self.log.record(&result.signal, &result.snapshot).await {
            Ok(logged) => info!("Signal logged as #{}", logged.id),
            Err(e) => error!("Failed to persist signal for {}: {:#}", result.snapshot.ticker(), e),
        }
    }

    async fn notify(&self, ticker: &str, result: &AnalysisResult) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(ticker, &result.signal).await {
                warn!("Notification for {} failed: {:#}", ticker, e);
            }
        }
    }
}
