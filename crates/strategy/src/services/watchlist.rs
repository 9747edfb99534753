use std::time::Duration;

use tracing::{info, warn};

use crate::services::pipeline::{AnalysisPipeline, PipelineOutcome};

pub const DEFAULT_WATCHLIST: [&str; 4] = ["NVDA", "TSLA", "SPY", "BTC-USD"];

/// Sequential sweep over a fixed set of tickers. One ticker failing never stops
/// the others.
#[derive(Debug, Clone)]
pub struct Watchlist {
    tickers: Vec<String>,
    interval: Duration,
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new(
            DEFAULT_WATCHLIST.iter().map(|t| t.to_string()).collect(),
            Duration::from_secs(300),
        )
    }
}

impl Watchlist {
    pub fn new(tickers: Vec<String>, interval: Duration) -> Self {
        let tickers = tickers
            .into_iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tickers, interval }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn run_cycle(&self, pipeline: &AnalysisPipeline) -> Vec<(String, PipelineOutcome)> {
        let mut outcomes = Vec::with_capacity(self.tickers.len());
        for ticker in &self.tickers {
            let outcome = pipeline.run(ticker).await;
            if let PipelineOutcome::Failed(reason) = &outcome {
                warn!("{} skipped this cycle: {}", ticker, reason);
            }
            outcomes.push((ticker.clone(), outcome));
        }
        outcomes
    }

    /// Runs cycles until `max_cycles` is reached, or forever when `None`.
    pub async fn run<F>(&self, pipeline: &AnalysisPipeline, max_cycles: Option<u64>, mut on_cycle: F)
    where
        F: FnMut(u64, &[(String, PipelineOutcome)]),
    {
        let mut cycle = 0u64;
        loop {
            cycle += 1;
            info!("Watchlist cycle {} over {} tickers", cycle, self.tickers.len());

            let outcomes = self.run_cycle(pipeline).await;
            let done = outcomes.iter().filter(|(_, o)| o.is_done()).count();
            info!("Cycle {} finished: {}/{} signals", cycle, done, outcomes.len());
            on_cycle(cycle, &outcomes);

            if max_cycles.is_some_and(|max| cycle >= max) {
                break;
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
