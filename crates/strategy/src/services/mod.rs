pub mod backtest;
pub mod fixture;
pub mod llm_analyst;
pub mod pipeline;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod test_support;

pub use backtest::{BacktestConfig, BacktestReport, Decision, replay, run_backtest};
pub use fixture::FixtureAnalyst;
pub use llm_analyst::{AnalystOptions, LlmAnalyst};
pub use pipeline::{AnalysisPipeline, Analyst, FailureReason, PipelineOutcome};
pub use watchlist::{DEFAULT_WATCHLIST, Watchlist};
