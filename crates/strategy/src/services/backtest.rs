use chrono::{DateTime, Utc};
use common::models::{MarketSnapshot, OhlcvBar, SignalKind};
use market_data::HistoryWindow;
use tracing::{info, warn};

use crate::indicators::IndicatorSeries;
use crate::services::llm_analyst::LlmAnalyst;
use crate::services::pipeline::FailureReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktestConfig {
    /// Only bars whose index is a multiple of `step` are evaluated.
    pub step: usize,
    /// Bars between a decision and the close it is judged against.
    pub horizon: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self { step: 4, horizon: 24 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub time: DateTime<Utc>,
    pub price: f64,
    pub signal: SignalKind,
    /// Close `horizon` bars later minus `price`; `None` past the end of history.
    pub profit_loss: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestReport {
    pub ticker: String,
    pub decisions: Vec<Decision>,
}

impl BacktestReport {
    fn known_buys(&self) -> impl Iterator<Item = f64> + '_ {
        self.decisions
            .iter()
            .filter(|d| d.signal == SignalKind::Buy)
            .filter_map(|d| d.profit_loss)
    }

    pub fn buys_with_outcome(&self) -> usize {
        self.known_buys().count()
    }

    pub fn successful_buys(&self) -> usize {
        self.known_buys().filter(|pl| *pl > 0.0).count()
    }

    /// Percentage of Buy decisions that gained, 0 when none had an outcome.
    pub fn win_rate(&self) -> f64 {
        match self.buys_with_outcome() {
            0 => 0.0,
            n => self.successful_buys() as f64 / n as f64 * 100.0,
        }
    }
}

/// Fetches the backtest window for `ticker` and replays it.
pub async fn run_backtest(
    analyst: &LlmAnalyst,
    ticker: &str,
    config: BacktestConfig,
) -> Result<BacktestReport, FailureReason> {
    let ticker = ticker.trim().to_uppercase();
    let bars = analyst.price_history(&ticker, HistoryWindow::BACKTEST).await?;
    if bars.is_empty() {
        return Err(FailureReason::NoMarketData);
    }

    info!("Loaded {} bars for {} backtest", bars.len(), ticker);
    Ok(replay(analyst, &ticker, &bars, config).await)
}

/// Asks the model at every `step`-th bar where both indicators exist, using
/// only history up to that bar and no headlines. Failed judgements are skipped.
pub async fn replay(
    analyst: &LlmAnalyst,
    ticker: &str,
    bars: &[OhlcvBar],
    config: BacktestConfig,
) -> BacktestReport {
    let series = IndicatorSeries::compute(bars);
    let step = config.step.max(1);
    let mut decisions = Vec::new();

    for i in (0..bars.len()).step_by(step) {
        let Some((rsi, ema)) = series.at(i) else {
            continue;
        };
        let Some(snapshot) = MarketSnapshot::new(ticker, bars[..=i].to_vec(), rsi, ema) else {
            continue;
        };

        let signal = match analyst.judge(&snapshot, &[]).await {
            Ok(signal) => signal,
            Err(e) => {
                warn!("No decision at {}: {}", bars[i].time, e);
                continue;
            }
        };

        let price = snapshot.current_price();
        let profit_loss = bars.get(i + config.horizon).map(|future| future.close - price);

        decisions.push(Decision {
            time: bars[i].time,
            price,
            signal: signal.signal(),
            profit_loss,
        });
    }

    BacktestReport {
        ticker: ticker.to_string(),
        decisions,
    }
}
