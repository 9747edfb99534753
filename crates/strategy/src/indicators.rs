use common::models::{MarketSnapshot, OhlcvBar};
use ta::Next;

pub const RSI_PERIOD: usize = 14;
pub const EMA_PERIOD: usize = 50;

/// Wilder's RSI. The first average is the simple mean of `period` gains and
/// losses; afterwards `avg = (avg * (period - 1) + x) / period`.
#[derive(Debug, Clone)]
pub struct WilderRsi {
    period: usize,
    prev_close: Option<f64>,
    changes: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl WilderRsi {
    pub fn new(period: usize) -> Option<Self> {
        (period > 0).then_some(Self {
            period,
            prev_close: None,
            changes: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        })
    }

    fn value(&self) -> f64 {
        if self.avg_loss == 0.0 {
            // flat window
            if self.avg_gain == 0.0 { 50.0 } else { 100.0 }
        } else {
            100.0 - 100.0 / (1.0 + self.avg_gain / self.avg_loss)
        }
    }
}

impl Next<f64> for WilderRsi {
    type Output = Option<f64>;

    fn next(&mut self, close: f64) -> Self::Output {
        let Some(prev) = self.prev_close.replace(close) else {
            return None;
        };

        let change = close - prev;
        let (gain, loss) = (change.max(0.0), (-change).max(0.0));
        let n = self.period as f64;
        self.changes += 1;

        if self.changes <= self.period {
            // accumulate sums, divided once the seed window is full
            self.avg_gain += gain;
            self.avg_loss += loss;
            if self.changes < self.period {
                return None;
            }
            self.avg_gain /= n;
            self.avg_loss /= n;
        } else {
            self.avg_gain = (self.avg_gain * (n - 1.0) + gain) / n;
            self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
        }

        Some(self.value())
    }
}

/// EMA with smoothing 2/(N+1), seeded with the SMA of the first `period` closes.
#[derive(Debug, Clone)]
pub struct SeededEma {
    period: usize,
    k: f64,
    seen: usize,
    sum: f64,
    current: Option<f64>,
}

impl SeededEma {
    pub fn new(period: usize) -> Option<Self> {
        (period > 0).then_some(Self {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seen: 0,
            sum: 0.0,
            current: None,
        })
    }
}

impl Next<f64> for SeededEma {
    type Output = Option<f64>;

    fn next(&mut self, close: f64) -> Self::Output {
        let value = match self.current {
            Some(prev) => prev + self.k * (close - prev),
            None => {
                self.sum += close;
                self.seen += 1;
                if self.seen < self.period {
                    return None;
                }
                self.sum / self.period as f64
            }
        };
        self.current = Some(value);
        self.current
    }
}

fn run<I: Next<f64, Output = Option<f64>>>(indicator: Option<I>, closes: &[f64]) -> Vec<Option<f64>> {
    match indicator {
        Some(mut ind) => closes.iter().map(|&c| ind.next(c)).collect(),
        None => vec![None; closes.len()],
    }
}

/// Per-bar RSI. A point is `None` until `period` price changes have been seen.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    run(WilderRsi::new(period), closes)
}

/// Per-bar EMA. A point is `None` until the window is full.
pub fn ema_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    run(SeededEma::new(period), closes)
}

/// RSI(14) and EMA(50) for every bar of a history.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub rsi: Vec<Option<f64>>,
    pub ema: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn compute(bars: &[OhlcvBar]) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Self {
            rsi: rsi_series(&closes, RSI_PERIOD),
            ema: ema_series(&closes, EMA_PERIOD),
        }
    }

    /// Both indicators at `index`, if defined there.
    pub fn at(&self, index: usize) -> Option<(f64, f64)> {
        let rsi = self.rsi.get(index).copied().flatten()?;
        let ema = self.ema.get(index).copied().flatten()?;
        Some((rsi, ema))
    }
}

/// Builds the latest snapshot, or `None` when the history is too short for
/// either indicator.
pub fn snapshot(ticker: &str, bars: Vec<OhlcvBar>) -> Option<MarketSnapshot> {
    let last = bars.len().checked_sub(1)?;
    let (rsi, ema) = IndicatorSeries::compute(&bars).at(last)?;
    MarketSnapshot::new(ticker, bars, rsi, ema)
}
