use serde::Serialize;

use super::OhlcvBar;

/// Latest technical picture of a ticker.
///
/// Only constructible when the price history is non-empty and both indicators
/// are defined; anything less is treated as "no data" upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    ticker: String,
    price_history: Vec<OhlcvBar>,
    current_price: f64,
    rsi: f64,
    ema_50: f64,
}

impl MarketSnapshot {
    pub fn new(ticker: &str, price_history: Vec<OhlcvBar>, rsi: f64, ema_50: f64) -> Option<Self> {
        let current_price = price_history.last()?.close;
        if !(current_price.is_finite() && rsi.is_finite() && ema_50.is_finite()) {
            return None;
        }

        Some(Self {
            ticker: ticker.trim().to_uppercase(),
            price_history,
            current_price,
            rsi,
            ema_50,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn price_history(&self) -> &[OhlcvBar] {
        &self.price_history
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn rsi(&self) -> f64 {
        self.rsi
    }

    pub fn ema_50(&self) -> f64 {
        self.ema_50
    }

    pub fn is_uptrend(&self) -> bool {
        self.current_price > self.ema_50
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bar(close: f64) -> OhlcvBar {
        OhlcvBar {
            time: Utc::now(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        }
    }

    #[test]
    fn test_current_price_is_last_close_and_ticker_uppercased() {
        let snap = MarketSnapshot::new(" nvda ", vec![bar(10.0), bar(12.5)], 55.0, 11.0).unwrap();
        assert_eq!(snap.ticker(), "NVDA");
        assert_eq!(snap.current_price(), 12.5);
        assert!(snap.is_uptrend());
    }

    #[test]
    fn test_empty_history_is_not_a_snapshot() {
        assert!(MarketSnapshot::new("NVDA", vec![], 55.0, 11.0).is_none());
    }

    #[test]
    fn test_undefined_indicator_is_not_a_snapshot() {
        assert!(MarketSnapshot::new("NVDA", vec![bar(1.0)], f64::NAN, 11.0).is_none());
    }
}
