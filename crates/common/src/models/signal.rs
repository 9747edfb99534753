use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = InvalidField;

    // Case-sensitive on purpose: "buy" is not a valid signal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Self::Buy),
            "Sell" => Ok(Self::Sell),
            "Hold" => Ok(Self::Hold),
            other => Err(InvalidField::new(
                "signal",
                format!("expected one of Buy, Sell, Hold, got {:?}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid `{field}`: {reason}")]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidField {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A validated trade recommendation. Fields are private so a value that
/// exists has passed every check in [`TradeSignal::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSignal {
    signal: SignalKind,
    confidence: f64,
    reasoning: String,
    stop_loss: Option<f64>,
}

impl TradeSignal {
    pub fn new(
        signal: SignalKind,
        confidence: f64,
        reasoning: impl Into<String>,
        stop_loss: Option<f64>,
    ) -> Result<Self, InvalidField> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(InvalidField::new(
                "confidence",
                format!("must be within [0.0, 1.0], got {}", confidence),
            ));
        }

        let reasoning = reasoning.into();
        if reasoning.trim().is_empty() {
            return Err(InvalidField::new("reasoning", "must not be empty"));
        }

        if let Some(stop) = stop_loss {
            if !stop.is_finite() {
                return Err(InvalidField::new(
                    "stop_loss",
                    format!("must be a finite price, got {}", stop),
                ));
            }
        }

        Ok(Self {
            signal,
            confidence,
            reasoning,
            stop_loss,
        })
    }

    pub fn signal(&self) -> SignalKind {
        self.signal
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.stop_loss
    }
}

/// A row of the signal log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedSignal {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub ticker: String,
    pub signal: SignalKind,
    pub confidence: f64,
    pub reasoning: String,
    pub price_at_signal: f64,
    pub stop_loss: Option<f64>,
}
