use common::models::{InvalidField, SignalKind, TradeSignal};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepairError {
    #[error("could not extract JSON from model response: {reason}")]
    MalformedResponse { raw: String, reason: String },

    #[error("field `{field}` violates the signal schema: {reason}")]
    SchemaViolation { field: &'static str, reason: String },
}

impl From<InvalidField> for RepairError {
    fn from(e: InvalidField) -> Self {
        Self::SchemaViolation {
            field: e.field,
            reason: e.reason,
        }
    }
}

/// Removes a leading fence line (```` ``` ```` plus an optional language tag)
/// and a trailing fence. Backticks elsewhere are content and stay.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Fence-strip, then slice from the first `{` to the last `}` inclusive. With
/// no such pair the trimmed text itself is the candidate.
pub fn extract_candidate(raw: &str) -> String {
    let text = strip_fences(raw);

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Recovers the JSON object from a noisy model response. No guessing beyond
/// fence stripping and brace slicing.
pub fn repair(raw: &str) -> Result<Value, RepairError> {
    let candidate = extract_candidate(raw);
    serde_json::from_str::<Value>(&candidate).map_err(|e| {
        error!("Failed to parse JSON: {}. Raw text: {}", e, raw);
        RepairError::MalformedResponse {
            raw: raw.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Checks a parsed object against the signal schema. Unknown keys are ignored.
pub fn validate(value: &Value) -> Result<TradeSignal, RepairError> {
    let obj = value.as_object().ok_or_else(|| RepairError::SchemaViolation {
        field: "response",
        reason: "expected a JSON object".to_string(),
    })?;

    let signal = match obj.get("signal") {
        Some(Value::String(s)) => s.parse::<SignalKind>()?,
        other => return Err(violation("signal", "a string", other)),
    };

    let confidence = match obj.get("confidence") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        other => return Err(violation("confidence", "a number", other)),
    };

    let reasoning = match obj.get("reasoning") {
        Some(Value::String(s)) => s.as_str(),
        other => return Err(violation("reasoning", "a string", other)),
    };

    let stop_loss = match stop_loss_value(obj) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        other => return Err(violation("stop_loss", "a number or null", other)),
    };

    Ok(TradeSignal::new(signal, confidence, reasoning, stop_loss)?)
}

/// `repair` then `validate`.
pub fn parse_signal(raw: &str) -> Result<TradeSignal, RepairError> {
    validate(&repair(raw)?)
}

fn stop_loss_value(obj: &Map<String, Value>) -> Option<&Value> {
    obj.get("stop_loss").or_else(|| obj.get("stopLoss"))
}

fn violation(field: &'static str, expected: &str, got: Option<&Value>) -> RepairError {
    let reason = match got {
        None => "is required".to_string(),
        Some(v) => format!("expected {}, got {}", expected, v),
    };
    RepairError::SchemaViolation { field, reason }
}
