use std::fmt::Write;

use common::models::{AnalysisResult, LoggedSignal, MarketSnapshot};
use strategy::services::BacktestReport;

fn trend(snapshot: &MarketSnapshot) -> &'static str {
    if snapshot.is_uptrend() { "Up" } else { "Down" }
}

/// Plain-text report for a single analysis.
pub fn render_analysis(result: &AnalysisResult) -> String {
    let snapshot = &result.snapshot;
    let signal = &result.signal;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} | Price: ${:.2} | Trend: {}",
        snapshot.ticker(),
        snapshot.current_price(),
        trend(snapshot)
    );
    let _ = writeln!(out, "\nTechnicals");
    let _ = writeln!(out, "  RSI: {:.2}", snapshot.rsi());
    let _ = writeln!(out, "  EMA (50): ${:.2}", snapshot.ema_50());

    let _ = writeln!(out, "\nRecent News");
    if result.news.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in &result.news {
        let _ = writeln!(out, "  - {} ({})", item.headline, item.source);
    }

    let _ = writeln!(out, "\nSignal: {}", signal.signal());
    let _ = writeln!(out, "Confidence: {:.2}%", signal.confidence() * 100.0);
    let _ = writeln!(out, "Reasoning: {}", signal.reasoning());
    if let Some(stop_loss) = signal.stop_loss() {
        let _ = writeln!(out, "Stop Loss: ${:.2}", stop_loss);
    }
    out
}

pub fn render_watch_row(ticker: &str, result: Option<&AnalysisResult>) -> String {
    match result {
        Some(r) => format!(
            "{:<8} ${:>10.2}  {:<4}  {:>6.2}%  RSI {:>6.2}  {}",
            ticker,
            r.snapshot.current_price(),
            r.signal.signal(),
            r.signal.confidence() * 100.0,
            r.snapshot.rsi(),
            r.signal.reasoning()
        ),
        None => format!("{:<8} unavailable", ticker),
    }
}

pub fn render_history(entries: &[LoggedSignal]) -> String {
    if entries.is_empty() {
        return "No signals logged yet.\n".to_string();
    }

    let mut out = String::new();
    for e in entries {
        let stop = e
            .stop_loss
            .map(|s| format!("${:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "#{} {} {:<8} {:<4} {:>3.0}% @ ${:.2} stop {} | {}",
            e.id,
            e.timestamp.format("%Y-%m-%d %H:%M"),
            e.ticker,
            e.signal,
            e.confidence * 100.0,
            e.price_at_signal,
            stop,
            e.reasoning
        );
    }
    out
}

pub fn render_backtest(report: &BacktestReport) -> String {
    let mut out = String::new();
    for d in &report.decisions {
        let result = d
            .profit_loss
            .map(|pl| format!("{:+.2}", pl))
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            out,
            "{} | {:.2} | {} | {}",
            d.time.format("%Y-%m-%d %H:%M"),
            d.price,
            d.signal,
            result
        );
    }
    let _ = writeln!(
        out,
        "Win Rate: {:.2}% (Successful Buy signals: {}/{})",
        report.win_rate(),
        report.successful_buys(),
        report.buys_with_outcome()
    );
    out
}
