use std::fmt::Write;

use common::models::{MarketSnapshot, NewsItem};

/// Persona and output contract sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a cynical, quantitative hedge fund trader who cares about \
risk first. You are data-driven and distrust market hype. Look for trends, support and resistance, \
and divergences between price action and the indicators. Base your view only on the data you are \
given and keep it short. Reply with a single JSON object and nothing else. The object must have \
exactly these fields: \"signal\" (one of \"Buy\", \"Sell\", \"Hold\"), \"confidence\" (a number \
between 0.0 and 1.0), \"reasoning\" (a brief, skeptical explanation) and \"stop_loss\" (a price, \
or null).";

pub const NO_NEWS_LINE: &str = "- No significant news in the last 24 hours.";

/// Renders the user message for one analysis. Pure: same inputs, same text.
pub fn build_context(snapshot: &MarketSnapshot, news: &[NewsItem]) -> String {
    let mut out = String::with_capacity(512);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "## Market Analysis Request\n");
    let _ = writeln!(out, "### Technicals");
    let _ = writeln!(out, "Ticker: {}", snapshot.ticker());
    let _ = writeln!(out, "Current Price: ${:.2}", snapshot.current_price());
    let _ = writeln!(out, "Relative Strength Index (RSI): {:.2}", snapshot.rsi());
    let _ = writeln!(out, "50-Period EMA: {:.2}\n", snapshot.ema_50());
    let _ = writeln!(out, "### Sentiment");
    let _ = writeln!(out, "Recent Headlines:");

    if news.is_empty() {
        let _ = writeln!(out, "{}", NO_NEWS_LINE);
    } else {
        for item in news {
            let _ = writeln!(out, "- {} ({})", item.headline, item.source);
        }
    }

    out
}
