use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "market-agent",
    about = "LLM-assisted trading signals from technicals and headlines"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full analysis on a single ticker.
    Analyze {
        /// Ticker to analyze (e.g. AAPL, BTC-USD).
        ticker: String,

        /// Call the live market, news and model APIs instead of fixture data.
        #[arg(long, default_value_t = false)]
        live: bool,

        /// Send the resulting signal to Telegram.
        #[arg(long, default_value_t = false)]
        notify: bool,
    },
    /// Analyze the watchlist in a loop.
    Watch {
        #[arg(long, default_value_t = false)]
        live: bool,

        /// Seconds to wait between cycles.
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,

        /// Run a single cycle and exit.
        #[arg(long, default_value_t = false)]
        once: bool,

        #[arg(long, default_value_t = false)]
        notify: bool,
    },
    /// Show the most recent logged signals.
    History {
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// Replay ~60 days of hourly bars through the model.
    Backtest {
        ticker: String,

        /// Evaluate every n-th bar.
        #[arg(long, default_value_t = 4)]
        step: usize,

        /// Bars ahead used to judge each decision.
        #[arg(long, default_value_t = 24)]
        horizon: usize,
    },
}
