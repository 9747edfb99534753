use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{debug, info};

use common::config::Settings;
use common::logger;
use common::sinks::SignalLog;
use market_data::remote::{LlmClient, YahooClient};
use storage::SignalStore;
use strategy::RetryPolicy;
use strategy::services::{
    AnalysisPipeline, Analyst, AnalystOptions, BacktestConfig, DEFAULT_WATCHLIST, FixtureAnalyst,
    LlmAnalyst, PipelineOutcome, Watchlist, run_backtest,
};

use crate::cli::{Cli, Commands};
use crate::services::TelegramNotifier;

mod cli;
mod report;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    debug!("Model: {} at {}", settings.llm.model, settings.llm.base_url);

    match cli.command {
        Commands::Analyze {
            ticker,
            live,
            notify,
        } => analyze(&settings, &ticker, live, notify).await,
        Commands::Watch {
            live,
            interval_secs,
            once,
            notify,
        } => watch(&settings, live, interval_secs, once, notify).await,
        Commands::History { limit } => history(&settings, limit).await,
        Commands::Backtest {
            ticker,
            step,
            horizon,
        } => backtest(&settings, &ticker, BacktestConfig { step, horizon }).await,
    }
}

fn live_analyst(settings: &Settings) -> anyhow::Result<LlmAnalyst> {
    let yahoo = Arc::new(YahooClient::new(&settings.yahoo_base_url, settings.http_timeout)?);
    let llm = Arc::new(LlmClient::new(settings.llm.clone(), settings.http_timeout)?);

    Ok(LlmAnalyst::new(yahoo.clone(), yahoo, llm)
        .with_retry(RetryPolicy::from_settings(&settings.retry))
        .with_options(AnalystOptions::from_settings(settings)))
}

async fn build_pipeline(
    settings: &Settings,
    live: bool,
    notify: bool,
) -> anyhow::Result<AnalysisPipeline> {
    let store = SignalStore::open(&settings.database_url).await?;

    let analyst: Box<dyn Analyst> = if live {
        info!("Live mode: using market, news and model APIs");
        Box::new(live_analyst(settings)?)
    } else {
        info!("Mock mode: using fixture data");
        Box::new(FixtureAnalyst)
    };

    let mut pipeline = AnalysisPipeline::new(analyst, Arc::new(store));
    if notify {
        if let Some(notifier) = TelegramNotifier::from_settings(settings.telegram.as_ref()) {
            pipeline = pipeline.with_notifier(Arc::new(notifier));
        }
    }
    Ok(pipeline)
}

async fn analyze(settings: &Settings, ticker: &str, live: bool, notify: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(settings, live, notify).await?;

    match pipeline.run(ticker).await {
        PipelineOutcome::Done(result) => {
            print!("{}", report::render_analysis(&result));
            Ok(())
        }
        PipelineOutcome::Failed(reason) => {
            bail!("Could not perform analysis for {}: {}", ticker.to_uppercase(), reason)
        }
    }
}

async fn watch(
    settings: &Settings,
    live: bool,
    interval_secs: u64,
    once: bool,
    notify: bool,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(settings, live, notify).await?;
    let watchlist = Watchlist::new(
        DEFAULT_WATCHLIST.iter().map(|t| t.to_string()).collect(),
        Duration::from_secs(interval_secs),
    );

    watchlist
        .run(&pipeline, once.then_some(1), |cycle, outcomes| {
            println!("--- cycle {} ---", cycle);
            for (ticker, outcome) in outcomes {
                println!("{}", report::render_watch_row(ticker, outcome.result()));
            }
        })
        .await;
    Ok(())
}

async fn history(settings: &Settings, limit: u32) -> anyhow::Result<()> {
    let store = SignalStore::open(&settings.database_url).await?;
    let entries = store.recent(limit).await?;
    print!("{}", report::render_history(&entries));
    Ok(())
}

async fn backtest(settings: &Settings, ticker: &str, config: BacktestConfig) -> anyhow::Result<()> {
    let analyst = live_analyst(settings)?;
    let report = run_backtest(&analyst, ticker, config).await?;
    print!("{}", report::render_backtest(&report));
    Ok(())
}
