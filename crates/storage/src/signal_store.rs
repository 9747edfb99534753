use async_trait::async_trait;
use chrono::Utc;
use common::models::{LoggedSignal, MarketSnapshot, TradeSignal};
use common::sinks::SignalLog;
use sqlx::SqlitePool;
use tracing::debug;

use crate::repositories::SignalRepository;

/// SQLite-backed, append-only signal log. The store assigns id and timestamp.
#[derive(Clone)]
pub struct SignalStore {
    pool: SqlitePool,
}

impl SignalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn open(database_url: &str) -> Result<Self, sqlx::Error> {
        Ok(Self::new(crate::db::open(database_url).await?))
    }

    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Ok(Self::new(crate::db::open_in_memory().await?))
    }
}

#[async_trait]
impl SignalLog for SignalStore {
    async fn record(
        &self,
        signal: &TradeSignal,
        snapshot: &MarketSnapshot,
    ) -> anyhow::Result<LoggedSignal> {
        let logged = SignalRepository::insert(&self.pool, Utc::now(), signal, snapshot).await?;
        debug!("Logged signal #{} for {}", logged.id, logged.ticker);
        Ok(logged)
    }

    async fn recent(&self, limit: u32) -> anyhow::Result<Vec<LoggedSignal>> {
        Ok(SignalRepository::recent(&self.pool, limit).await?)
    }
}
