use chrono::{DateTime, Utc};
use common::models::{LoggedSignal, MarketSnapshot, SignalKind, TradeSignal};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub struct SignalRepository;

impl SignalRepository {
    pub async fn insert(
        pool: &SqlitePool,
        timestamp: DateTime<Utc>,
        signal: &TradeSignal,
        snapshot: &MarketSnapshot,
    ) -> Result<LoggedSignal, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
                INSERT INTO trade_logs (
                    timestamp, ticker, signal, confidence, reasoning, price_at_signal, stop_loss
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING id
            "#,
        )
        .bind(timestamp)
        .bind(snapshot.ticker())
        .bind(signal.signal().as_str())
        .bind(signal.confidence())
        .bind(signal.reasoning())
        .bind(snapshot.current_price())
        .bind(signal.stop_loss())
        .fetch_one(pool)
        .await?;

        Ok(LoggedSignal {
            id,
            timestamp,
            ticker: snapshot.ticker().to_string(),
            signal: signal.signal(),
            confidence: signal.confidence(),
            reasoning: signal.reasoning().to_string(),
            price_at_signal: snapshot.current_price(),
            stop_loss: signal.stop_loss(),
        })
    }

    pub async fn recent(pool: &SqlitePool, limit: u32) -> Result<Vec<LoggedSignal>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
                SELECT id, timestamp, ticker, signal, confidence, reasoning, price_at_signal, stop_loss
                FROM trade_logs
                ORDER BY timestamp DESC, id DESC
                LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    fn from_row(row: &SqliteRow) -> Result<LoggedSignal, sqlx::Error> {
        let raw_signal: String = row.try_get("signal")?;
        let signal = raw_signal
            .parse::<SignalKind>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(LoggedSignal {
            id: row.try_get("id")?,
            timestamp: row.try_get("timestamp")?,
            ticker: row.try_get("ticker")?,
            signal,
            confidence: row.try_get("confidence")?,
            reasoning: row.try_get("reasoning")?,
            price_at_signal: row.try_get("price_at_signal")?,
            stop_loss: row.try_get("stop_loss")?,
        })
    }
}
