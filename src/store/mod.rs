//! Signal persistence
//!
//! Alerts are stored once per (game, market, pick, odds). A repeat of the
//! same price on a later cycle is ignored, which is what keeps the notifier
//! from re-sending unchanged opportunities.

use crate::signal::Alert;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// Status assigned to freshly stored signals
pub const STATUS_NEW: &str = "NEW";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store connection lock poisoned")]
    Poisoned,
}

/// A persisted signal row
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub game_id: String,
    pub market: String,
    pub pick: String,
    pub odds: i32,
    pub p_true: f64,
    pub p_push: f64,
    pub edge: f64,
    pub kelly: f64,
    pub stake: Decimal,
    pub threshold: f64,
    pub status: String,
}

impl From<&Alert> for SignalRecord {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.to_string(),
            ts: alert.timestamp,
            game_id: alert.game_id.clone(),
            market: alert.market.as_str().to_string(),
            pick: alert.pick.clone(),
            odds: alert.odds.value(),
            p_true: alert.p_true,
            p_push: alert.p_push,
            edge: alert.edge,
            kelly: alert.kelly,
            stake: alert.stake,
            threshold: alert.threshold,
            status: STATUS_NEW.to_string(),
        }
    }
}

/// Durable signal storage
pub trait SignalStore: Send + Sync {
    /// Persist a record; `true` when a new row was created
    fn save(&self, record: &SignalRecord) -> Result<bool, StoreError>;
}

/// SQLite-backed signal store
pub struct SqliteSignalStore {
    conn: Mutex<Connection>,
}

impl SqliteSignalStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "Opened signal store");
        Self::with_connection(conn)
    }

    /// In-memory database, mostly for tests and dry runs
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored signals
    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM signals", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }
}

impl SignalStore for SqliteSignalStore {
    fn save(&self, record: &SignalRecord) -> Result<bool, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO signals
                (id, ts, game_id, market, pick, odds, p_true, p_push, edge, kelly, stake, threshold, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                record.id,
                record.ts.to_rfc3339(),
                record.game_id,
                record.market,
                record.pick,
                record.odds,
                record.p_true,
                record.p_push,
                record.edge,
                record.kelly,
                record.stake.to_string(),
                record.threshold,
                record.status,
            ],
        )?;
        if inserted == 0 {
            tracing::debug!(game_id = %record.game_id, pick = %record.pick, odds = record.odds, "Signal already stored");
        }
        Ok(inserted > 0)
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS signals (
            id TEXT PRIMARY KEY,
            ts TEXT NOT NULL,
            game_id TEXT NOT NULL,
            market TEXT NOT NULL,
            pick TEXT NOT NULL,
            odds INTEGER NOT NULL,
            p_true REAL NOT NULL,
            p_push REAL NOT NULL,
            edge REAL NOT NULL,
            kelly REAL NOT NULL,
            stake TEXT NOT NULL,
            threshold REAL NOT NULL,
            status TEXT NOT NULL,
            UNIQUE(game_id, market, pick, odds)
        );
        CREATE INDEX IF NOT EXISTS idx_signals_ts ON signals(ts);
        "#,
    )?;
    Ok(())
}
