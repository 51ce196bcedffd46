//! Cache snapshot persistence between sessions.
//!
//! The live caches are hash maps; only at this boundary are they exported as
//! entry-array pairs (`[[key, { "value": ..., "timestamp": ... }], ...]`) and
//! stored as a single JSON blob. Blocks are never persisted.
//!
//! Note: SQLite storage is only available with the `native` feature. Other
//! builds use an in-memory stub with the same interface.

use crate::store::Stamped;
use crate::types::{Address, Transaction};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[cfg(feature = "native")]
use rusqlite::{params, Connection, OptionalExtension};
#[cfg(feature = "native")]
use std::path::{Path, PathBuf};
#[cfg(feature = "native")]
use tokio::task::spawn_blocking;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default)]
    pub transactions: Vec<(String, Stamped<Transaction>)>,
    #[serde(default)]
    pub addresses: Vec<(String, Stamped<Address>)>,
}

impl CacheSnapshot {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.addresses.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serialize cache snapshot")
    }

    pub fn from_json(blob: &str) -> Result<Self> {
        serde_json::from_str(blob).context("parse cache snapshot")
    }

    /// Keeps only entries younger than `max_age_ms` at `now_ms`.
    pub fn retain_fresh(&mut self, now_ms: u64, max_age_ms: u64) {
        let fresh = |ts: u64| now_ms.saturating_sub(ts) < max_age_ms;
        self.transactions.retain(|(_, s)| fresh(s.timestamp));
        self.addresses.retain(|(_, s)| fresh(s.timestamp));
    }
}

#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct CacheDb {
    path: PathBuf,
    key: String,
}

#[cfg(feature = "native")]
impl CacheDb {
    /// Opens (creating if needed) the cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = connect(&path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv(
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_ms INTEGER NOT NULL
            );
            "#,
        )?;
        log::info!("[persist] cache db ready at {}", path.display());
        Ok(Self {
            path,
            key: crate::constants::cache::SNAPSHOT_KEY.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let blob = snapshot.to_json()?;
        let path = self.path.clone();
        let key = self.key.clone();
        let (txs, addrs) = (snapshot.transactions.len(), snapshot.addresses.len());
        spawn_blocking(move || -> Result<()> {
            let conn = connect(&path)?;
            conn.execute(
                "INSERT OR REPLACE INTO kv(key,value,updated_ms) VALUES (?,?,?)",
                params![key, blob, chrono::Utc::now().timestamp_millis()],
            )?;
            Ok(())
        })
        .await
        .context("persist worker panicked")??;
        log::debug!("[persist] saved snapshot ({txs} txs, {addrs} addresses)");
        Ok(())
    }

    /// Loads the stored snapshot, `None` when nothing has been saved yet.
    pub async fn load(&self) -> Result<Option<CacheSnapshot>> {
        let path = self.path.clone();
        let key = self.key.clone();
        let blob = spawn_blocking(move || -> Result<Option<String>> {
            let conn = connect(&path)?;
            let blob = conn
                .query_row("SELECT value FROM kv WHERE key = ?", params![key], |r| {
                    r.get::<_, String>(0)
                })
                .optional()?;
            Ok(blob)
        })
        .await
        .context("persist worker panicked")??;
        blob.as_deref().map(CacheSnapshot::from_json).transpose()
    }

    pub async fn clear(&self) -> Result<()> {
        let path = self.path.clone();
        let key = self.key.clone();
        spawn_blocking(move || -> Result<()> {
            connect(&path)?.execute("DELETE FROM kv WHERE key = ?", params![key])?;
            Ok(())
        })
        .await
        .context("persist worker panicked")??;
        Ok(())
    }
}

#[cfg(feature = "native")]
fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("open cache db {}", path.display()))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "busy_timeout", 250)?;
    Ok(conn)
}

// In-memory stub for builds without SQLite
#[cfg(not(feature = "native"))]
#[derive(Debug, Default)]
pub struct CacheDb {
    blob: tokio::sync::Mutex<Option<String>>,
}

#[cfg(not(feature = "native"))]
impl CacheDb {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        *self.blob.lock().await = Some(snapshot.to_json()?);
        Ok(())
    }

    pub async fn load(&self) -> Result<Option<CacheSnapshot>> {
        self.blob
            .lock()
            .await
            .as_deref()
            .map(CacheSnapshot::from_json)
            .transpose()
    }

    pub async fn clear(&self) -> Result<()> {
        *self.blob.lock().await = None;
        Ok(())
    }
}
