//! Durable snapshot slots for client state.
//!
//! A single SQLite table holds named JSON slots. Every slot is written with
//! a schema version; a snapshot from a different version is ignored on load
//! instead of being misread.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

/// Version written with every snapshot; bump when a persisted shape changes.
pub const SNAPSHOT_SCHEMA_VERSION: i64 = 1;

/// SQLite-backed store of named snapshot slots.
///
/// Cheap to clone; the database is opened lazily on first use.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SnapshotStore {
    /// Store under the OS app-data directory (`{data_dir}/cuentos/admin.db`).
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::at_path(default_db_path()?))
    }

    /// Store at an explicit database path (tests, portable installs).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the pool, opening the database and creating the table if needed.
    async fn pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create snapshot directory at {:?}", parent))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("failed to open snapshot database at {:?}", self.path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                slot           TEXT PRIMARY KEY,
                schema_version INTEGER NOT NULL,
                data           TEXT NOT NULL,
                saved_at       TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create snapshots table")?;

        *guard = Some(pool.clone());
        Ok(pool)
    }

    /// Upsert a snapshot slot.
    pub async fn save<T: Serialize>(&self, slot: &str, value: &T) -> anyhow::Result<()> {
        let pool = self.pool().await?;
        let payload = serde_json::to_string(value).context("failed to serialize snapshot")?;

        sqlx::query(
            r#"
            INSERT INTO snapshots (slot, schema_version, data, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(slot) DO UPDATE SET
                schema_version = excluded.schema_version,
                data = excluded.data,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(slot)
        .bind(SNAPSHOT_SCHEMA_VERSION)
        .bind(&payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&pool)
        .await
        .context("failed to upsert snapshot")?;

        Ok(())
    }

    /// Load a snapshot slot.
    ///
    /// Returns `Ok(None)` when the slot is missing or was written by a
    /// different schema version.
    pub async fn load<T: DeserializeOwned>(&self, slot: &str) -> anyhow::Result<Option<T>> {
        let pool = self.pool().await?;

        let row = sqlx::query("SELECT schema_version, data FROM snapshots WHERE slot = ?1")
            .bind(slot)
            .fetch_optional(&pool)
            .await
            .context("failed to fetch snapshot")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let schema_version: i64 = row.try_get("schema_version")?;
        if schema_version != SNAPSHOT_SCHEMA_VERSION {
            tracing::warn!(
                slot,
                schema_version,
                "ignoring snapshot written by a different schema version"
            );
            return Ok(None);
        }

        let data: String = row.try_get("data")?;
        let value = serde_json::from_str(&data).context("failed to deserialize snapshot")?;
        Ok(Some(value))
    }

    /// Delete a snapshot slot (no-op when absent).
    pub async fn clear(&self, slot: &str) -> anyhow::Result<()> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM snapshots WHERE slot = ?1")
            .bind(slot)
            .execute(&pool)
            .await
            .context("failed to clear snapshot")?;
        Ok(())
    }
}

/// Resolve the default snapshot database path:
/// `{app_data_dir}/cuentos/admin.db`.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory")?;

    let mut path = base;
    path.push("cuentos");
    path.push("admin.db");
    Ok(path)
}
