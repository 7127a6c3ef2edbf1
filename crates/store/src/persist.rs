use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

/// Durable tier a collection is mirrored to. Only one tier exists today;
/// the indirection keeps the configuration table honest about where data
/// lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTier {
    Local,
}

/// Store collection keys, doubling as the snapshot keys in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Groups,
    Transactions,
    Rules,
    Files,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Collection::Groups => "groups",
            Collection::Transactions => "transactions",
            Collection::Rules => "rules",
            Collection::Files => "files",
        }
    }
}

/// Static persistence configuration. Collections absent from this table are
/// session-only and reset to their seed defaults on every start.
pub const STORAGE_CONFIG: &[(Collection, StorageTier)] = &[
    (Collection::Files, StorageTier::Local),
    (Collection::Transactions, StorageTier::Local),
];

pub fn configured_tier(collection: Collection) -> Option<StorageTier> {
    STORAGE_CONFIG
        .iter()
        .find(|(c, _)| *c == collection)
        .map(|(_, tier)| *tier)
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key/value snapshot store, one row per persisted collection.
///
/// Snapshots carry no schema version field; a shape change in the domain
/// types makes old snapshots unparseable, which hydration treats the same
/// as a missing snapshot.
pub struct SnapshotStore {
    pool: DbPool,
}

impl SnapshotStore {
    pub async fn open(path: &Path) -> Result<Self, SnapshotError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&pool)
            .await?;

        Self::migrate(pool).await
    }

    /// Private throwaway store; nothing survives `close`. Used by tests
    /// and ephemeral sessions.
    pub async fn in_memory() -> Result<Self, SnapshotError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        // A single never-reaped connection: each sqlite :memory: connection
        // is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: DbPool) -> Result<Self, SnapshotError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    /// Serialize `value` and overwrite the snapshot stored under
    /// `collection`'s key.
    pub async fn write<T: Serialize>(
        &self,
        collection: Collection,
        value: &T,
    ) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(value)?;
        sqlx::query(
            "INSERT INTO snapshots (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(collection.key())
        .bind(json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Read and decode a snapshot. Missing, unreadable and undecodable
    /// snapshots all yield `None`, and startup falls back to defaults rather
    /// than failing.
    pub async fn read<T: DeserializeOwned>(&self, collection: Collection) -> Option<T> {
        let row: Option<(String,)> =
            match sqlx::query_as("SELECT value FROM snapshots WHERE key = ?")
                .bind(collection.key())
                .fetch_optional(&self.pool)
                .await
            {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("snapshot read failed for {}: {e}", collection.key());
                    return None;
                }
            };

        let (json,) = row?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("discarding corrupt snapshot for {}: {e}", collection.key());
                None
            }
        }
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
