//! SQLite-backed gateway for on-device persistence.
//!
//! # Responsibility
//! - Store JSON values as text rows in the `kv_store` table.
//! - Keep blocking SQLite calls off the async executor threads.
//!
//! # Invariants
//! - The connection is opened at most once; concurrent `open` calls share it.
//! - Every write is a single-row upsert, so a key never holds partial data.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use crate::db::{open_kv_store, DbLocation};
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type SharedConnection = Arc<Mutex<Connection>>;

/// Gateway persisting values into a SQLite key-value table.
pub struct SqliteGateway {
    location: DbLocation,
    conn: OnceCell<SharedConnection>,
}

impl SqliteGateway {
    /// Creates a gateway for the database file at `path`.
    ///
    /// Nothing touches the file system until `open` is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            location: DbLocation::File(path.as_ref().to_path_buf()),
            conn: OnceCell::new(),
        }
    }

    /// Creates a gateway over a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            conn: OnceCell::new(),
        }
    }

    fn connection(&self) -> GatewayResult<SharedConnection> {
        self.conn.get().cloned().ok_or(GatewayError::NotOpen)
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn open(&self) -> GatewayResult<()> {
        let location = self.location.clone();
        self.conn
            .get_or_try_init(|| async move {
                let conn = run_blocking(move || open_kv_store(&location)).await?;
                Ok::<_, GatewayError>(Arc::new(Mutex::new(conn)))
            })
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> GatewayResult<Option<Value>> {
        let conn = self.connection()?;
        let key = key.to_string();
        let stored = run_blocking(move || {
            let guard = lock(&conn)?;
            let text = guard
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1;",
                    [key.as_str()],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(text)
        })
        .await?;

        match stored {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> GatewayResult<()> {
        let conn = self.connection()?;
        let key = key.to_string();
        let text = serde_json::to_string(&value)?;
        let bytes = text.len();
        run_blocking(move || {
            let guard = lock(&conn)?;
            guard.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, text],
            )?;
            Ok(())
        })
        .await?;
        debug!("event=kv_set module=gateway status=ok bytes={bytes}");
        Ok(())
    }
}

fn lock(conn: &SharedConnection) -> GatewayResult<std::sync::MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| GatewayError::Backend("sqlite connection lock poisoned".to_string()))
}

async fn run_blocking<T, F>(task: F) -> GatewayResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> GatewayResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(err) => {
            error!("event=kv_task module=gateway status=error error_code=join_failed error={err}");
            Err(GatewayError::Backend(format!("blocking task failed: {err}")))
        }
    }
}
