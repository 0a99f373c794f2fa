//! Persistence gateway contract and backends.
//!
//! # Responsibility
//! - Define the async key-value boundary the activity store persists through.
//! - Provide an in-process backend and an on-device SQLite backend.
//!
//! # Invariants
//! - `open` must complete before `get`/`set`; calling it again is a no-op.
//! - `set` overwrites the whole value stored under a key.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

/// Key holding the whole activity collection snapshot.
pub const ACTIVITIES_KEY: &str = "activities";

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised by a persistence backend.
#[derive(Debug)]
pub enum GatewayError {
    /// `get`/`set` was called before a successful `open`.
    NotOpen,
    Sqlite(rusqlite::Error),
    /// The database was written by a newer schema than this binary knows.
    Schema {
        db_version: u32,
        latest_supported: u32,
    },
    /// Stored text could not be converted to or from JSON.
    Encoding(serde_json::Error),
    /// Backend-specific failure without a richer type.
    Backend(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "storage is not open"),
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Schema {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Encoding(err) => write!(f, "stored value encoding failed: {err}"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::NotOpen | Self::Schema { .. } | Self::Backend(_) => None,
        }
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}

/// Asynchronous key-value storage used for durability across sessions.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Prepares the backing store. Idempotent.
    async fn open(&self) -> GatewayResult<()>;

    /// Returns the value stored under `key`, or `None` if it was never set.
    async fn get(&self, key: &str) -> GatewayResult<Option<Value>>;

    /// Overwrites the value stored under `key`.
    async fn set(&self, key: &str, value: Value) -> GatewayResult<()>;
}
