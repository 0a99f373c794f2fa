//! Connection bootstrap for the key-value store.
//!
//! # Invariants
//! - Returned connections have a busy timeout configured.
//! - Returned connections are at `latest_version()`.

use super::migrations::upgrade_schema;
use crate::gateway::{GatewayError, GatewayResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the key-value database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private database dropped with its connection.
    Memory,
}

impl DbLocation {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::File(path) => Connection::open(path),
            Self::Memory => Connection::open_in_memory(),
        }
    }
}

/// Opens the database at `location` and upgrades its schema.
///
/// Emits one `db_open` start event and one result event with duration.
pub fn open_kv_store(location: &DbLocation) -> GatewayResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let result = location
        .connect()
        .map_err(GatewayError::from)
        .and_then(|mut conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            let upgrade = upgrade_schema(&mut conn)?;
            Ok((conn, upgrade))
        });

    match result {
        Ok((conn, upgrade)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} schema_from={} schema_to={} upgraded={}",
                started_at.elapsed().as_millis(),
                upgrade.from,
                upgrade.to,
                !upgrade.is_noop()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
