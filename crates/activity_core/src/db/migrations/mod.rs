//! Ordered schema steps for the key-value table.
//!
//! Step `n` in `SCHEMA_STEPS` upgrades a database from version `n` to `n + 1`.
//! Steps are append-only.

use crate::gateway::{GatewayError, GatewayResult};
use rusqlite::Connection;

const SCHEMA_STEPS: &[&str] = &[include_str!("0001_kv_store.sql")];

/// Versions before and after a schema upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from: u32,
    pub to: u32,
}

impl SchemaUpgrade {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Schema version this binary writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> GatewayResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Runs every missing step, each in its own transaction.
///
/// A failed step leaves the database at the last completed version.
///
/// # Errors
/// `GatewayError::Schema` when the database was written by a newer binary.
pub fn upgrade_schema(conn: &mut Connection) -> GatewayResult<SchemaUpgrade> {
    let from = schema_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(GatewayError::Schema {
            db_version: from,
            latest_supported: to,
        });
    }

    for (index, step) in SCHEMA_STEPS.iter().enumerate().skip(from as usize) {
        let tx = conn.transaction()?;
        tx.execute_batch(step)?;
        tx.pragma_update(None, "user_version", index as u32 + 1)?;
        tx.commit()?;
    }
    Ok(SchemaUpgrade { from, to })
}
