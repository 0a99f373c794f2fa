//! SQLite bootstrap for the on-device key-value store.
//!
//! # Responsibility
//! - Open the connection behind `SqliteGateway`.
//! - Bring the `kv_store` schema up to date before first use.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - No key-value reads or writes happen before the schema check succeeds.

pub mod migrations;
mod open;

pub use open::{open_kv_store, DbLocation};
