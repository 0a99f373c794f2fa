//! Activity store and its persistence pipeline.
//!
//! # Responsibility
//! - Keep the session's activity collection (`activity_store`).
//! - Encode/decode the stored snapshot (`snapshot`).
//! - Serialize snapshot writes through one background task (`writer`).

pub mod activity_store;
pub mod error;
pub mod snapshot;
pub mod writer;
