//! Activity domain model.
//!
//! # Responsibility
//! - Define the canonical activity record and its identifier.
//! - Parse permissive user input into validated drafts.
//! - Provide calendar-date helpers shared by store and UI layers.
//!
//! # Invariants
//! - Every activity is identified by a stable `ActivityId`, never by field
//!   equality.
//! - A draft only exists once all of its fields parsed successfully.

pub mod activity;
pub mod date;
pub mod draft;
