//! Presentation-agnostic activity screen.
//!
//! # Responsibility
//! - Describe the input collector capability the UI must provide (`prompt`).
//! - Drive add/edit/delete flows against an `ActivityStore` (`activity_page`).
//!
//! # Invariants
//! - At most one store mutation happens per presented prompt.
//! - Cancelled prompts never touch the store.

pub mod activity_page;
pub mod prompt;
