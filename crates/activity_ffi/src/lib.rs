//! Flutter-facing bindings for the activity core.

pub mod api;
