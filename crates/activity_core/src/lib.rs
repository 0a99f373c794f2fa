//! Core domain logic for ActivityLog.
//! This crate is the single source of truth for the activity collection and
//! its persistence contract.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod page;
pub mod store;

pub use config::ActivityConfig;
pub use gateway::{
    GatewayError, GatewayResult, MemoryGateway, PersistenceGateway, SqliteGateway, ACTIVITIES_KEY,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::activity::{Activity, ActivityId};
pub use model::date::{format_date, parse_date};
pub use model::draft::{
    ActivityDraft, DraftValidationError, FieldError, FieldErrorKind, FieldValue, FieldValues,
    FIELD_DATE, FIELD_DURATION, FIELD_TYPE,
};
pub use page::activity_page::{ActivityPage, PageOutcome};
pub use page::prompt::{
    ActionRole, ConfirmRequest, FieldKind, InputCollector, PromptAction, PromptField,
    PromptOutcome, PromptRequest,
};
pub use store::activity_store::{ActivityStore, LoadOutcome};
pub use store::error::{StoreError, StoreResult};
pub use store::snapshot::{decode_snapshot, encode_snapshot, DecodedSnapshot, SnapshotError};
pub use store::writer::{Generation, PersistStatus, SaveTicket};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
