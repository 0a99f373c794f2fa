//! Store-level error type.

use crate::gateway::GatewayError;
use crate::model::activity::ActivityId;
use crate::model::draft::DraftValidationError;
use crate::store::snapshot::SnapshotError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by `ActivityStore` operations.
///
/// None of these abort a session; the in-memory collection stays usable.
#[derive(Debug)]
pub enum StoreError {
    /// The gateway could not be prepared. Fatal for the screen.
    Open(GatewayError),
    /// Reading the stored snapshot failed.
    Load(GatewayError),
    /// The stored snapshot could not be decoded or encoded.
    Snapshot(SnapshotError),
    /// The latest snapshot write failed.
    Persist(String),
    /// Submitted input was rejected before mutating state.
    Validation(DraftValidationError),
    /// Target activity is not a member of the collection.
    NotFound(ActivityId),
    /// The snapshot writer is no longer running.
    Closed,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "failed to open activity storage: {err}"),
            Self::Load(err) => write!(f, "failed to load activities: {err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Persist(message) => write!(f, "failed to save activities: {message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "activity not found: {id}"),
            Self::Closed => write!(f, "activity store is closed"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Load(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Persist(_) | Self::NotFound(_) | Self::Closed => None,
        }
    }
}

impl From<SnapshotError> for StoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<DraftValidationError> for StoreError {
    fn from(value: DraftValidationError) -> Self {
        Self::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::gateway::GatewayError;
    use crate::model::draft::ActivityDraft;
    use std::error::Error;
    use uuid::Uuid;

    #[test]
    fn not_found_names_the_id() {
        let id = Uuid::new_v4();
        assert!(StoreError::NotFound(id).to_string().contains(&id.to_string()));
    }

    #[test]
    fn validation_errors_convert_and_keep_source() {
        let validation = ActivityDraft::parse_strings("Run", "x", "2024-01-01").unwrap_err();
        let err: StoreError = validation.into();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn open_error_wraps_gateway_error() {
        let err = StoreError::Open(GatewayError::NotOpen);
        assert!(err.to_string().contains("not open"));
    }
}
