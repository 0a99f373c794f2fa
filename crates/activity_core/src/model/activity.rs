//! Activity domain record.
//!
//! # Responsibility
//! - Define the record persisted inside the activity snapshot.
//! - Apply validated drafts on create and in-place update.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes on update.
//! - Two activities with identical fields stay distinct through their ids.

use crate::model::draft::ActivityDraft;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Stable identifier for one logged activity.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ActivityId = Uuid;

/// One user-logged physical activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    /// Opaque id stored alongside the record in the snapshot.
    pub id: ActivityId,
    /// Free-text label such as "Running". Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Duration in minutes. Serialized as `duration`.
    #[serde(rename = "duration")]
    pub duration_minutes: f64,
    /// Calendar date; serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl Activity {
    /// Creates a new activity with a generated id.
    pub fn new(kind: impl Into<String>, duration_minutes: f64, date: NaiveDate) -> Self {
        Self::with_id(Uuid::new_v4(), kind, duration_minutes, date)
    }

    /// Creates an activity with a caller-provided id.
    ///
    /// Used when decoding snapshots where identity already exists.
    pub fn with_id(
        id: ActivityId,
        kind: impl Into<String>,
        duration_minutes: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            kind: kind.into(),
            duration_minutes,
            date,
        }
    }

    /// Builds a fresh activity from a validated draft.
    pub fn from_draft(draft: ActivityDraft) -> Self {
        Self::new(draft.kind, draft.duration_minutes, draft.date)
    }

    /// Overwrites every editable field from `draft`, keeping `id`.
    pub fn apply(&mut self, draft: ActivityDraft) {
        self.kind = draft.kind;
        self.duration_minutes = draft.duration_minutes;
        self.date = draft.date;
    }
}
