//! Snapshot encoding for the persisted activity collection.
//!
//! # Responsibility
//! - Convert the in-memory collection to the single stored JSON value.
//! - Decode stored values back into activities, tolerating older records.
//!
//! # Invariants
//! - Encoding preserves collection order.
//! - Decoding never invents field values; records missing `id` get a fresh one,
//!   malformed records are skipped and reported by index.

use crate::model::activity::Activity;
use crate::model::date::parse_date;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result of decoding one stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSnapshot {
    /// Valid records in stored order.
    pub activities: Vec<Activity>,
    /// Indices of stored records that could not be decoded.
    pub skipped: Vec<usize>,
    /// Number of records that had no stored id and received a fresh one.
    pub assigned_ids: usize,
}

/// Snapshot value that cannot represent an activity collection.
#[derive(Debug)]
pub enum SnapshotError {
    NotAnArray(&'static str),
    Encode(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnArray(found) => {
                write!(f, "activity snapshot must be an array, found {found}")
            }
            Self::Encode(err) => write!(f, "activity snapshot encoding failed: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::NotAnArray(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct StoredActivity {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(rename = "type")]
    kind: String,
    duration: StoredDuration,
    date: String,
}

/// Durations written by number inputs may arrive as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDuration {
    Number(f64),
    Text(String),
}

impl StoredDuration {
    fn minutes(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Encodes the collection as the stored snapshot value.
pub fn encode_snapshot(activities: &[Activity]) -> Result<Value, SnapshotError> {
    serde_json::to_value(activities).map_err(SnapshotError::Encode)
}

/// Decodes a stored snapshot value.
///
/// # Errors
/// Returns `SnapshotError::NotAnArray` when the value is not a list at all.
pub fn decode_snapshot(value: Value) -> Result<DecodedSnapshot, SnapshotError> {
    let records = match value {
        Value::Array(records) => records,
        other => return Err(SnapshotError::NotAnArray(json_type_name(&other))),
    };

    let mut activities = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    let mut assigned_ids = 0;
    for (index, record) in records.into_iter().enumerate() {
        match decode_record(record) {
            Some((activity, had_id)) => {
                if !had_id {
                    assigned_ids += 1;
                }
                activities.push(activity);
            }
            None => skipped.push(index),
        }
    }

    Ok(DecodedSnapshot {
        activities,
        skipped,
        assigned_ids,
    })
}

fn decode_record(record: Value) -> Option<(Activity, bool)> {
    let stored: StoredActivity = serde_json::from_value(record).ok()?;
    let duration = stored.duration.minutes()?;
    let date = parse_date(&stored.date)?;
    let had_id = stored.id.is_some();
    let id = stored.id.unwrap_or_else(Uuid::new_v4);
    Some((Activity::with_id(id, stored.kind, duration, date), had_id))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, encode_snapshot, SnapshotError};
    use crate::model::activity::Activity;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn encoded_snapshot_is_ordered_array_of_records() {
        let first = Activity::new("Running", 30.0, date(2024, 1, 1));
        let second = Activity::new("Walking", 45.5, date(2024, 2, 2));
        let value = encode_snapshot(&[first.clone(), second.clone()]).unwrap();

        assert_eq!(
            value,
            json!([
                {"id": first.id.to_string(), "type": "Running", "duration": 30.0, "date": "2024-01-01"},
                {"id": second.id.to_string(), "type": "Walking", "duration": 45.5, "date": "2024-02-02"},
            ])
        );
    }

    #[test]
    fn decode_restores_ids_and_order() {
        let activities = vec![
            Activity::new("Running", 30.0, date(2024, 1, 1)),
            Activity::new("Running", 30.0, date(2024, 1, 1)),
        ];
        let decoded = decode_snapshot(encode_snapshot(&activities).unwrap()).unwrap();
        assert_eq!(decoded.activities, activities);
        assert!(decoded.skipped.is_empty());
        assert_eq!(decoded.assigned_ids, 0);
    }

    #[test]
    fn decode_accepts_records_without_id_and_timestamp_dates() {
        let decoded = decode_snapshot(json!([
            {"type": "Yoga", "duration": "25", "date": "2023-12-31T00:00:00.000Z"}
        ]))
        .unwrap();
        assert_eq!(decoded.activities.len(), 1);
        assert_eq!(decoded.assigned_ids, 1);
        let activity = &decoded.activities[0];
        assert_eq!(activity.kind, "Yoga");
        assert_eq!(activity.duration_minutes, 25.0);
        assert_eq!(activity.date, date(2023, 12, 31));
    }

    #[test]
    fn decode_skips_malformed_records_and_reports_them() {
        let decoded = decode_snapshot(json!([
            {"type": "Ok", "duration": 10, "date": "2024-01-01"},
            {"type": "NoDate", "duration": 10},
            {"type": "BadDuration", "duration": "lots", "date": "2024-01-01"},
            "not a record",
        ]))
        .unwrap();
        assert_eq!(decoded.activities.len(), 1);
        assert_eq!(decoded.skipped, vec![1, 2, 3]);
    }

    #[test]
    fn decode_rejects_non_array_values() {
        let err = decode_snapshot(json!({"type": "Run"})).unwrap_err();
        assert!(matches!(err, SnapshotError::NotAnArray("object")));
    }
}
