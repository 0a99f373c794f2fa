//! Raw field input and validated activity drafts.
//!
//! # Responsibility
//! - Represent values reported by an input collector (`FieldValues`).
//! - Coerce permissive user input into a typed `ActivityDraft`.
//!
//! # Invariants
//! - Parsing reports every failing field at once, not only the first.
//! - `kind` is kept exactly as typed; only `duration` and `date` are coerced.

use crate::model::date::parse_date;
use chrono::{DateTime, NaiveDate};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input field name for the activity label.
pub const FIELD_TYPE: &str = "type";
/// Input field name for the duration in minutes.
pub const FIELD_DURATION: &str = "duration";
/// Input field name for the calendar date.
pub const FIELD_DATE: &str = "date";

/// One raw value as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    /// Returns the value rendered as text, the way a text input would show it.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => value.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Mapping from field name to raw value, as reported by a submit action.
pub type FieldValues = BTreeMap<String, FieldValue>;

/// Validated field set ready to be applied to an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDraft {
    pub kind: String,
    pub duration_minutes: f64,
    pub date: NaiveDate,
}

impl ActivityDraft {
    /// Parses raw input into a draft.
    ///
    /// # Errors
    /// Returns `DraftValidationError` naming each missing or unparsable field.
    pub fn parse(values: &FieldValues) -> Result<Self, DraftValidationError> {
        let mut errors = Vec::new();

        let kind = match values.get(FIELD_TYPE) {
            Some(value) => Some(value.as_text()),
            None => {
                errors.push(FieldError::missing(FIELD_TYPE));
                None
            }
        };

        let duration_minutes = match values.get(FIELD_DURATION) {
            Some(value) => match coerce_duration(value) {
                Ok(minutes) => Some(minutes),
                Err(err) => {
                    errors.push(err);
                    None
                }
            },
            None => {
                errors.push(FieldError::missing(FIELD_DURATION));
                None
            }
        };

        let date = match values.get(FIELD_DATE) {
            Some(value) => match coerce_date(value) {
                Ok(date) => Some(date),
                Err(err) => {
                    errors.push(err);
                    None
                }
            },
            None => {
                errors.push(FieldError::missing(FIELD_DATE));
                None
            }
        };

        match (kind, duration_minutes, date) {
            (Some(kind), Some(duration_minutes), Some(date)) if errors.is_empty() => Ok(Self {
                kind,
                duration_minutes,
                date,
            }),
            _ => Err(DraftValidationError { fields: errors }),
        }
    }

    /// Convenience constructor from three raw strings.
    pub fn parse_strings(
        kind: &str,
        duration: &str,
        date: &str,
    ) -> Result<Self, DraftValidationError> {
        let mut values = FieldValues::new();
        values.insert(FIELD_TYPE.to_string(), FieldValue::from(kind));
        values.insert(FIELD_DURATION.to_string(), FieldValue::from(duration));
        values.insert(FIELD_DATE.to_string(), FieldValue::from(date));
        Self::parse(&values)
    }
}

fn coerce_duration(value: &FieldValue) -> Result<f64, FieldError> {
    let parsed = match value {
        FieldValue::Number(minutes) => *minutes,
        FieldValue::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(FieldError::missing(FIELD_DURATION));
            }
            // Comma decimals come from locales that use `,` as separator.
            trimmed
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|_| FieldError::invalid(FIELD_DURATION, "not a number"))?
        }
    };

    if !parsed.is_finite() {
        return Err(FieldError::invalid(FIELD_DURATION, "not a finite number"));
    }
    Ok(parsed)
}

fn coerce_date(value: &FieldValue) -> Result<NaiveDate, FieldError> {
    match value {
        FieldValue::Text(raw) => {
            if raw.trim().is_empty() {
                return Err(FieldError::missing(FIELD_DATE));
            }
            parse_date(raw).ok_or_else(|| FieldError::invalid(FIELD_DATE, "unrecognized date"))
        }
        // Numeric dates are epoch milliseconds.
        FieldValue::Number(millis) if millis.is_finite() => {
            DateTime::from_timestamp_millis(*millis as i64)
                .map(|timestamp| timestamp.date_naive())
                .ok_or_else(|| FieldError::invalid(FIELD_DATE, "timestamp out of range"))
        }
        FieldValue::Number(_) => Err(FieldError::invalid(FIELD_DATE, "not a finite timestamp")),
    }
}

/// Reason one field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    Missing,
    Invalid(&'static str),
}

/// One failing field in a submitted draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    fn missing(field: &'static str) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Missing,
        }
    }

    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Invalid(reason),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FieldErrorKind::Missing => write!(f, "`{}` is required", self.field),
            FieldErrorKind::Invalid(reason) => write!(f, "`{}` is invalid: {reason}", self.field),
        }
    }
}

/// Draft rejected before any state was mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftValidationError {
    pub fields: Vec<FieldError>,
}

impl DraftValidationError {
    /// Names of the failing fields in input order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|error| error.field).collect()
    }
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let details = self
            .fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid activity input: {details}")
    }
}

impl Error for DraftValidationError {}
