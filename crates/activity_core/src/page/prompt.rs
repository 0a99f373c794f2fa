//! Input collector contract.
//!
//! A UI layer implements `InputCollector` to show dialogs; the core only
//! describes fields and actions and consumes the submitted values.

use crate::model::draft::{FieldValue, FieldValues};
use async_trait::async_trait;

/// Kind of input widget for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

/// One labeled input field.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptField {
    pub name: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    /// Pre-filled value shown when the prompt opens.
    pub value: Option<FieldValue>,
}

impl PromptField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            placeholder: None,
            value: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn prefilled(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Whether choosing an action submits values or dismisses the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRole {
    Cancel,
    Submit,
}

/// One named button of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAction {
    pub label: String,
    pub role: ActionRole,
}

impl PromptAction {
    pub fn cancel(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            role: ActionRole::Cancel,
        }
    }

    pub fn submit(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            role: ActionRole::Submit,
        }
    }
}

/// Dialog asking the user for field values.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub header: String,
    pub fields: Vec<PromptField>,
    pub actions: Vec<PromptAction>,
}

impl PromptRequest {
    /// Label of the first submit action, if any.
    pub fn submit_label(&self) -> Option<&str> {
        self.actions
            .iter()
            .find(|action| action.role == ActionRole::Submit)
            .map(|action| action.label.as_str())
    }

    /// Field values as pre-filled, for collectors that accept defaults.
    pub fn prefilled_values(&self) -> FieldValues {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .value
                    .clone()
                    .map(|value| (field.name.clone(), value))
            })
            .collect()
    }
}

/// What the user chose in a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    /// A submit action was chosen with these raw values.
    Submitted { action: String, values: FieldValues },
    /// A cancel action was chosen or the prompt was dismissed.
    Cancelled,
}

/// Yes/no dialog without input fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub header: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

/// UI capability that gathers typed field values from the user.
#[async_trait]
pub trait InputCollector: Send + Sync {
    /// Presents `request` and reports the chosen action.
    async fn prompt(&self, request: PromptRequest) -> PromptOutcome;

    /// Presents a confirmation; `true` when the user confirmed.
    async fn confirm(&self, request: ConfirmRequest) -> bool;
}
