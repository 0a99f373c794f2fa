//! Activity screen controller.
//!
//! # Responsibility
//! - Build the add/edit/delete dialogs and hand them to an `InputCollector`.
//! - Apply submitted values to the store and report a `PageOutcome`.
//!
//! # Invariants
//! - The edit dialog is pre-filled from the current record.
//! - Rejected input leaves the store untouched.

use crate::gateway::PersistenceGateway;
use crate::model::activity::{Activity, ActivityId};
use crate::model::date::format_date;
use crate::model::draft::{FIELD_DATE, FIELD_DURATION, FIELD_TYPE};
use crate::page::prompt::{
    ConfirmRequest, FieldKind, InputCollector, PromptAction, PromptField, PromptOutcome,
    PromptRequest,
};
use crate::store::activity_store::ActivityStore;
use crate::store::error::{StoreError, StoreResult};
use log::info;
use std::sync::Arc;

const CANCEL_LABEL: &str = "Cancel";

/// Result of one user flow on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Added(ActivityId),
    Updated(ActivityId),
    Removed(ActivityId),
    Cancelled,
    /// The flow did not change anything; carries a user-facing notice.
    Rejected(String),
}

/// One activity screen session.
pub struct ActivityPage<G, C>
where
    G: PersistenceGateway + ?Sized + 'static,
    C: InputCollector,
{
    store: ActivityStore<G>,
    collector: C,
}

impl<G, C> ActivityPage<G, C>
where
    G: PersistenceGateway + ?Sized + 'static,
    C: InputCollector,
{
    /// Starts a session: opens storage and loads stored activities.
    pub async fn create(gateway: Arc<G>, collector: C) -> StoreResult<Self> {
        let store = ActivityStore::initialize(gateway).await?;
        Ok(Self::new(store, collector))
    }

    pub fn new(store: ActivityStore<G>, collector: C) -> Self {
        Self { store, collector }
    }

    pub fn activities(&self) -> &[Activity] {
        self.store.list()
    }

    pub fn store(&self) -> &ActivityStore<G> {
        &self.store
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    /// Asks for a new activity and appends it.
    pub async fn add_activity(&mut self) -> PageOutcome {
        let request = PromptRequest {
            header: "New Activity".to_string(),
            fields: vec![
                PromptField::new(FIELD_TYPE, FieldKind::Text)
                    .placeholder("Activity type (e.g. Running)"),
                PromptField::new(FIELD_DURATION, FieldKind::Number)
                    .placeholder("Duration (minutes)"),
                PromptField::new(FIELD_DATE, FieldKind::Date).placeholder("Activity date"),
            ],
            actions: vec![PromptAction::cancel(CANCEL_LABEL), PromptAction::submit("Add")],
        };

        match self.collector.prompt(request).await {
            PromptOutcome::Cancelled => PageOutcome::Cancelled,
            PromptOutcome::Submitted { values, .. } => match self.store.add_from_fields(&values) {
                Ok(id) => PageOutcome::Added(id),
                Err(err) => rejected("add", err),
            },
        }
    }

    /// Asks for new values for activity `id`, pre-filled with the current ones.
    pub async fn edit_activity(&mut self, id: ActivityId) -> PageOutcome {
        let Some(current) = self.store.get(id) else {
            return rejected("edit", StoreError::NotFound(id));
        };

        let request = PromptRequest {
            header: "Edit Activity".to_string(),
            fields: vec![
                PromptField::new(FIELD_TYPE, FieldKind::Text)
                    .placeholder("Activity type")
                    .prefilled(current.kind.as_str()),
                PromptField::new(FIELD_DURATION, FieldKind::Number)
                    .placeholder("Duration (minutes)")
                    .prefilled(current.duration_minutes),
                PromptField::new(FIELD_DATE, FieldKind::Date)
                    .placeholder("Activity date")
                    .prefilled(format_date(current.date)),
            ],
            actions: vec![PromptAction::cancel(CANCEL_LABEL), PromptAction::submit("Save")],
        };

        match self.collector.prompt(request).await {
            PromptOutcome::Cancelled => PageOutcome::Cancelled,
            PromptOutcome::Submitted { values, .. } => {
                match self.store.update_from_fields(id, &values) {
                    Ok(()) => PageOutcome::Updated(id),
                    Err(err) => rejected("edit", err),
                }
            }
        }
    }

    /// Asks for confirmation and removes activity `id`.
    pub async fn delete_activity(&mut self, id: ActivityId) -> PageOutcome {
        let Some(current) = self.store.get(id) else {
            return rejected("delete", StoreError::NotFound(id));
        };

        let request = ConfirmRequest {
            header: "Confirm Deletion".to_string(),
            message: format!("Delete activity \"{}\"?", current.kind),
            confirm_label: "Delete".to_string(),
            cancel_label: CANCEL_LABEL.to_string(),
        };

        if !self.collector.confirm(request).await {
            return PageOutcome::Cancelled;
        }
        self.store.remove(id);
        PageOutcome::Removed(id)
    }

    /// User-facing warning when the newest save failed.
    pub fn storage_notice(&self) -> Option<String> {
        self.store
            .persist_status()
            .last_error
            .map(|error| format!("Changes could not be saved: {error}"))
    }

    /// Ends the session, waiting for the final write.
    pub async fn close(self) -> StoreResult<()> {
        self.store.close().await
    }
}

fn rejected(flow: &'static str, err: StoreError) -> PageOutcome {
    info!("event=page_flow module=page status=rejected flow={flow}");
    PageOutcome::Rejected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ActivityPage, PageOutcome};
    use crate::gateway::MemoryGateway;
    use crate::model::draft::{FieldValue, FieldValues};
    use crate::page::prompt::{
        ConfirmRequest, FieldKind, InputCollector, PromptOutcome, PromptRequest,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingCollector {
        prompts: Mutex<Vec<PromptRequest>>,
    }

    #[async_trait]
    impl InputCollector for RecordingCollector {
        async fn prompt(&self, request: PromptRequest) -> PromptOutcome {
            let mut values = FieldValues::new();
            values.insert("type".to_string(), FieldValue::from("Running"));
            values.insert("duration".to_string(), FieldValue::from("30"));
            values.insert("date".to_string(), FieldValue::from("2024-01-01"));
            let action = request.submit_label().unwrap_or_default().to_string();
            self.prompts.lock().unwrap().push(request);
            PromptOutcome::Submitted { action, values }
        }

        async fn confirm(&self, _request: ConfirmRequest) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn add_prompt_declares_typed_fields() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut page = ActivityPage::create(gateway, RecordingCollector::default())
            .await
            .unwrap();

        let outcome = page.add_activity().await;
        assert!(matches!(outcome, PageOutcome::Added(_)));

        let prompts = page.collector.prompts.lock().unwrap();
        let kinds = prompts[0]
            .fields
            .iter()
            .map(|field| (field.name.as_str(), field.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("type", FieldKind::Text),
                ("duration", FieldKind::Number),
                ("date", FieldKind::Date)
            ]
        );
        assert_eq!(prompts[0].submit_label(), Some("Add"));
    }

    #[tokio::test]
    async fn edit_of_unknown_id_is_rejected_without_prompting() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut page = ActivityPage::create(gateway, RecordingCollector::default())
            .await
            .unwrap();

        let outcome = page.edit_activity(uuid::Uuid::new_v4()).await;
        assert!(matches!(outcome, PageOutcome::Rejected(message) if message.contains("not found")));
        assert!(page.collector.prompts.lock().unwrap().is_empty());
    }
}
