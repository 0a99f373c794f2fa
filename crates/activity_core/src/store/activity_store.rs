//! Activity collection store.
//!
//! # Responsibility
//! - Own the canonical in-memory activity collection for one session.
//! - Queue a snapshot write after every mutation.
//! - Restore the collection from the gateway on startup.
//!
//! # Invariants
//! - Insertion order is display order; `add` appends at the end.
//! - `update` and `remove` address records by `ActivityId` only.
//! - Rejected input never mutates the collection or triggers a write.

use crate::gateway::{PersistenceGateway, ACTIVITIES_KEY};
use crate::model::activity::{Activity, ActivityId};
use crate::model::draft::{ActivityDraft, FieldValues};
use crate::store::error::{StoreError, StoreResult};
use crate::store::snapshot::{decode_snapshot, encode_snapshot};
use crate::store::writer::{PersistStatus, SaveTicket, SnapshotWriter};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// What `load` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot was stored; the collection was left unchanged.
    Absent,
    /// The collection was replaced by the stored snapshot.
    Restored { restored: usize, skipped: usize },
}

/// Session-scoped store of the user's activities.
pub struct ActivityStore<G: PersistenceGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    key: String,
    activities: Vec<Activity>,
    writer: SnapshotWriter,
}

impl<G: PersistenceGateway + ?Sized + 'static> ActivityStore<G> {
    /// Opens the gateway, starts the writer and loads the stored snapshot.
    ///
    /// A failed load is logged and leaves the collection empty; use `open`
    /// followed by `load` to observe the load result.
    ///
    /// # Errors
    /// Returns `StoreError::Open` when the gateway cannot be prepared.
    pub async fn initialize(gateway: Arc<G>) -> StoreResult<Self> {
        let mut store = Self::open(gateway).await?;
        if let Err(err) = store.load().await {
            warn!("event=store_init module=store status=degraded error={err}");
        }
        Ok(store)
    }

    /// Opens the gateway and starts the writer with an empty collection.
    pub async fn open(gateway: Arc<G>) -> StoreResult<Self> {
        Self::open_with_key(gateway, ACTIVITIES_KEY).await
    }

    /// Same as `open`, storing the snapshot under a custom key.
    pub async fn open_with_key(gateway: Arc<G>, key: impl Into<String>) -> StoreResult<Self> {
        let started_at = Instant::now();
        if let Err(err) = gateway.open().await {
            error!(
                "event=store_open module=store status=error duration_ms={} error_code=gateway_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(StoreError::Open(err));
        }

        let key = key.into();
        let writer = SnapshotWriter::spawn(Arc::clone(&gateway), key.clone());
        info!(
            "event=store_open module=store status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            gateway,
            key,
            activities: Vec::new(),
            writer,
        })
    }

    /// Replaces the collection with the stored snapshot, if one exists.
    ///
    /// Pending saves of this store are written before reading. Records that
    /// were stored without an id receive one and the snapshot is rewritten,
    /// so repeated loads see the same ids.
    ///
    /// # Errors
    /// - `StoreError::Load` when the gateway read fails.
    /// - `StoreError::Snapshot` when the stored value is not a list.
    /// - `StoreError::Closed` when the writer task is gone.
    ///
    /// The collection is unchanged on error.
    pub async fn load(&mut self) -> StoreResult<LoadOutcome> {
        // Queued snapshots must land first or the read returns stale data.
        match self.writer.flush().await {
            Ok(()) => {}
            Err(StoreError::Persist(message)) => {
                warn!("event=store_load module=store status=stale_write error={message}");
            }
            Err(err) => return Err(err),
        }

        let stored = self
            .gateway
            .get(&self.key)
            .await
            .map_err(StoreError::Load)?;
        let Some(value) = stored else {
            info!("event=store_load module=store status=ok found=false");
            return Ok(LoadOutcome::Absent);
        };

        let decoded = decode_snapshot(value)?;
        if !decoded.skipped.is_empty() {
            warn!(
                "event=store_load module=store status=partial skipped={} skipped_indices={:?}",
                decoded.skipped.len(),
                decoded.skipped
            );
        }

        let outcome = LoadOutcome::Restored {
            restored: decoded.activities.len(),
            skipped: decoded.skipped.len(),
        };
        self.activities = decoded.activities;
        info!(
            "event=store_load module=store status=ok found=true count={} assigned_ids={}",
            self.activities.len(),
            decoded.assigned_ids
        );

        if decoded.assigned_ids > 0 {
            self.persist();
        }
        Ok(outcome)
    }

    /// Queues the current collection for writing; never waits.
    ///
    /// # Errors
    /// Returns `StoreError::Closed` when the writer task is gone.
    pub fn save(&mut self) -> StoreResult<SaveTicket> {
        let value = encode_snapshot(&self.activities)?;
        self.writer.submit(value)
    }

    /// Appends a new activity built from `draft` and queues a save.
    pub fn add(&mut self, draft: ActivityDraft) -> ActivityId {
        let activity = Activity::from_draft(draft);
        let id = activity.id;
        self.activities.push(activity);
        info!(
            "event=activity_add module=store status=ok count={}",
            self.activities.len()
        );
        self.persist();
        id
    }

    /// Parses raw input and appends it.
    ///
    /// # Errors
    /// Returns `StoreError::Validation` listing failing fields; nothing changes.
    pub fn add_from_fields(&mut self, values: &FieldValues) -> StoreResult<ActivityId> {
        let draft = ActivityDraft::parse(values)?;
        Ok(self.add(draft))
    }

    /// Overwrites the fields of activity `id` in place and queues a save.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` when `id` is not in the collection; no
    /// save is queued in that case.
    pub fn update(&mut self, id: ActivityId, draft: ActivityDraft) -> StoreResult<()> {
        let activity = self
            .activities
            .iter_mut()
            .find(|activity| activity.id == id)
            .ok_or(StoreError::NotFound(id))?;
        activity.apply(draft);
        info!("event=activity_update module=store status=ok");
        self.persist();
        Ok(())
    }

    /// Parses raw input and applies it to activity `id`.
    ///
    /// Membership is checked before validation.
    pub fn update_from_fields(&mut self, id: ActivityId, values: &FieldValues) -> StoreResult<()> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        let draft = ActivityDraft::parse(values)?;
        self.update(id, draft)
    }

    /// Removes activity `id`, keeping the order of the rest.
    ///
    /// A save is queued even when nothing was removed. Returns whether a
    /// record was removed.
    pub fn remove(&mut self, id: ActivityId) -> bool {
        let before = self.activities.len();
        self.activities.retain(|activity| activity.id != id);
        let removed = self.activities.len() != before;
        info!(
            "event=activity_remove module=store status=ok removed={} count={}",
            removed,
            self.activities.len()
        );
        self.persist();
        removed
    }

    /// Activities in display order.
    pub fn list(&self) -> &[Activity] {
        &self.activities
    }

    /// Looks up one activity by id.
    pub fn get(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Key the snapshot is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits until the newest queued snapshot has been written.
    ///
    /// # Errors
    /// Returns `StoreError::Persist` when that write failed.
    pub async fn flush(&self) -> StoreResult<()> {
        self.writer.flush().await
    }

    /// Waits for one specific save.
    pub async fn wait_for(&self, ticket: SaveTicket) -> StoreResult<()> {
        self.writer.wait_for(ticket).await
    }

    /// Current persistence progress.
    pub fn persist_status(&self) -> PersistStatus {
        self.writer.status()
    }

    /// Observes persistence progress, e.g. to show a storage warning.
    pub fn subscribe_persist_status(&self) -> watch::Receiver<PersistStatus> {
        self.writer.subscribe()
    }

    /// Ends the session after the newest snapshot is written.
    ///
    /// The stored snapshot outlives the store.
    pub async fn close(self) -> StoreResult<()> {
        let count = self.activities.len();
        let result = self.writer.close().await;
        match &result {
            Ok(()) => info!("event=store_close module=store status=ok count={count}"),
            Err(err) => warn!("event=store_close module=store status=error error={err}"),
        }
        result
    }

    fn persist(&mut self) {
        if let Err(err) = self.save() {
            error!("event=store_save module=store status=error error={err}");
        }
    }
}
