//! Single-writer snapshot persistence.
//!
//! # Responsibility
//! - Run exactly one background task that writes snapshots to the gateway.
//! - Coalesce snapshots queued while a write is in flight.
//! - Report write progress and failures through `PersistStatus`.
//!
//! # Invariants
//! - Generations are issued in strictly increasing order.
//! - The task only ever writes the newest queued snapshot, so the last-issued
//!   save is the last one written.
//! - Closing the writer drains the newest snapshot before the task exits.

use crate::gateway::PersistenceGateway;
use crate::store::error::{StoreError, StoreResult};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Monotonic number identifying one queued snapshot.
pub type Generation = u64;

/// Handle for one queued save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub generation: Generation,
}

/// Progress of the background writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistStatus {
    /// Newest generation whose write has finished (successfully or not).
    pub written_generation: Generation,
    /// Error of the write for `written_generation`, if it failed.
    pub last_error: Option<String>,
    /// Total failed writes over the writer lifetime.
    pub failed_writes: u64,
}

impl PersistStatus {
    /// Whether the newest finished write succeeded.
    pub fn is_healthy(&self) -> bool {
        self.last_error.is_none()
    }
}

#[derive(Debug, Clone)]
struct PendingSnapshot {
    generation: Generation,
    value: Value,
}

/// Owner side of the background writer task.
pub struct SnapshotWriter {
    pending: Option<watch::Sender<Option<PendingSnapshot>>>,
    status: watch::Receiver<PersistStatus>,
    issued: Generation,
    task: Option<JoinHandle<()>>,
}

impl SnapshotWriter {
    /// Spawns the writer task on the current tokio runtime.
    pub fn spawn<G>(gateway: Arc<G>, key: impl Into<String>) -> Self
    where
        G: PersistenceGateway + ?Sized + 'static,
    {
        let (pending_tx, pending_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(PersistStatus::default());
        let task = tokio::spawn(run_writer(gateway, key.into(), pending_rx, status_tx));

        Self {
            pending: Some(pending_tx),
            status: status_rx,
            issued: 0,
            task: Some(task),
        }
    }

    /// Queues `value` as the newest snapshot. Never waits for the write.
    ///
    /// # Errors
    /// Returns `StoreError::Closed` when the writer task is gone.
    pub fn submit(&mut self, value: Value) -> StoreResult<SaveTicket> {
        let sender = self.pending.as_ref().ok_or(StoreError::Closed)?;
        let generation = self.issued + 1;
        sender
            .send(Some(PendingSnapshot { generation, value }))
            .map_err(|_| StoreError::Closed)?;
        self.issued = generation;
        Ok(SaveTicket { generation })
    }

    /// Current writer progress.
    pub fn status(&self) -> PersistStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change, for UI notifications.
    pub fn subscribe(&self) -> watch::Receiver<PersistStatus> {
        self.status.clone()
    }

    /// Waits until `ticket` (or a newer snapshot) has been written.
    ///
    /// # Errors
    /// - `StoreError::Persist` when that write failed.
    /// - `StoreError::Closed` when the task exited before reaching it.
    pub async fn wait_for(&self, ticket: SaveTicket) -> StoreResult<()> {
        let mut status = self.status.clone();
        let reached = status
            .wait_for(|status| status.written_generation >= ticket.generation)
            .await
            .map_err(|_| StoreError::Closed)?;
        match &reached.last_error {
            Some(message) => Err(StoreError::Persist(message.clone())),
            None => Ok(()),
        }
    }

    /// Waits for the newest issued snapshot; returns immediately if none.
    pub async fn flush(&self) -> StoreResult<()> {
        if self.issued == 0 {
            return Ok(());
        }
        self.wait_for(SaveTicket {
            generation: self.issued,
        })
        .await
    }

    /// Stops accepting snapshots, drains the newest one and joins the task.
    pub async fn close(mut self) -> StoreResult<()> {
        self.pending.take();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                error!("event=writer_close module=store status=error error={err}");
                return Err(StoreError::Closed);
            }
        }
        let status = self.status.borrow().clone();
        match status.last_error {
            Some(message) if status.written_generation == self.issued => {
                Err(StoreError::Persist(message))
            }
            _ => Ok(()),
        }
    }
}

async fn run_writer<G>(
    gateway: Arc<G>,
    key: String,
    mut pending: watch::Receiver<Option<PendingSnapshot>>,
    status: watch::Sender<PersistStatus>,
) where
    G: PersistenceGateway + ?Sized,
{
    debug!("event=writer_start module=store status=ok");
    let mut written: Generation = 0;

    while pending.changed().await.is_ok() {
        let next = pending.borrow_and_update().clone();
        if let Some(snapshot) = next {
            written = write_snapshot(gateway.as_ref(), &key, snapshot, &status).await;
        }
    }

    // The sender is gone; a snapshot queued right before that may be unseen.
    let last = pending.borrow().clone();
    if let Some(snapshot) = last {
        if snapshot.generation > written {
            written = write_snapshot(gateway.as_ref(), &key, snapshot, &status).await;
        }
    }

    info!("event=writer_stop module=store status=ok written_generation={written}");
}

async fn write_snapshot<G>(
    gateway: &G,
    key: &str,
    snapshot: PendingSnapshot,
    status: &watch::Sender<PersistStatus>,
) -> Generation
where
    G: PersistenceGateway + ?Sized,
{
    let generation = snapshot.generation;
    let result = gateway.set(key, snapshot.value).await;

    match &result {
        Ok(()) => debug!("event=snapshot_write module=store status=ok generation={generation}"),
        Err(err) => warn!(
            "event=snapshot_write module=store status=error generation={generation} error={err}"
        ),
    }

    status.send_modify(|current| {
        current.written_generation = generation;
        match result {
            Ok(()) => current.last_error = None,
            Err(err) => {
                current.last_error = Some(err.to_string());
                current.failed_writes += 1;
            }
        }
    });
    generation
}
