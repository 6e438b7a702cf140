//! Notifications and optimistic read-state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use agora_types::{DataError, DataResult, Notification, NotificationId};
use tracing::{debug, info, warn};

use crate::cell::ObservableCell;
use crate::guard::InFlight;
use crate::remote::NotificationRemote;
use crate::store::{Keyed, Store, StoreReader};

/// A cached notification with its read flag as a live cell.
#[derive(Debug, Clone)]
pub struct NotificationEntry {
    pub notification: Notification,
    pub read: ObservableCell<bool>,
}

impl From<Notification> for NotificationEntry {
    fn from(notification: Notification) -> Self {
        Self {
            read: ObservableCell::new(notification.read),
            notification,
        }
    }
}

impl Keyed for NotificationEntry {
    type Key = NotificationId;

    fn key(&self) -> &NotificationId {
        &self.notification.id
    }
}

/// What happened to a mark-read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The server accepted; the flags stay set.
    Applied,
    /// Nothing was unread, no request was sent.
    Unchanged,
    /// The server rejected; every flag flipped by this call was restored.
    RolledBack(DataError),
    /// The same notification is already being marked.
    Busy,
}

/// Owns the notification list.
pub struct NotificationRepository {
    remote: Arc<dyn NotificationRemote>,
    entries: Store<NotificationEntry>,
    in_flight: InFlight<NotificationId>,
    /// Bumped by every accepted mark-all.
    all_read_epoch: AtomicU64,
}

impl NotificationRepository {
    pub fn new(remote: Arc<dyn NotificationRemote>) -> Self {
        Self {
            remote,
            entries: Store::new(),
            in_flight: InFlight::new(),
            all_read_epoch: AtomicU64::new(0),
        }
    }

    pub fn notifications(&self) -> StoreReader<NotificationEntry> {
        self.entries.reader()
    }

    pub fn unread_count(&self) -> usize {
        self.entries
            .snapshot()
            .iter()
            .filter(|entry| !entry.read.get())
            .count()
    }

    /// Register this device's push token with the server.
    pub async fn register_push_token(&self, token: &str) -> DataResult<()> {
        self.remote.register_push_token(token).await?;
        info!("Push token registered");
        Ok(())
    }

    /// Replace the cache with the server's list.
    pub async fn refresh(&self) -> DataResult<()> {
        let notifications = self.remote.notifications().await.inspect_err(|e| {
            warn!(error = %e, "Notification refresh failed");
        })?;
        debug!(
            notification_count = notifications.len(),
            "Notifications refreshed"
        );
        self.entries.replace_all(
            notifications
                .into_iter()
                .map(NotificationEntry::from)
                .collect(),
        );
        Ok(())
    }

    /// Mark one notification read, optimistically.
    pub async fn mark_read(&self, entry: &NotificationEntry) -> ReadOutcome {
        let id = &entry.notification.id;
        let Some(_permit) = self.in_flight.try_acquire(id) else {
            warn!(notification_id = %id, "Mark-read already in flight");
            return ReadOutcome::Busy;
        };

        if entry.read.set(true) {
            return ReadOutcome::Unchanged;
        }

        let epoch = self.all_read_epoch.load(Ordering::Acquire);
        match self.remote.mark_notification_read(id).await {
            Ok(()) => ReadOutcome::Applied,
            Err(e) if self.all_read_epoch.load(Ordering::Acquire) != epoch => {
                debug!(notification_id = %id, error = %e, "Mark-read failed but mark-all covered it");
                ReadOutcome::Applied
            }
            Err(e) => {
                entry.read.set(false);
                warn!(notification_id = %id, error = %e, "Mark-read rejected, rolled back");
                ReadOutcome::RolledBack(e)
            }
        }
    }

    /// Mark every unread notification read, optimistically.
    ///
    /// Entries with a single mark-read in flight are skipped locally; on
    /// failure only the entries flipped here are restored. On success every
    /// cached entry ends up read, and an in-flight single mark-read that
    /// later fails no longer rolls back.
    pub async fn mark_all_read(&self) -> ReadOutcome {
        let snapshot = self.entries.snapshot();
        let mut flipped = Vec::new();
        for entry in snapshot.iter().filter(|entry| !entry.read.get()) {
            if let Some(permit) = self.in_flight.try_acquire(&entry.notification.id) {
                if !entry.read.set(true) {
                    flipped.push((entry, permit));
                }
            }
        }

        if flipped.is_empty() {
            debug!("No unread notifications to mark");
            return ReadOutcome::Unchanged;
        }

        match self.remote.mark_all_notifications_read().await {
            Ok(()) => {
                self.all_read_epoch.fetch_add(1, Ordering::AcqRel);
                for entry in snapshot.iter() {
                    entry.read.set(true);
                }
                info!(notification_count = flipped.len(), "Marked all read");
                ReadOutcome::Applied
            }
            Err(e) => {
                for (entry, _permit) in &flipped {
                    entry.read.set(false);
                }
                warn!(
                    notification_count = flipped.len(),
                    error = %e,
                    "Mark-all-read rejected, rolled back"
                );
                ReadOutcome::RolledBack(e)
            }
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
