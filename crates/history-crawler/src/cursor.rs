//! Per-group scan cursors.
//!
//! Each group owns one slot guarded by its own mutex. A crawl holds the slot for its whole
//! duration through a [`ScanLease`], so calls for the same group run one at a time while calls
//! for different groups never contend.
//!
//! A store built with [`ScanCursorStore::with_ttl`] forgets a cursor that has not advanced for
//! `ttl`; the next crawl of that group starts from the newest message again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use portrayal_core::GroupId;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use tracing::debug;

/// Cursor value meaning "nothing scanned yet; start from the newest message".
pub const CURSOR_NEWEST: i64 = 0;

#[derive(Debug)]
struct CursorSlot {
    position: i64,
    advanced_at: Instant,
}

impl CursorSlot {
    fn newest() -> Self {
        Self {
            position: CURSOR_NEWEST,
            advanced_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.position != CURSOR_NEWEST && self.advanced_at.elapsed() > ttl,
            None => false,
        }
    }
}

/// Owned store of "oldest pagination key already scanned", keyed by group.
#[derive(Debug, Clone, Default)]
pub struct ScanCursorStore {
    ttl: Option<Duration>,
    slots: Arc<RwLock<HashMap<GroupId, Arc<Mutex<CursorSlot>>>>>,
}

impl ScanCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose cursors reset to [`CURSOR_NEWEST`] `ttl` after their last advance.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    async fn slot(&self, group: &GroupId) -> Arc<Mutex<CursorSlot>> {
        if let Some(slot) = self.slots.read().await.get(group) {
            return slot.clone();
        }
        let mut slots = self.slots.write().await;
        slots
            .entry(group.clone())
            .or_insert_with(|| Arc::new(Mutex::new(CursorSlot::newest())))
            .clone()
    }

    /// Takes exclusive ownership of a group's cursor, waiting for any running crawl of that
    /// group. An expired cursor is reset before the lease is handed out.
    pub async fn lease(&self, group: &GroupId) -> ScanLease {
        let mut guard = self.slot(group).await.lock_owned().await;
        if guard.is_expired(self.ttl) {
            debug!(
                group = %group,
                position = guard.position,
                "Scan cursor expired; restarting from newest"
            );
            *guard = CursorSlot::newest();
        }
        ScanLease { guard }
    }

    /// Current cursor of a group, `None` when the group was never advanced or its cursor
    /// expired. Waits while a crawl of that group is running.
    pub async fn get(&self, group: &GroupId) -> Option<i64> {
        let slot = self.slots.read().await.get(group).cloned()?;
        let slot = slot.lock().await;
        if slot.is_expired(self.ttl) {
            return None;
        }
        (slot.position != CURSOR_NEWEST).then_some(slot.position)
    }

    pub async fn remove(&self, group: &GroupId) {
        self.slots.write().await.remove(group);
    }

    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }
}

/// Exclusive access to one group's cursor for the duration of a crawl.
#[derive(Debug)]
pub struct ScanLease {
    guard: OwnedMutexGuard<CursorSlot>,
}

impl ScanLease {
    pub fn position(&self) -> i64 {
        self.guard.position
    }

    /// Moves the cursor to `key` unless that would move it towards newer messages.
    /// Returns false (and leaves the cursor untouched) in that case.
    pub fn advance(&mut self, key: i64) -> bool {
        let current = self.guard.position;
        if current == CURSOR_NEWEST || key <= current {
            self.guard.position = key;
            self.guard.advanced_at = Instant::now();
            true
        } else {
            false
        }
    }
}
