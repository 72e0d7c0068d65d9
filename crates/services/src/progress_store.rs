//! Device-local "continue reading" list.
//!
//! Entries live as one JSON array under [`keys::READING_PROGRESS`]. The list
//! holds at most one entry per chapter and at most `capacity` chapters; when
//! full, the chapter read least recently is dropped. Nothing here is synced to
//! the backend, and failures only cost the reader a stale list, so every
//! storage problem is logged and swallowed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use katha_core::Clock;
use katha_core::model::{ChapterId, ReadingProgressEntry};
use storage::{KeyValueStore, StorageError, keys};
use tracing::{debug, warn};

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    capacity: usize,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            kv,
            capacity: DEFAULT_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Record a reading position. `last_read` is always stamped with the
    /// store's clock; whatever the caller put there is discarded.
    pub async fn save(&self, entry: ReadingProgressEntry) {
        self.save_at(entry, self.clock.now()).await;
    }

    pub(crate) async fn save_at(&self, mut entry: ReadingProgressEntry, now: DateTime<Utc>) {
        let chapter_id = entry.chapter_id;
        entry.last_read = now;

        let mut entries = self.get_all().await;
        entries.retain(|existing| existing.chapter_id != chapter_id);
        entries.insert(0, entry);
        sort_most_recent_first(&mut entries);
        let evicted = entries.len().saturating_sub(self.capacity);
        entries.truncate(self.capacity);

        match self.write(&entries).await {
            Ok(()) => debug!(%chapter_id, evicted, "saved reading progress"),
            Err(err) => warn!(%chapter_id, "failed to save reading progress: {err}"),
        }
    }

    /// All entries, most recently read first. Unreadable or corrupt data reads as empty.
    pub async fn get_all(&self) -> Vec<ReadingProgressEntry> {
        let stored = match self.kv.get(keys::READING_PROGRESS).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("failed to read reading progress: {err}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ReadingProgressEntry>>(&stored) {
            Ok(mut entries) => {
                sort_most_recent_first(&mut entries);
                entries
            }
            Err(err) => {
                warn!("ignoring unparsable reading progress: {err}");
                Vec::new()
            }
        }
    }

    pub async fn get_most_recent(&self) -> Option<ReadingProgressEntry> {
        self.get_all().await.into_iter().next()
    }

    pub async fn get_for_chapter(&self, chapter_id: ChapterId) -> Option<ReadingProgressEntry> {
        self.get_all()
            .await
            .into_iter()
            .find(|entry| entry.chapter_id == chapter_id)
    }

    pub async fn clear_all(&self) {
        if let Err(err) = self.kv.remove(keys::READING_PROGRESS).await {
            warn!("failed to clear reading progress: {err}");
        }
    }

    pub async fn remove_for_chapter(&self, chapter_id: ChapterId) {
        let mut entries = self.get_all().await;
        let before = entries.len();
        entries.retain(|entry| entry.chapter_id != chapter_id);
        if entries.len() == before {
            return;
        }
        if let Err(err) = self.write(&entries).await {
            warn!(%chapter_id, "failed to remove reading progress: {err}");
        }
    }

    async fn write(&self, entries: &[ReadingProgressEntry]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(entries)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.set(keys::READING_PROGRESS, &encoded).await
    }
}

// stable, so entries stamped in the same instant keep their list order
fn sort_most_recent_first(entries: &mut [ReadingProgressEntry]) {
    entries.sort_by(|a, b| b.last_read.cmp(&a.last_read));
}
