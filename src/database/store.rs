//! Persistence boundary for learning items.

use chrono::{DateTime, Utc};

use crate::models::{ItemId, ItemKind, LearningItem, NewItem, Schedule};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: ItemId, reason: String },

    #[error("Lock poisoned: {0}")]
    Poisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Result of a schedule write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { version: u64 },
    /// No row with that id
    Missing,
    /// The row moved past the expected version; nothing was written
    Stale { current_version: u64 },
}

/// Record store keyed by item id.
///
/// `write_schedule` must apply all schedule fields in one atomic write so that
/// readers never observe a half-updated schedule.
pub trait ReviewStore: Send + Sync {
    fn insert_item(
        &self,
        item: &NewItem,
        schedule: &Schedule,
        created_at: DateTime<Utc>,
    ) -> Result<LearningItem>;

    /// Inserts a batch of items. Either every item is stored or none is.
    ///
    /// The default inserts one at a time; stores whose inserts can fail
    /// midway must override it.
    fn insert_items(
        &self,
        items: &[(NewItem, Schedule, DateTime<Utc>)],
    ) -> Result<Vec<LearningItem>> {
        items
            .iter()
            .map(|(item, schedule, created_at)| self.insert_item(item, schedule, *created_at))
            .collect()
    }

    fn get_item(&self, id: ItemId) -> Result<Option<LearningItem>>;

    /// All items of a user, by ascending id.
    fn list_items(&self, user_id: &str) -> Result<Vec<LearningItem>>;

    /// Items with no next review date or one at or before `now`.
    /// Unscheduled items come first, the rest ascend by date, ties by id.
    fn due_items(
        &self,
        user_id: &str,
        kind: Option<ItemKind>,
        now: DateTime<Utc>,
    ) -> Result<Vec<LearningItem>>;

    /// Overwrites the schedule of one item and bumps its version.
    /// With `expected_version` set, the write only happens if it still matches.
    fn write_schedule(
        &self,
        id: ItemId,
        schedule: &Schedule,
        expected_version: Option<u64>,
    ) -> Result<WriteOutcome>;

    /// Returns false when there was nothing to delete.
    fn delete_item(&self, id: ItemId) -> Result<bool>;
}
