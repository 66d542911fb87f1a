//! Review service: item creation, due listing and review recording over a store.

use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ReviewConfig;
use crate::database::{ReviewStore, WriteOutcome};
use crate::error::{ReviewError, Result};
use crate::models::sm2::preview_intervals;
use crate::models::{ItemId, ItemKind, LearningItem, NewItem, Schedule};

pub struct ReviewService<S> {
    store: S,
    clock: Arc<dyn Clock>,
    config: ReviewConfig,
}

impl<S: ReviewStore> ReviewService<S> {
    pub fn new(store: S, config: ReviewConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, config: ReviewConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Current time at millisecond precision, the resolution stores persist.
    /// Timestamps written through the service therefore read back unchanged.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    /// Stores a new item with default ease/interval and the configured first due date.
    pub fn add_item(&self, item: NewItem) -> Result<LearningItem> {
        let now = self.now();
        let schedule = Schedule::new(self.config.initial_due(item.kind()), now);
        let stored = self.store.insert_item(&item, &schedule, now)?;
        info!(id = stored.id, kind = %stored.kind(), user = %stored.user_id, "item created");
        Ok(stored)
    }

    pub fn add_flashcard(&self, user_id: &str, term: &str, definition: &str) -> Result<LearningItem> {
        self.add_item(NewItem::flashcard(user_id, term, definition))
    }

    pub fn add_note(&self, user_id: &str, term: &str, body: &str) -> Result<LearningItem> {
        self.add_item(NewItem::note(user_id, term, body))
    }

    pub fn get_item(&self, id: ItemId) -> Result<LearningItem> {
        self.store.get_item(id)?.ok_or(ReviewError::NotFound(id))
    }

    pub fn list_items(&self, user_id: &str) -> Result<Vec<LearningItem>> {
        Ok(self.store.list_items(user_id)?)
    }

    /// Items due now, unscheduled first, then most overdue first. Never mutates.
    pub fn due_items(&self, user_id: &str, kind: Option<ItemKind>) -> Result<Vec<LearningItem>> {
        Ok(self.store.due_items(user_id, kind, self.now())?)
    }

    /// Applies one quality rating to an item and persists the new schedule.
    ///
    /// Ease, interval, next review date, review count and last review time are
    /// written together; on any failure nothing is changed.
    pub fn record_review(&self, id: ItemId, quality: i32) -> Result<LearningItem> {
        let quality = self.config.quality_policy.admit(quality)?;
        let mut item = self.get_item(id)?;

        let now = self.now();
        let next = item.schedule.next_review(quality, now);
        item.schedule.apply(&next, now);

        let expected = self.config.optimistic_concurrency.then_some(item.version);
        match self.store.write_schedule(id, &item.schedule, expected)? {
            WriteOutcome::Written { version } => {
                item.version = version;
                info!(
                    id,
                    quality,
                    ease_factor = item.schedule.ease_factor,
                    interval_days = item.schedule.interval_days,
                    "review recorded"
                );
                Ok(item)
            }
            WriteOutcome::Missing => Err(ReviewError::NotFound(id)),
            WriteOutcome::Stale { current_version } => {
                warn!(id, expected = item.version, current_version, "stale review write rejected");
                Err(ReviewError::Conflict {
                    id,
                    expected: item.version,
                    found: current_version,
                })
            }
        }
    }

    /// Interval each rating 0-5 would give the item, without recording anything.
    pub fn preview(&self, id: ItemId) -> Result<[i32; 6]> {
        let item = self.get_item(id)?;
        Ok(preview_intervals(
            item.schedule.ease_factor,
            item.schedule.interval_days,
        ))
    }

    pub fn delete_item(&self, id: ItemId) -> Result<()> {
        if self.store.delete_item(id)? {
            info!(id, "item deleted");
            Ok(())
        } else {
            Err(ReviewError::NotFound(id))
        }
    }
}
