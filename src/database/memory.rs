//! In-process item store.
//!
//! Same contract as the SQLite store, held in a `BTreeMap` behind a mutex.
//! Useful for embedding and tests where no database file is wanted.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::store::{Result, ReviewStore, StorageError, WriteOutcome};
use crate::models::{ItemId, ItemKind, LearningItem, NewItem, Schedule, select_due};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: ItemId,
    items: BTreeMap<ItemId, LearningItem>,
}

impl MemoryState {
    fn insert(
        &mut self,
        item: &NewItem,
        schedule: &Schedule,
        created_at: DateTime<Utc>,
    ) -> LearningItem {
        self.last_id += 1;
        let stored = LearningItem {
            id: self.last_id,
            user_id: item.user_id.clone(),
            content: item.content.clone(),
            created_at,
            schedule: schedule.clone(),
            version: 0,
        };
        self.items.insert(stored.id, stored.clone());
        stored
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        // Writes never leave the map half-updated, so a poisoned map still counts right
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StorageError::Poisoned("memory store"))
    }
}

impl ReviewStore for MemoryStore {
    fn insert_item(
        &self,
        item: &NewItem,
        schedule: &Schedule,
        created_at: DateTime<Utc>,
    ) -> Result<LearningItem> {
        let mut state = self.lock()?;
        Ok(state.insert(item, schedule, created_at))
    }

    fn insert_items(
        &self,
        items: &[(NewItem, Schedule, DateTime<Utc>)],
    ) -> Result<Vec<LearningItem>> {
        let mut state = self.lock()?;
        Ok(items
            .iter()
            .map(|(item, schedule, created_at)| state.insert(item, schedule, *created_at))
            .collect())
    }

    fn get_item(&self, id: ItemId) -> Result<Option<LearningItem>> {
        Ok(self.lock()?.items.get(&id).cloned())
    }

    fn list_items(&self, user_id: &str) -> Result<Vec<LearningItem>> {
        let state = self.lock()?;
        Ok(state
            .items
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    fn due_items(
        &self,
        user_id: &str,
        kind: Option<ItemKind>,
        now: DateTime<Utc>,
    ) -> Result<Vec<LearningItem>> {
        let state = self.lock()?;
        // BTreeMap iteration is by id, so the stable sort breaks ties by id
        let candidates = state
            .items
            .values()
            .filter(|item| item.user_id == user_id)
            .filter(|item| kind.is_none_or(|k| item.kind() == k));
        Ok(select_due(candidates, now).into_iter().cloned().collect())
    }

    fn write_schedule(
        &self,
        id: ItemId,
        schedule: &Schedule,
        expected_version: Option<u64>,
    ) -> Result<WriteOutcome> {
        let mut state = self.lock()?;
        let Some(item) = state.items.get_mut(&id) else {
            return Ok(WriteOutcome::Missing);
        };
        if let Some(expected) = expected_version {
            if item.version != expected {
                return Ok(WriteOutcome::Stale {
                    current_version: item.version,
                });
            }
        }
        item.schedule = schedule.clone();
        item.version += 1;
        Ok(WriteOutcome::Written {
            version: item.version,
        })
    }

    fn delete_item(&self, id: ItemId) -> Result<bool> {
        Ok(self.lock()?.items.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 20, 7, 0, 0).unwrap()
    }

    fn scheduled(next: Option<DateTime<Utc>>) -> Schedule {
        Schedule {
            next_review_at: next,
            ..Schedule::default()
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store
            .insert_item(&NewItem::note("u", "a", "b"), &Schedule::default(), now())
            .unwrap();
        let b = store
            .insert_item(&NewItem::note("u", "c", "d"), &Schedule::default(), now())
            .unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_len_survives_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store
            .insert_item(&NewItem::note("u", "a", "b"), &Schedule::default(), now())
            .unwrap();

        let poisoner = store.clone();
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(joined.is_err());

        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        assert!(matches!(
            store.get_item(1),
            Err(StorageError::Poisoned(_))
        ));
    }

    #[test]
    fn test_batch_insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let batch = vec![
            (NewItem::note("u", "a", "b"), Schedule::default(), now()),
            (NewItem::flashcard("u", "c", "d"), Schedule::default(), now()),
        ];
        let stored = store.insert_items(&batch).unwrap();
        assert_eq!(stored.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_due_items_match_sql_order() {
        let store = MemoryStore::new();
        let dated = store
            .insert_item(
                &NewItem::flashcard("u", "a", "b"),
                &scheduled(Some(now() - Duration::days(2))),
                now(),
            )
            .unwrap();
        let unscheduled = store
            .insert_item(&NewItem::flashcard("u", "c", "d"), &scheduled(None), now())
            .unwrap();
        store
            .insert_item(
                &NewItem::note("u", "e", "f"),
                &scheduled(Some(now() + Duration::days(2))),
                now(),
            )
            .unwrap();

        let due: Vec<ItemId> = store
            .due_items("u", None, now())
            .unwrap()
            .iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(due, vec![unscheduled.id, dated.id]);
        assert!(store.due_items("u", Some(ItemKind::Note), now()).unwrap().is_empty());
    }

    #[test]
    fn test_stale_write_is_rejected() {
        let store = MemoryStore::new();
        let item = store
            .insert_item(&NewItem::note("u", "a", "b"), &Schedule::default(), now())
            .unwrap();

        assert_eq!(
            store.write_schedule(item.id, &Schedule::default(), Some(0)).unwrap(),
            WriteOutcome::Written { version: 1 }
        );
        assert_eq!(
            store.write_schedule(item.id, &Schedule::default(), Some(0)).unwrap(),
            WriteOutcome::Stale { current_version: 1 }
        );
        assert_eq!(
            store.write_schedule(99, &Schedule::default(), None).unwrap(),
            WriteOutcome::Missing
        );
    }
}
