//! SQLite-backed item store
//!
//! Handles database opening and migrations, item CRUD, the due-set query,
//! and atomic SM-2 schedule updates.
//! Timestamps are stored as INTEGER milliseconds since the Unix epoch, so
//! ordering by column equals chronological ordering.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

use super::migrations::apply_migrations;
use super::store::{Result, ReviewStore, StorageError, WriteOutcome};
use crate::models::{ItemContent, ItemId, ItemKind, LearningItem, NewItem, Schedule};

const ITEM_COLUMNS: &str = "id, user_id, kind, term, detail, created_at, ease_factor, \
     interval_days, next_review_at, review_count, last_reviewed_at, version";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and brings the schema up to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening item database");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection, applying any pending migrations.
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Poisoned("sqlite connection"))
    }

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<RawItem> {
        Ok(RawItem {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            term: row.get(3)?,
            detail: row.get(4)?,
            created_at: row.get(5)?,
            ease_factor: row.get(6)?,
            interval_days: row.get(7)?,
            next_review_at: row.get(8)?,
            review_count: row.get(9)?,
            last_reviewed_at: row.get(10)?,
            version: row.get(11)?,
        })
    }

    fn insert_row(
        conn: &Connection,
        item: &NewItem,
        schedule: &Schedule,
        created_at: DateTime<Utc>,
    ) -> Result<LearningItem> {
        conn.execute(
            "INSERT INTO items (user_id, kind, term, detail, created_at, ease_factor,
                                interval_days, next_review_at, review_count, last_reviewed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                item.user_id,
                item.kind().as_str(),
                item.content.term(),
                item.content.detail(),
                to_millis(created_at),
                schedule.ease_factor,
                schedule.interval_days,
                schedule.next_review_at.map(to_millis),
                schedule.review_count,
                schedule.last_reviewed_at.map(to_millis),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, kind = %item.kind(), "inserted item");

        let sql = format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS);
        Self::query_items(conn, &sql, params![id])?
            .pop()
            .ok_or_else(|| StorageError::InvalidRecord {
                id,
                reason: "inserted row vanished".to_string(),
            })
    }

    fn query_items(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<LearningItem>> {
        let mut stmt = conn.prepare(sql)?;
        let raw = stmt
            .query_map(params, Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<RawItem>>>()?;
        raw.into_iter().map(RawItem::into_item).collect()
    }
}

/// Row as stored, before legacy defaults and timestamp decoding.
struct RawItem {
    id: ItemId,
    user_id: String,
    kind: String,
    term: String,
    detail: String,
    created_at: i64,
    ease_factor: Option<f64>,
    interval_days: Option<i32>,
    next_review_at: Option<i64>,
    review_count: Option<u32>,
    last_reviewed_at: Option<i64>,
    version: i64,
}

impl RawItem {
    fn into_item(self) -> Result<LearningItem> {
        let kind: ItemKind = self
            .kind
            .parse()
            .map_err(|reason| StorageError::InvalidRecord {
                id: self.id,
                reason,
            })?;

        if self.ease_factor.is_none() || self.interval_days.is_none() {
            warn!(id = self.id, "item has no stored schedule, using defaults");
        }

        Ok(LearningItem {
            id: self.id,
            user_id: self.user_id,
            content: ItemContent::from_parts(kind, self.term, self.detail),
            created_at: from_millis(self.created_at)?,
            schedule: Schedule::from_stored(
                self.ease_factor,
                self.interval_days,
                self.next_review_at.map(from_millis).transpose()?,
                self.review_count,
                self.last_reviewed_at.map(from_millis).transpose()?,
            ),
            version: u64::try_from(self.version).unwrap_or(0),
        })
    }
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(StorageError::InvalidTimestamp(millis))
}

impl ReviewStore for SqliteStore {
    fn insert_item(
        &self,
        item: &NewItem,
        schedule: &Schedule,
        created_at: DateTime<Utc>,
    ) -> Result<LearningItem> {
        let conn = self.lock()?;
        Self::insert_row(&conn, item, schedule, created_at)
    }

    fn insert_items(
        &self,
        items: &[(NewItem, Schedule, DateTime<Utc>)],
    ) -> Result<Vec<LearningItem>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let stored = items
            .iter()
            .map(|(item, schedule, created_at)| {
                Self::insert_row(&tx, item, schedule, *created_at)
            })
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;
        debug!(count = stored.len(), "inserted item batch");
        Ok(stored)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<LearningItem>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS);
        Ok(Self::query_items(&conn, &sql, params![id])?.pop())
    }

    fn list_items(&self, user_id: &str) -> Result<Vec<LearningItem>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM items WHERE user_id = ?1 ORDER BY id ASC",
            ITEM_COLUMNS
        );
        Self::query_items(&conn, &sql, params![user_id])
    }

    fn due_items(
        &self,
        user_id: &str,
        kind: Option<ItemKind>,
        now: DateTime<Utc>,
    ) -> Result<Vec<LearningItem>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM items
             WHERE user_id = ?1
               AND (?2 IS NULL OR kind = ?2)
               AND (next_review_at IS NULL OR next_review_at <= ?3)
             ORDER BY next_review_at IS NOT NULL, next_review_at ASC, id ASC",
            ITEM_COLUMNS
        );
        Self::query_items(
            &conn,
            &sql,
            params![user_id, kind.map(ItemKind::as_str), to_millis(now)],
        )
    }

    fn write_schedule(
        &self,
        id: ItemId,
        schedule: &Schedule,
        expected_version: Option<u64>,
    ) -> Result<WriteOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let expected = expected_version.map(|v| i64::try_from(v).unwrap_or(i64::MAX));
        let changed = tx.execute(
            "UPDATE items
             SET ease_factor = ?1, interval_days = ?2, next_review_at = ?3,
                 review_count = ?4, last_reviewed_at = ?5, version = version + 1
             WHERE id = ?6 AND (?7 IS NULL OR version = ?7)",
            params![
                schedule.ease_factor,
                schedule.interval_days,
                schedule.next_review_at.map(to_millis),
                schedule.review_count,
                schedule.last_reviewed_at.map(to_millis),
                id,
                expected,
            ],
        )?;

        let version: Option<i64> = tx
            .query_row("SELECT version FROM items WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        let outcome = match (changed, version) {
            (_, None) => WriteOutcome::Missing,
            (0, Some(current)) => WriteOutcome::Stale {
                current_version: u64::try_from(current).unwrap_or(0),
            },
            (_, Some(current)) => WriteOutcome::Written {
                version: u64::try_from(current).unwrap_or(0),
            },
        };

        if matches!(outcome, WriteOutcome::Written { .. }) {
            tx.commit()?;
        }
        Ok(outcome)
    }

    fn delete_item(&self, id: ItemId) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM items WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
