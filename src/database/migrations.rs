//! Schema migrations for the item database.
//!
//! The applied version is tracked in `PRAGMA user_version`. Version 1 is the
//! schema from before scheduling existed; rows written then have NULL
//! scheduling columns and are defaulted when read.

use rusqlite::Connection;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Items table",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "SM-2 scheduling columns",
        up: MIGRATION_V2_UP,
    },
    Migration {
        version: 3,
        description: "Row version and due index",
        up: MIGRATION_V3_UP,
    },
];

const MIGRATION_V1_UP: &str = "
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('flashcard', 'note')),
    term TEXT NOT NULL,
    detail TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
";

// Nullable on purpose: rows from v1 have no schedule yet
const MIGRATION_V2_UP: &str = "
ALTER TABLE items ADD COLUMN ease_factor REAL;
ALTER TABLE items ADD COLUMN interval_days INTEGER;
ALTER TABLE items ADD COLUMN next_review_at INTEGER;
ALTER TABLE items ADD COLUMN review_count INTEGER;
ALTER TABLE items ADD COLUMN last_reviewed_at INTEGER;
";

const MIGRATION_V3_UP: &str = "
ALTER TABLE items ADD COLUMN version INTEGER NOT NULL DEFAULT 0;
CREATE INDEX IF NOT EXISTS idx_items_user_due ON items (user_id, next_review_at);
";

pub fn current_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Applies every migration above the current version. Returns how many ran.
pub fn apply_migrations(conn: &mut Connection) -> rusqlite::Result<u32> {
    apply_migrations_up_to(conn, u32::MAX)
}

pub fn apply_migrations_up_to(conn: &mut Connection, target: u32) -> rusqlite::Result<u32> {
    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version <= current || migration.version > target {
            continue;
        }
        info!(
            "Applying migration v{}: {}",
            migration.version, migration.description
        );

        let tx = conn.transaction()?;
        tx.execute_batch(migration.up)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;

        applied += 1;
    }

    Ok(applied)
}
