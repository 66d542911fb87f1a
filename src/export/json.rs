//! JSON import/export of a user's learning items.
//! Schedules travel with the items, so an import resumes reviews where the export left off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::database::{ReviewStore, StorageError};
use crate::models::{LearningItem, NewItem};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemExport {
    pub user_id: String,
    pub exported_at: DateTime<Utc>,
    pub items: Vec<LearningItem>,
}

/// Writes every item of `user_id` to a pretty-printed JSON file.
/// Returns the number of items written.
pub fn export_json_to_path<S: ReviewStore>(
    store: &S,
    user_id: &str,
    path: &Path,
    exported_at: DateTime<Utc>,
) -> Result<usize, ExportError> {
    let export = ItemExport {
        user_id: user_id.to_string(),
        exported_at,
        items: store.list_items(user_id)?,
    };
    let json_string = serde_json::to_string_pretty(&export)?;
    fs::write(path, json_string)?;

    info!(user = user_id, count = export.items.len(), path = %path.display(), "items exported");
    Ok(export.items.len())
}

/// Reads an export file and stores its items under the exported user.
///
/// Items get fresh ids; content, creation time and schedule are kept, with the
/// schedule pulled back inside its invariants. The whole file is stored in one
/// batch, so a failed import leaves the store as it was.
pub fn import_json<S: ReviewStore>(store: &S, path: &Path) -> Result<Vec<LearningItem>, ExportError> {
    let contents = fs::read_to_string(path)?;
    let export: ItemExport = serde_json::from_str(&contents)?;

    let batch: Vec<_> = export
        .items
        .into_iter()
        .map(|item| {
            let new_item = NewItem {
                user_id: export.user_id.clone(),
                content: item.content,
            };
            (new_item, item.schedule.normalized(), item.created_at)
        })
        .collect();
    let imported = store.insert_items(&batch)?;

    info!(user = %export.user_id, count = imported.len(), path = %path.display(), "items imported");
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, SqliteStore};
    use crate::models::{ItemContent, Schedule};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 15, 12, 0, 0).unwrap()
    }

    fn create_test_store() -> MemoryStore {
        let store = MemoryStore::new();
        let reviewed = Schedule {
            ease_factor: 2.36,
            interval_days: 24,
            next_review_at: Some(now() + Duration::days(24)),
            review_count: 3,
            last_reviewed_at: Some(now()),
        };
        store
            .insert_item(&NewItem::flashcard("anna", "hello", "cześć"), &reviewed, now())
            .unwrap();
        store
            .insert_item(
                &NewItem::note("anna", "goodbye", "do widzenia"),
                &Schedule::default(),
                now(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_export_then_import_keeps_schedules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anna.json");
        let source = create_test_store();

        assert_eq!(export_json_to_path(&source, "anna", &path, now()).unwrap(), 2);

        let target = SqliteStore::open_in_memory().unwrap();
        let imported = import_json(&target, &path).unwrap();
        let original = source.list_items("anna").unwrap();

        assert_eq!(imported.len(), 2);
        for (orig, imp) in original.iter().zip(imported.iter()) {
            assert_eq!(orig.content, imp.content);
            assert_eq!(orig.schedule, imp.schedule);
            assert_eq!(orig.created_at, imp.created_at);
        }
    }

    #[test]
    fn test_import_normalizes_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let json_content = r#"{
  "user_id": "anna",
  "exported_at": "2024-08-15T12:00:00Z",
  "items": [
    {
      "id": 17,
      "user_id": "someone-else",
      "content": { "kind": "flashcard", "term": "test term", "definition": "test definition" },
      "created_at": "2024-08-01T00:00:00Z",
      "schedule": {
        "ease_factor": 0.9,
        "interval_days": 0,
        "next_review_at": null,
        "review_count": 2,
        "last_reviewed_at": null
      }
    }
  ]
}"#;
        fs::write(&path, json_content).unwrap();

        let store = MemoryStore::new();
        let imported = import_json(&store, &path).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].user_id, "anna");
        assert_eq!(
            imported[0].content,
            ItemContent::Flashcard {
                term: "test term".to_string(),
                definition: "test definition".to_string(),
            }
        );
        assert_eq!(imported[0].schedule.ease_factor, 1.3);
        assert_eq!(imported[0].schedule.interval_days, 1);
        assert_eq!(imported[0].schedule.review_count, 2);
    }

    #[test]
    fn test_failed_import_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("items.sqlite3");
        let path = dir.path().join("anna.json");
        let source = create_test_store();
        export_json_to_path(&source, "anna", &path, now()).unwrap();

        let target = SqliteStore::open(&db_path).unwrap();
        // Make the second insert of the batch fail
        rusqlite::Connection::open(&db_path)
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_goodbye BEFORE INSERT ON items
                 WHEN NEW.term = 'goodbye'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = import_json(&target, &path);
        assert!(matches!(result, Err(ExportError::Storage(_))));
        assert!(target.list_items("anna").unwrap().is_empty());
    }

    #[test]
    fn test_import_nonexistent_file() {
        let store = MemoryStore::new();
        let result = import_json(&store, Path::new("nonexistent_file_xyz123.json"));
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let store = MemoryStore::new();
        assert!(matches!(import_json(&store, &path), Err(ExportError::Json(_))));
        assert!(store.is_empty());
    }
}
