//! Review configuration
//!
//! Loaded from a TOML file; every key is optional and falls back to the
//! defaults below.
//!
//! ```toml
//! database_path = "vocab_review.sqlite3"
//! flashcard_initial_due = "immediate"
//! note_initial_due = "next_day"
//! quality_policy = "reject"
//! optimistic_concurrency = false
//! log_filter = "vocab_review=info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{InitialDue, ItemKind, QualityPolicy};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// First due date of new flashcards
    pub flashcard_initial_due: InitialDue,

    /// First due date of new notes
    pub note_initial_due: InitialDue,

    /// Handling of ratings outside 0..=5
    pub quality_policy: QualityPolicy,

    /// Reject review writes that raced with another write to the same item.
    /// Off means last write wins.
    pub optimistic_concurrency: bool,

    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("vocab_review.sqlite3"),
            flashcard_initial_due: InitialDue::Immediate,
            note_initial_due: InitialDue::NextDay,
            quality_policy: QualityPolicy::Reject,
            optimistic_concurrency: false,
            log_filter: "vocab_review=info".to_string(),
        }
    }
}

impl ReviewConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ReviewConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "database_path must not be empty".to_string(),
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "log_filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn initial_due(&self, kind: ItemKind) -> InitialDue {
        match kind {
            ItemKind::Flashcard => self.flashcard_initial_due,
            ItemKind::Note => self.note_initial_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_item_kinds() {
        let config = ReviewConfig::default();
        assert_eq!(config.initial_due(ItemKind::Flashcard), InitialDue::Immediate);
        assert_eq!(config.initial_due(ItemKind::Note), InitialDue::NextDay);
        assert_eq!(config.quality_policy, QualityPolicy::Reject);
        assert!(!config.optimistic_concurrency);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ReviewConfig::from_toml(
            r#"
            note_initial_due = "immediate"
            quality_policy = "clamp"
            "#,
        )
        .unwrap();
        assert_eq!(config.note_initial_due, InitialDue::Immediate);
        assert_eq!(config.quality_policy, QualityPolicy::Clamp);
        assert_eq!(config.database_path, PathBuf::from("vocab_review.sqlite3"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ReviewConfig::from_toml("quality_policy = \"sometimes\""),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ReviewConfig::from_toml("database_path = \"\""),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.toml");
        let config = ReviewConfig {
            optimistic_concurrency: true,
            ..ReviewConfig::default()
        };
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        assert_eq!(ReviewConfig::from_file(&path).unwrap(), config);
        assert!(matches!(
            ReviewConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::IoError(_))
        ));
    }
}
