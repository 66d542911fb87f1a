//! Learning items: captured words or phrases that get reviewed.
//!
//! A flashcard is a pair <term, definition>. A note is a term with a free-form body.
//! The scheduler never looks at the content; only [`Schedule`] matters to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::schedule::Schedule;

pub type ItemId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Flashcard,
    Note,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flashcard => "flashcard",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flashcard" => Ok(Self::Flashcard),
            "note" => Ok(Self::Note),
            other => Err(format!("unknown item kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemContent {
    Flashcard { term: String, definition: String },
    Note { term: String, body: String },
}

impl ItemContent {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Flashcard { .. } => ItemKind::Flashcard,
            Self::Note { .. } => ItemKind::Note,
        }
    }

    pub fn term(&self) -> &str {
        match self {
            Self::Flashcard { term, .. } | Self::Note { term, .. } => term,
        }
    }

    /// Definition of a flashcard or body of a note.
    pub fn detail(&self) -> &str {
        match self {
            Self::Flashcard { definition, .. } => definition,
            Self::Note { body, .. } => body,
        }
    }

    pub fn from_parts(kind: ItemKind, term: String, detail: String) -> Self {
        match kind {
            ItemKind::Flashcard => Self::Flashcard {
                term,
                definition: detail,
            },
            ItemKind::Note => Self::Note { term, body: detail },
        }
    }
}

/// An item that is not stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub user_id: String,
    pub content: ItemContent,
}

impl NewItem {
    pub fn flashcard(user_id: &str, term: &str, definition: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            content: ItemContent::Flashcard {
                term: term.to_string(),
                definition: definition.to_string(),
            },
        }
    }

    pub fn note(user_id: &str, term: &str, body: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            content: ItemContent::Note {
                term: term.to_string(),
                body: body.to_string(),
            },
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }
}

/// A stored, schedulable item owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningItem {
    pub id: ItemId,
    pub user_id: String,
    pub content: ItemContent,
    pub created_at: DateTime<Utc>,
    pub schedule: Schedule,
    /// Bumped on every schedule write
    #[serde(default)]
    pub version: u64,
}

impl LearningItem {
    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }
}
