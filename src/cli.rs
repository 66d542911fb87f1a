use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vocab_review::ItemKind;

#[derive(Parser)]
#[command(
    name = "vocab-review",
    about = "Spaced-repetition review of captured words and phrases",
    version
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "VOCAB_REVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long, global = true, env = "VOCAB_REVIEW_DB")]
    pub db: Option<PathBuf>,

    /// Owner of the items
    #[arg(long, global = true, default_value = "local")]
    pub user: String,

    /// Pretend the current time is this RFC 3339 instant
    #[arg(long, global = true)]
    pub now: Option<DateTime<Utc>>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a flashcard (term + definition)
    AddCard { term: String, definition: String },

    /// Add a note (term + free text)
    AddNote { term: String, body: String },

    /// List items due for review
    Due {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Record a recall quality rating (0-5) for one item
    Review {
        id: i64,

        #[arg(allow_negative_numbers = true)]
        quality: i32,
    },

    /// Show the interval each rating would give an item
    Preview { id: i64 },

    /// Review every due item, reading ratings from stdin
    Session {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Export the user's items to a JSON file
    Export { path: PathBuf },

    /// Import items from a JSON export
    Import { path: PathBuf },

    /// Delete one item
    Delete { id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Flashcard,
    Note,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Flashcard => ItemKind::Flashcard,
            KindArg::Note => ItemKind::Note,
        }
    }
}
