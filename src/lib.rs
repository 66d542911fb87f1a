pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod review;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ReviewConfig};
pub use database::{MemoryStore, ReviewStore, SqliteStore, StorageError};
pub use error::ReviewError;
pub use models::{
    InitialDue, ItemContent, ItemId, ItemKind, LearningItem, NewItem, NextReview, Quality,
    QualityPolicy, Schedule, compute_next_review, compute_next_review_now,
};
pub use review::{ReviewService, ReviewSession};
