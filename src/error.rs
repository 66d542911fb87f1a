//! Errors surfaced by review operations.

use crate::database::StorageError;
use crate::models::{InvalidQuality, ItemId};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    InvalidQuality(#[from] InvalidQuality),

    #[error("Item {id} was modified concurrently (expected version {expected}, found {found})")]
    Conflict { id: ItemId, expected: u64, found: u64 },
}

impl ReviewError {
    /// Whether resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
