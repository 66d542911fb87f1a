pub mod due;
pub mod item;
pub mod quality;
pub mod schedule;
pub mod sm2;

pub use due::{Schedulable, is_due, select_due};
pub use item::{ItemContent, ItemId, ItemKind, LearningItem, NewItem};
pub use quality::{InvalidQuality, Quality, QualityPolicy};
pub use schedule::{InitialDue, Schedule};
pub use sm2::{NextReview, compute_next_review, compute_next_review_now};
