//! Recall quality ratings and how out-of-range ratings are handled.
//!
//! 0 = complete blackout, 3 = correct with serious difficulty, 5 = perfect recall.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::sm2::PASSING_QUALITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quality rating {0} is outside 0..=5")]
pub struct InvalidQuality(pub i32);

/// A quality rating known to be in 0..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Result<Self, InvalidQuality> {
        if (0..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidQuality(value))
        }
    }

    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(0, Self::MAX) as u8)
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }

    pub fn is_pass(self) -> bool {
        self.value() >= PASSING_QUALITY
    }
}

impl TryFrom<i32> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for i32 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Treatment of ratings outside 0..=5 before they reach the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPolicy {
    /// Refuse the review
    #[default]
    Reject,
    /// Pull the rating into 0..=5
    Clamp,
    /// Pass the raw rating through to the formula
    Unchecked,
}

impl QualityPolicy {
    /// Returns the rating to hand to the scheduler.
    pub fn admit(self, raw: i32) -> Result<i32, InvalidQuality> {
        match self {
            Self::Reject => Quality::new(raw).map(Quality::value),
            Self::Clamp => Ok(Quality::clamped(raw).value()),
            Self::Unchecked => Ok(raw),
        }
    }
}
