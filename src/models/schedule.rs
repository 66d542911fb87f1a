//! Scheduling state carried by every learning item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::due;
use super::sm2::{
    self, DEFAULT_EASE_FACTOR, DEFAULT_INTERVAL_DAYS, MIN_EASE_FACTOR, NextReview,
};

/// When a newly created item becomes due for the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialDue {
    /// No due date; due at once
    #[default]
    Immediate,
    /// Due one day after creation
    NextDay,
}

impl InitialDue {
    pub fn first_review_at(self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Immediate => None,
            Self::NextDay => Some(sm2::due_after(created_at, 1)),
        }
    }
}

/// SM-2 fields of a schedulable item.
///
/// `next_review_at == None` means the item was never scheduled and counts as due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub next_review_at: Option<DateTime<Utc>>,
    pub review_count: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: DEFAULT_INTERVAL_DAYS,
            next_review_at: None,
            review_count: 0,
            last_reviewed_at: None,
        }
    }
}

impl Schedule {
    pub fn new(initial_due: InitialDue, created_at: DateTime<Utc>) -> Self {
        Self {
            next_review_at: initial_due.first_review_at(created_at),
            ..Self::default()
        }
    }

    /// Rebuilds a schedule from persisted columns, some of which may be missing
    /// on records written before scheduling existed.
    pub fn from_stored(
        ease_factor: Option<f64>,
        interval_days: Option<i32>,
        next_review_at: Option<DateTime<Utc>>,
        review_count: Option<u32>,
        last_reviewed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            ease_factor: ease_factor.unwrap_or(DEFAULT_EASE_FACTOR),
            interval_days: interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS),
            next_review_at,
            review_count: review_count.unwrap_or(0),
            last_reviewed_at,
        }
    }

    /// Pulls ease and interval back inside their invariants.
    pub fn normalized(mut self) -> Self {
        if !(self.ease_factor >= MIN_EASE_FACTOR) {
            self.ease_factor = MIN_EASE_FACTOR;
        }
        self.interval_days = self.interval_days.max(1);
        self
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        due::is_due(self.next_review_at, now)
    }

    pub fn next_review(&self, quality: i32, now: DateTime<Utc>) -> NextReview {
        sm2::compute_next_review(self.ease_factor, self.interval_days, quality, now)
    }

    /// Records a review: takes the scheduler output and bumps the counters.
    pub fn apply(&mut self, next: &NextReview, reviewed_at: DateTime<Utc>) {
        self.ease_factor = next.ease_factor;
        self.interval_days = next.interval_days;
        self.next_review_at = Some(next.next_review_date);
        self.review_count = self.review_count.saturating_add(1);
        self.last_reviewed_at = Some(reviewed_at);
    }
}
