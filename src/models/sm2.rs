//! SM-2 (SuperMemo 2) spaced repetition scheduler.
//!
//! Simplified variant shared by every schedulable item (flashcards and notes):
//! - The ease factor (EF) is adjusted after every review and never falls below 1.3
//! - Quality grades 0-2: the interval resets to one day
//! - Quality grades 3-5 on an item whose interval is 1: fixed jump to 6 days
//! - Quality grades 3-5 otherwise: the interval is multiplied by the updated EF
//!
//! The scheduler has no state and performs no I/O. Callers persist the result.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Ease factor floor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor of a freshly created item
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval (days) of a freshly created item, and the interval after a failed recall
pub const DEFAULT_INTERVAL_DAYS: i32 = 1;

/// Interval after the first successful review
pub const BOOTSTRAP_INTERVAL_DAYS: i32 = 6;

/// Lowest quality that counts as a successful recall
pub const PASSING_QUALITY: i32 = 3;

/// Output of one scheduling step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextReview {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub next_review_date: DateTime<Utc>,
}

/// Ease factor given by the SM-2 adjustment formula, before the floor is applied.
///
/// `EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`
pub fn raw_ease_factor(ease_factor: f64, quality: i32) -> f64 {
    let miss = 5.0 - f64::from(quality);
    ease_factor + (0.1 - miss * (0.08 + miss * 0.02))
}

/// Calculates the next schedule for an item.
///
/// `quality` is not range-checked here: values outside 0-5 flow through the
/// formula unchanged. Validation belongs to the review boundary
/// (see [`QualityPolicy`](super::quality::QualityPolicy)).
pub fn compute_next_review(
    ease_factor: f64,
    interval_days: i32,
    quality: i32,
    now: DateTime<Utc>,
) -> NextReview {
    let mut new_ease = raw_ease_factor(ease_factor, quality);
    // Written negated so NaN lands on the floor too
    if !(new_ease >= MIN_EASE_FACTOR) {
        new_ease = MIN_EASE_FACTOR;
    }

    let new_interval = if quality < PASSING_QUALITY {
        DEFAULT_INTERVAL_DAYS
    } else if interval_days == 1 {
        BOOTSTRAP_INTERVAL_DAYS
    } else {
        grow_interval(interval_days, new_ease)
    };

    debug!(
        ease_factor,
        interval_days, quality, new_ease, new_interval, "computed next review"
    );

    NextReview {
        ease_factor: new_ease,
        interval_days: new_interval,
        next_review_date: due_after(now, new_interval),
    }
}

/// [`compute_next_review`] against the system clock.
pub fn compute_next_review_now(ease_factor: f64, interval_days: i32, quality: i32) -> NextReview {
    compute_next_review(ease_factor, interval_days, quality, Utc::now())
}

fn grow_interval(interval_days: i32, ease_factor: f64) -> i32 {
    let grown = (f64::from(interval_days) * ease_factor).round();
    // `as` saturates at the i32 bounds
    (grown as i32).max(1)
}

/// `now` plus whole days, saturating at the latest representable instant.
pub fn due_after(now: DateTime<Utc>, days: i32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Interval each quality rating 0-5 would produce, indexed by rating.
/// Used to show the outcome of every button before the user picks one.
pub fn preview_intervals(ease_factor: f64, interval_days: i32) -> [i32; 6] {
    let now = Utc::now();
    std::array::from_fn(|quality| {
        compute_next_review(ease_factor, interval_days, quality as i32, now).interval_days
    })
}

/// Format an interval in days as a compact label.
pub fn format_interval(days: i32) -> String {
    match days {
        i32::MIN..=0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
