//! Due-set selection.
//!
//! An item is due when it has no next review date or the date is not in the future.
//! Due items are ordered most overdue first, with never-scheduled items ahead of all.

use chrono::{DateTime, Utc};

use super::item::LearningItem;
use super::schedule::Schedule;

pub trait Schedulable {
    fn next_review_at(&self) -> Option<DateTime<Utc>>;
}

impl Schedulable for Schedule {
    fn next_review_at(&self) -> Option<DateTime<Utc>> {
        self.next_review_at
    }
}

impl Schedulable for LearningItem {
    fn next_review_at(&self) -> Option<DateTime<Utc>> {
        self.schedule.next_review_at
    }
}

impl<T: Schedulable + ?Sized> Schedulable for &T {
    fn next_review_at(&self) -> Option<DateTime<Utc>> {
        (**self).next_review_at()
    }
}

pub fn is_due(next_review_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    next_review_at.is_none_or(|at| at <= now)
}

/// Keeps the due items and sorts them for a review session.
///
/// `Option`'s ordering puts `None` before every `Some`, which is exactly
/// "unscheduled first, then ascending date". The sort is stable, so equal
/// dates keep their input order.
pub fn select_due<T: Schedulable>(items: impl IntoIterator<Item = T>, now: DateTime<Utc>) -> Vec<T> {
    let mut due: Vec<T> = items
        .into_iter()
        .filter(|item| is_due(item.next_review_at(), now))
        .collect();
    due.sort_by_key(|item| item.next_review_at());
    due
}
