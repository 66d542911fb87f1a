//! Review session over the due set.
//! Items rated below 3 come back in later rounds until every item has passed once.

use crate::database::ReviewStore;
use crate::error::Result;
use crate::models::{ItemKind, LearningItem, Quality};

use super::service::ReviewService;

struct SessionItem {
    item: LearningItem,
    passed: bool,
}

/// Manages a review session with multiple rounds.
/// Every grade is persisted immediately through [`ReviewService::record_review`].
pub struct ReviewSession {
    user_id: String,
    items: Vec<SessionItem>,
    current_round: Vec<usize>,
    current_index: usize,
    round_number: usize,
}

impl ReviewSession {
    /// Starts a session from the items currently due for a user.
    pub fn start<S: ReviewStore>(
        service: &ReviewService<S>,
        user_id: &str,
        kind: Option<ItemKind>,
    ) -> Result<Self> {
        let due = service.due_items(user_id, kind)?;
        Ok(Self::from_items(user_id, due))
    }

    pub fn from_items(user_id: &str, items: Vec<LearningItem>) -> Self {
        let items: Vec<SessionItem> = items
            .into_iter()
            .map(|item| SessionItem {
                item,
                passed: false,
            })
            .collect();
        let current_round = (0..items.len()).collect();

        Self {
            user_id: user_id.to_string(),
            items,
            current_round,
            current_index: 0,
            round_number: 1,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn current(&self) -> Option<&LearningItem> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.items.get(idx))
            .map(|entry| &entry.item)
    }

    /// Records a rating for the current item and moves to the next one.
    /// Does nothing once the session is complete.
    pub fn grade_current<S: ReviewStore>(
        &mut self,
        service: &ReviewService<S>,
        quality: Quality,
    ) -> Result<()> {
        let Some(&idx) = self.current_round.get(self.current_index) else {
            return Ok(());
        };
        let Some(entry) = self.items.get_mut(idx) else {
            return Ok(());
        };

        entry.item = service.record_review(entry.item.id, quality.value())?;
        entry.passed = quality.is_pass();

        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the items that were not passed.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.items.get(idx).is_some_and(|entry| !entry.passed))
            .collect();

        if failed.is_empty() {
            self.current_index = self.current_round.len();
            return;
        }

        self.current_round = failed;
        self.current_index = 0;
        self.round_number += 1;
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    pub fn passed_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.items.get(idx).is_some_and(|entry| entry.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    /// Items reviewed in this session, with their latest schedules.
    pub fn items(&self) -> impl Iterator<Item = &LearningItem> {
        self.items.iter().map(|entry| &entry.item)
    }

    pub fn is_completed(&self) -> bool {
        self.current_round.is_empty() || self.passed_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} items", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} items to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
