//! Fixed-interval spaced repetition.
//!
//! Every mastery level maps to a fixed review interval. A correct answer
//! promotes the word and schedules it by the level it lands on; an incorrect
//! answer demotes it and queues it again for the same day.

use chrono::{Duration, NaiveDate};

use crate::types::{Attempt, MasteryLevel, Progress, WordId};

/// Interval table, in days, keyed by mastery level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIntervals {
    pub unfamiliar_days: i64,
    pub familiar_days: i64,
    pub mastered_days: i64,
    /// Delay applied when a word is only studied, not tested.
    pub studied_days: i64,
}

impl Default for FixedIntervals {
    fn default() -> Self {
        Self {
            unfamiliar_days: 1,
            familiar_days: 3,
            mastered_days: 15,
            studied_days: 1,
        }
    }
}

impl FixedIntervals {
    /// Review interval for a mastery level.
    pub fn interval_for(&self, level: MasteryLevel) -> Duration {
        let days = match level {
            MasteryLevel::Unfamiliar => self.unfamiliar_days,
            MasteryLevel::Familiar => self.familiar_days,
            MasteryLevel::Mastered => self.mastered_days,
        };
        Duration::days(days)
    }

    /// Progress for a word that has never been seen: level 0, due today.
    pub fn initial_progress(&self, word_id: WordId, today: NaiveDate) -> Progress {
        Progress {
            word_id,
            mastery_level: MasteryLevel::Unfamiliar,
            next_review: Some(today),
            error_count: 0,
            review_count: 0,
            last_reviewed: None,
        }
    }

    /// Apply a spelling attempt.
    pub fn schedule(&self, progress: &Progress, attempt: Attempt, today: NaiveDate) -> Progress {
        let mut next = progress.clone();
        next.review_count += 1;
        next.last_reviewed = Some(today);

        match attempt {
            Attempt::Correct => {
                next.mastery_level = progress.mastery_level.promote();
                // Keyed by the level after promotion.
                next.next_review = Some(today + self.interval_for(next.mastery_level));
            }
            Attempt::Incorrect => {
                next.error_count += 1;
                next.mastery_level = progress.mastery_level.demote();
                next.next_review = Some(today);
            }
        }

        next
    }

    /// Seen but not tested: push the review out without touching counters or level.
    pub fn mark_studied(&self, progress: &Progress, today: NaiveDate) -> Progress {
        Progress {
            next_review: Some(today + Duration::days(self.studied_days)),
            ..progress.clone()
        }
    }
}
