//! Progress scheduling.
//!
//! Every mutation is an optimistic read-modify-write: read the row (creating
//! it if absent), compute the next row, and compare-and-swap it into the
//! store. A lost race is retried a bounded number of times.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::algorithm::FixedIntervals;
use crate::error::{Result, ScheduleError, StoreError};
use crate::ingest::MAX_TEXT_LEN;
use crate::matching::{compare_spelling, SpellingMatch};
use crate::store::{Catalog, ProgressStore};
use crate::types::{Attempt, Difficulty, Progress, Word, WordId, WordProgress};

/// Retries after a write conflict before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Longest spelling input accepted, in characters after trimming.
pub const MAX_SPELLING_LEN: usize = 2 * MAX_TEXT_LEN;

/// Outcome of a spelling check.
#[derive(Debug, Clone)]
pub struct SpellCheck {
    pub word: Word,
    pub matched: SpellingMatch,
    pub progress: Progress,
}

pub struct Scheduler<S> {
    store: Arc<S>,
    intervals: FixedIntervals,
    max_retries: u32,
}

impl<S> Scheduler<S>
where
    S: Catalog + ProgressStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            intervals: FixedIntervals::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_intervals(mut self, intervals: FixedIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn intervals(&self) -> &FixedIntervals {
        &self.intervals
    }

    /// Existing progress for a word, or a fresh level-0 row due today.
    ///
    /// Safe under concurrent first access: the store keeps the first row written.
    pub fn get_or_create_progress(&self, word_id: WordId, today: NaiveDate) -> Result<Progress> {
        self.require_word(word_id)?;
        self.load_or_insert(word_id, today)
    }

    /// Record a correct or incorrect attempt.
    pub fn record_attempt(&self, word_id: WordId, correct: bool, today: NaiveDate) -> Result<Progress> {
        self.require_word(word_id)?;
        let attempt = Attempt::from(correct);
        let progress =
            self.update_with_retry(word_id, today, |p| self.intervals.schedule(p, attempt, today))?;

        tracing::debug!(
            word_id,
            ?attempt,
            mastery_level = progress.mastery_level.to_value(),
            next_review = ?progress.next_review,
            "Recorded attempt"
        );
        Ok(progress)
    }

    /// Check a typed spelling and record the outcome.
    ///
    /// Empty or overlong input is rejected before any progress is touched.
    pub fn submit_spelling(&self, word_id: WordId, input: &str, today: NaiveDate) -> Result<SpellCheck> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ScheduleError::Validation("spelling input is empty".to_string()));
        }
        if trimmed.chars().nth(MAX_SPELLING_LEN).is_some() {
            return Err(ScheduleError::Validation(format!(
                "spelling input longer than {MAX_SPELLING_LEN} characters"
            )));
        }

        let word = self.require_word(word_id)?;
        let matched = compare_spelling(input, &word.text);
        let attempt = Attempt::from(matched.is_correct);
        let progress =
            self.update_with_retry(word_id, today, |p| self.intervals.schedule(p, attempt, today))?;

        Ok(SpellCheck {
            word,
            matched,
            progress,
        })
    }

    /// Seen but not tested: review tomorrow, counters and level untouched.
    pub fn mark_studied(&self, word_id: WordId, today: NaiveDate) -> Result<Progress> {
        self.require_word(word_id)?;
        self.update_with_retry(word_id, today, |p| self.intervals.mark_studied(p, today))
    }

    /// Mark several words studied, skipping ids that are not in the catalog.
    pub fn mark_studied_batch(&self, word_ids: &[WordId], today: NaiveDate) -> Result<usize> {
        let mut updated = 0;
        for &word_id in word_ids {
            match self.mark_studied(word_id, today) {
                Ok(_) => updated += 1,
                Err(ScheduleError::NotFound(_)) => {
                    tracing::debug!(word_id, "Skipping unknown word in batch");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(updated)
    }

    /// Words due on `as_of`, least mastered and most error-prone first.
    pub fn due_words(&self, as_of: NaiveDate, limit: usize) -> Result<Vec<WordProgress>> {
        Ok(self.store.due_words(as_of, limit)?)
    }

    /// Words answered wrong at least once, most errors first.
    pub fn error_words(&self, limit: usize) -> Result<Vec<WordProgress>> {
        Ok(self.store.error_words(limit)?)
    }

    pub fn count_due(&self, as_of: NaiveDate) -> Result<usize> {
        Ok(self.store.count_due(as_of)?)
    }

    /// Words of one tier for a practice round, each with its progress.
    pub fn practice_words(
        &self,
        difficulty: Difficulty,
        limit: usize,
        today: NaiveDate,
    ) -> Result<Vec<WordProgress>> {
        self.store
            .sample_words(difficulty, limit)?
            .into_iter()
            .map(|word| {
                let progress = self.load_or_insert(word.id, today)?;
                Ok(WordProgress { word, progress })
            })
            .collect()
    }

    /// Forget all learning state. Returns the number of rows removed.
    pub fn clear_progress(&self) -> Result<usize> {
        let removed = self.store.clear_progress()?;
        tracing::info!(removed, "Cleared progress");
        Ok(removed)
    }

    fn require_word(&self, word_id: WordId) -> Result<Word> {
        self.store
            .get_word(word_id)?
            .ok_or(ScheduleError::NotFound(word_id))
    }

    fn load_or_insert(&self, word_id: WordId, today: NaiveDate) -> Result<Progress> {
        if let Some(progress) = self.store.get_progress(word_id)? {
            return Ok(progress);
        }
        let initial = self.intervals.initial_progress(word_id, today);
        Ok(self.store.insert_progress_if_absent(&initial)?)
    }

    fn update_with_retry<F>(&self, word_id: WordId, today: NaiveDate, transition: F) -> Result<Progress>
    where
        F: Fn(&Progress) -> Progress,
    {
        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            let current = self.load_or_insert(word_id, today)?;
            let next = transition(&current);
            match self.store.replace_progress(&current, &next) {
                Ok(()) => return Ok(next),
                Err(StoreError::Conflict(_)) => {
                    tracing::warn!(word_id, attempt, "Progress write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ScheduleError::Conflict { word_id, attempts })
    }
}
