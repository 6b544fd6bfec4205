//! Storage boundaries consumed by the scheduler and the statistics aggregator.
//!
//! Implementations must be safe to share between threads. Writes to a single
//! progress row go through [`ProgressStore::replace_progress`], a
//! compare-and-swap, so concurrent attempts on the same word cannot both
//! build on the same stale row.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::StoreResult;
use crate::types::{Difficulty, NewWord, Progress, Word, WordId, WordProgress};

/// Vocabulary catalog.
pub trait Catalog: Send + Sync {
    fn get_word(&self, id: WordId) -> StoreResult<Option<Word>>;

    /// Insert words that are not already present under the same `(text, deck_id)`.
    ///
    /// Returns only the rows actually inserted; duplicates, including
    /// duplicates within `words`, are skipped.
    fn insert_words(&self, words: &[NewWord]) -> StoreResult<Vec<Word>>;

    /// Up to `limit` words of one tier. Selection order is store-defined.
    fn sample_words(&self, difficulty: Difficulty, limit: usize) -> StoreResult<Vec<Word>>;

    /// Word count per tier. Tiers without words may be absent.
    fn difficulty_counts(&self) -> StoreResult<BTreeMap<Difficulty, usize>>;

    /// Remove every word, and with them their progress. Returns the number of words removed.
    fn clear_words(&self) -> StoreResult<usize>;
}

/// Per-word learning state.
pub trait ProgressStore: Send + Sync {
    fn get_progress(&self, word_id: WordId) -> StoreResult<Option<Progress>>;

    /// Insert `progress` unless a row for the word exists; return whichever row is stored.
    fn insert_progress_if_absent(&self, progress: &Progress) -> StoreResult<Progress>;

    /// Overwrite the row for `next.word_id` only if it still equals `expected`.
    ///
    /// Fails with [`StoreError::Conflict`](crate::StoreError::Conflict) otherwise.
    fn replace_progress(&self, expected: &Progress, next: &Progress) -> StoreResult<()>;

    /// Words with `next_review <= as_of`, in [`due_ordering`].
    fn due_words(&self, as_of: NaiveDate, limit: usize) -> StoreResult<Vec<WordProgress>>;

    /// Words with `error_count > 0`, in [`error_ordering`].
    fn error_words(&self, limit: usize) -> StoreResult<Vec<WordProgress>>;

    fn count_due(&self, as_of: NaiveDate) -> StoreResult<usize>;

    fn all_progress(&self) -> StoreResult<Vec<Progress>>;

    /// Delete every progress row. Returns the number removed.
    fn clear_progress(&self) -> StoreResult<usize>;
}

/// Review queue order: least mastered first, then most errors, then word id.
pub fn due_ordering(a: &Progress, b: &Progress) -> Ordering {
    a.mastery_level
        .cmp(&b.mastery_level)
        .then_with(|| b.error_count.cmp(&a.error_count))
        .then_with(|| a.word_id.cmp(&b.word_id))
}

/// Error book order: most errors first, then least mastered, then word id.
pub fn error_ordering(a: &Progress, b: &Progress) -> Ordering {
    b.error_count
        .cmp(&a.error_count)
        .then_with(|| a.mastery_level.cmp(&b.mastery_level))
        .then_with(|| a.word_id.cmp(&b.word_id))
}
