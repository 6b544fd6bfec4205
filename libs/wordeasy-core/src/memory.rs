//! In-memory store.
//!
//! Writers take the write lock, so every mutation is serialized; readers
//! share the read lock.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::error::{StoreError, StoreResult};
use crate::store::{due_ordering, error_ordering, Catalog, ProgressStore};
use crate::types::{DeckId, Difficulty, NewWord, Progress, Word, WordId, WordProgress};

#[derive(Default)]
struct Inner {
    words: BTreeMap<WordId, Word>,
    progress: HashMap<WordId, Progress>,
    next_id: WordId,
}

impl Inner {
    fn joined(&self, rows: Vec<Progress>) -> Vec<WordProgress> {
        rows.into_iter()
            .filter_map(|progress| {
                self.words.get(&progress.word_id).map(|word| WordProgress {
                    word: word.clone(),
                    progress,
                })
            })
            .collect()
    }
}

/// Catalog and progress store kept in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Catalog for MemoryStore {
    fn get_word(&self, id: WordId) -> StoreResult<Option<Word>> {
        Ok(self.read().words.get(&id).cloned())
    }

    fn insert_words(&self, words: &[NewWord]) -> StoreResult<Vec<Word>> {
        let mut inner = self.write();
        let mut existing: HashSet<(String, DeckId)> = inner
            .words
            .values()
            .map(|w| (w.text.clone(), w.deck_id))
            .collect();

        let mut inserted = Vec::new();
        for word in words {
            if !existing.insert((word.text.clone(), word.deck_id)) {
                continue;
            }
            inner.next_id += 1;
            let stored = word.clone().with_id(inner.next_id);
            inner.words.insert(stored.id, stored.clone());
            inserted.push(stored);
        }
        Ok(inserted)
    }

    fn sample_words(&self, difficulty: Difficulty, limit: usize) -> StoreResult<Vec<Word>> {
        Ok(self
            .read()
            .words
            .values()
            .filter(|w| w.difficulty == difficulty)
            .take(limit)
            .cloned()
            .collect())
    }

    fn difficulty_counts(&self) -> StoreResult<BTreeMap<Difficulty, usize>> {
        let mut counts = BTreeMap::new();
        for word in self.read().words.values() {
            *counts.entry(word.difficulty).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn clear_words(&self) -> StoreResult<usize> {
        let mut inner = self.write();
        let removed = inner.words.len();
        inner.words.clear();
        inner.progress.clear();
        Ok(removed)
    }
}

impl ProgressStore for MemoryStore {
    fn get_progress(&self, word_id: WordId) -> StoreResult<Option<Progress>> {
        Ok(self.read().progress.get(&word_id).cloned())
    }

    fn insert_progress_if_absent(&self, progress: &Progress) -> StoreResult<Progress> {
        let mut inner = self.write();
        if !inner.words.contains_key(&progress.word_id) {
            return Err(StoreError::Backend(format!(
                "progress references unknown word {}",
                progress.word_id
            )));
        }
        Ok(inner
            .progress
            .entry(progress.word_id)
            .or_insert_with(|| progress.clone())
            .clone())
    }

    fn replace_progress(&self, expected: &Progress, next: &Progress) -> StoreResult<()> {
        let mut inner = self.write();
        match inner.progress.get_mut(&next.word_id) {
            Some(current) if current == expected => {
                *current = next.clone();
                Ok(())
            }
            _ => Err(StoreError::Conflict(next.word_id)),
        }
    }

    fn due_words(&self, as_of: NaiveDate, limit: usize) -> StoreResult<Vec<WordProgress>> {
        let inner = self.read();
        let mut rows: Vec<Progress> = inner
            .progress
            .values()
            .filter(|p| p.is_due(as_of))
            .cloned()
            .collect();
        rows.sort_by(due_ordering);
        rows.truncate(limit);
        Ok(inner.joined(rows))
    }

    fn error_words(&self, limit: usize) -> StoreResult<Vec<WordProgress>> {
        let inner = self.read();
        let mut rows: Vec<Progress> = inner
            .progress
            .values()
            .filter(|p| p.error_count > 0)
            .cloned()
            .collect();
        rows.sort_by(error_ordering);
        rows.truncate(limit);
        Ok(inner.joined(rows))
    }

    fn count_due(&self, as_of: NaiveDate) -> StoreResult<usize> {
        Ok(self
            .read()
            .progress
            .values()
            .filter(|p| p.is_due(as_of))
            .count())
    }

    fn all_progress(&self) -> StoreResult<Vec<Progress>> {
        let mut rows: Vec<Progress> = self.read().progress.values().cloned().collect();
        rows.sort_by_key(|p| p.word_id);
        Ok(rows)
    }

    fn clear_progress(&self) -> StoreResult<usize> {
        let mut inner = self.write();
        let removed = inner.progress.len();
        inner.progress.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MasteryLevel;

    fn new_word(text: &str, deck_id: DeckId) -> NewWord {
        NewWord {
            text: text.to_string(),
            translation: format!("{text}-translation"),
            difficulty: Difficulty::Basic,
            deck_id,
            category: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn insert_skips_duplicates_within_deck_only() {
        let store = MemoryStore::new();
        let first = store
            .insert_words(&[new_word("cat", 1), new_word("cat", 1), new_word("cat", 2)])
            .unwrap();
        assert_eq!(first.len(), 2);

        let second = store.insert_words(&[new_word("cat", 1)]).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn insert_progress_if_absent_keeps_first_row() {
        let store = MemoryStore::new();
        let word = store.insert_words(&[new_word("dog", 1)]).unwrap().remove(0);

        let first = Progress {
            word_id: word.id,
            mastery_level: MasteryLevel::Familiar,
            next_review: Some(day(3)),
            error_count: 0,
            review_count: 1,
            last_reviewed: Some(day(1)),
        };
        let second = Progress {
            mastery_level: MasteryLevel::Unfamiliar,
            ..first.clone()
        };

        assert_eq!(store.insert_progress_if_absent(&first).unwrap(), first);
        assert_eq!(store.insert_progress_if_absent(&second).unwrap(), first);
    }

    #[test]
    fn replace_with_stale_expectation_conflicts() {
        let store = MemoryStore::new();
        let word = store.insert_words(&[new_word("sun", 1)]).unwrap().remove(0);
        let stored = store
            .insert_progress_if_absent(&Progress {
                word_id: word.id,
                mastery_level: MasteryLevel::Unfamiliar,
                next_review: Some(day(1)),
                error_count: 0,
                review_count: 0,
                last_reviewed: None,
            })
            .unwrap();

        let updated = Progress {
            review_count: 1,
            ..stored.clone()
        };
        store.replace_progress(&stored, &updated).unwrap();

        let err = store.replace_progress(&stored, &updated).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(id) if id == word.id));
    }

    #[test]
    fn clearing_words_drops_progress() {
        let store = MemoryStore::new();
        let word = store.insert_words(&[new_word("sky", 1)]).unwrap().remove(0);
        store
            .insert_progress_if_absent(&Progress {
                word_id: word.id,
                mastery_level: MasteryLevel::Unfamiliar,
                next_review: Some(day(1)),
                error_count: 0,
                review_count: 0,
                last_reviewed: None,
            })
            .unwrap();

        assert_eq!(store.clear_words().unwrap(), 1);
        assert!(store.all_progress().unwrap().is_empty());
    }
}
