//! Bulk ingestion of already-parsed vocabulary entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::error::StoreResult;
use crate::store::Catalog;
use crate::types::{DeckId, Difficulty, NewWord, Word};

pub const MAX_TEXT_LEN: usize = 50;
pub const MAX_TRANSLATION_LEN: usize = 200;

/// One entry to ingest. Difficulty is classified when not given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordEntry {
    pub text: String,
    pub translation: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub inserted: Vec<Word>,
    /// Entries already present in the deck or repeated within the batch.
    pub skipped: usize,
    /// Entries rejected by validation.
    pub invalid: usize,
    /// Inserted words per tier, keyed by tier number.
    pub by_difficulty: BTreeMap<u8, usize>,
}

impl IngestReport {
    pub fn summary(&self) -> String {
        let tier = |d: u8| self.by_difficulty.get(&d).copied().unwrap_or(0);
        let mut message = format!(
            "Imported {} words (basic: {}, intermediate: {}, advanced: {})",
            self.inserted.len(),
            tier(1),
            tier(2),
            tier(3)
        );
        if self.skipped > 0 {
            message.push_str(&format!(", skipped {} duplicates", self.skipped));
        }
        if self.invalid > 0 {
            message.push_str(&format!(", ignored {} invalid entries", self.invalid));
        }
        message
    }
}

/// Normalize and validate one entry.
pub fn prepare(entry: &WordEntry, deck_id: DeckId) -> Option<NewWord> {
    let text = entry.text.trim().to_lowercase();
    let translation = entry.translation.trim().to_string();

    if text.is_empty() || translation.is_empty() {
        return None;
    }
    if text.chars().count() > MAX_TEXT_LEN || translation.chars().count() > MAX_TRANSLATION_LEN {
        return None;
    }

    Some(NewWord {
        difficulty: entry.difficulty.unwrap_or_else(|| classify(&text)),
        text,
        translation,
        deck_id,
        category: entry
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    })
}

/// Validate, classify and insert entries into one deck.
pub fn ingest<C>(catalog: &C, deck_id: DeckId, entries: &[WordEntry]) -> StoreResult<IngestReport>
where
    C: Catalog + ?Sized,
{
    let prepared: Vec<NewWord> = entries.iter().filter_map(|e| prepare(e, deck_id)).collect();
    let invalid = entries.len() - prepared.len();

    let inserted = catalog.insert_words(&prepared)?;

    let mut by_difficulty: BTreeMap<u8, usize> =
        Difficulty::ALL.iter().map(|d| (d.to_value(), 0)).collect();
    for word in &inserted {
        *by_difficulty.entry(word.difficulty.to_value()).or_insert(0) += 1;
    }

    let report = IngestReport {
        skipped: prepared.len() - inserted.len(),
        invalid,
        by_difficulty,
        inserted,
    };
    tracing::info!(
        deck_id,
        inserted = report.inserted.len(),
        skipped = report.skipped,
        invalid = report.invalid,
        "Ingested words"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    fn entry(text: &str, translation: &str) -> WordEntry {
        WordEntry {
            text: text.to_string(),
            translation: translation.to_string(),
            category: None,
            difficulty: None,
        }
    }

    #[test]
    fn prepare_normalizes_and_classifies() {
        let word = prepare(&entry("  Bottle ", " 瓶子 "), 1).unwrap();
        assert_eq!(word.text, "bottle");
        assert_eq!(word.translation, "瓶子");
        assert_eq!(word.difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn prepare_keeps_explicit_difficulty() {
        let mut e = entry("cat", "猫");
        e.difficulty = Some(Difficulty::Advanced);
        assert_eq!(prepare(&e, 1).unwrap().difficulty, Difficulty::Advanced);
    }

    #[test]
    fn prepare_rejects_invalid_entries() {
        assert!(prepare(&entry("", "x"), 1).is_none());
        assert!(prepare(&entry("word", "   "), 1).is_none());
        assert!(prepare(&entry(&"a".repeat(51), "x"), 1).is_none());
        assert!(prepare(&entry("word", &"x".repeat(201)), 1).is_none());
    }

    #[test]
    fn ingest_dedupes_by_text_and_deck() {
        let store = MemoryStore::new();
        ingest(&store, 1, &[entry("apple", "苹果")]).unwrap();

        let report = ingest(
            &store,
            1,
            &[
                entry("Apple", "苹果"),
                entry("pear", "梨"),
                entry("pear", "梨"),
                entry("", "空"),
                entry("nationalization", "国有化"),
            ],
        )
        .unwrap();

        assert_eq!(report.inserted.len(), 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.by_difficulty[&1], 1);
        assert_eq!(report.by_difficulty[&2], 0);
        assert_eq!(report.by_difficulty[&3], 1);

        let other_deck = ingest(&store, 2, &[entry("apple", "苹果")]).unwrap();
        assert_eq!(other_deck.inserted.len(), 1);
    }

    #[test]
    fn summary_mentions_skips_and_invalid() {
        let report = IngestReport {
            inserted: Vec::new(),
            skipped: 2,
            invalid: 1,
            by_difficulty: BTreeMap::new(),
        };
        assert_eq!(
            report.summary(),
            "Imported 0 words (basic: 0, intermediate: 0, advanced: 0), skipped 2 duplicates, ignored 1 invalid entries"
        );
    }
}
