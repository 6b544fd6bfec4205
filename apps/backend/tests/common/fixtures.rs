//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use wordeasy_core::{Difficulty, WordEntry};

/// A word entry with classifier-assigned difficulty.
pub fn entry(text: &str, translation: &str) -> WordEntry {
    WordEntry {
        text: text.to_string(),
        translation: translation.to_string(),
        category: None,
        difficulty: None,
    }
}

/// A word entry with an explicit difficulty.
pub fn entry_with(text: &str, translation: &str, difficulty: Difficulty) -> WordEntry {
    WordEntry {
        difficulty: Some(difficulty),
        ..entry(text, translation)
    }
}

/// A small mixed-tier vocabulary.
pub fn sample_entries() -> Vec<WordEntry> {
    vec![
        entry("apple", "苹果"),
        entry("water", "水"),
        entry("bottle", "瓶子"),
        entry("strawberry", "草莓"),
        entry("nationalization", "国有化"),
    ]
}

/// Create a spell check request body.
pub fn spell_check_request(word_id: i64, input: &str) -> serde_json::Value {
    json!({ "word_id": word_id, "input": input })
}

/// Create a mark studied request body.
pub fn mark_studied_request(word_id: i64) -> serde_json::Value {
    json!({ "word_id": word_id })
}

/// Create a batch update request body.
pub fn batch_update_request(word_ids: &[i64]) -> serde_json::Value {
    json!({ "word_ids": word_ids })
}

/// Create a batch ingest request body.
pub fn batch_ingest_request(deck_id: i64, words: &[WordEntry]) -> serde_json::Value {
    json!({ "deck_id": deck_id, "words": words })
}
