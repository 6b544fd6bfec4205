//! API request and response types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use wordeasy_core::{
    CatalogStats, DeckId, DiffSegment, Difficulty, IngestReport, OperationStats, ProgressStats,
    WordEntry, WordId, WordProgress,
};

pub const DEFAULT_PRACTICE_LIMIT: usize = 10;
pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 500;

// === Word Types ===

/// Word joined with its learning state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordResponse {
    pub id: WordId,
    pub word: String,
    pub translation: String,
    pub difficulty: u8,
    pub category: Option<String>,
    pub deck_id: DeckId,
    pub mastery_level: u8,
    pub next_review: Option<NaiveDate>,
    pub error_count: u32,
    pub review_count: u32,
}

impl From<WordProgress> for WordResponse {
    fn from(wp: WordProgress) -> Self {
        let WordProgress { word, progress } = wp;
        Self {
            id: word.id,
            word: word.text,
            translation: word.translation,
            difficulty: word.difficulty.to_value(),
            category: word.category,
            deck_id: word.deck_id,
            mastery_level: progress.mastery_level.to_value(),
            next_review: progress.next_review,
            error_count: progress.error_count,
            review_count: progress.review_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordListResponse {
    pub words: Vec<WordResponse>,
    pub count: usize,
}

impl WordListResponse {
    pub fn new(rows: Vec<WordProgress>) -> Self {
        let words: Vec<WordResponse> = rows.into_iter().map(Into::into).collect();
        Self {
            count: words.len(),
            words,
        }
    }
}

/// GET /api/words query parameters
#[derive(Debug, Deserialize)]
pub struct PracticeQuery {
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default = "default_practice_limit")]
    pub limit: usize,
}

/// Query parameters for the ordered word lists
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

fn default_difficulty() -> u8 {
    1
}

fn default_practice_limit() -> usize {
    DEFAULT_PRACTICE_LIMIT
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

/// POST /api/words request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWordRequest {
    #[serde(default)]
    pub deck_id: DeckId,
    #[serde(flatten)]
    pub entry: WordEntry,
}

/// POST /api/words/batch request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchIngestRequest {
    #[serde(default)]
    pub deck_id: DeckId,
    pub words: Vec<WordEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub inserted: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub by_difficulty: std::collections::BTreeMap<u8, usize>,
    pub word_ids: Vec<WordId>,
}

impl From<IngestReport> for IngestResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            message: report.summary(),
            inserted: report.inserted.len(),
            skipped: report.skipped,
            invalid: report.invalid,
            word_ids: report.inserted.iter().map(|w| w.id).collect(),
            by_difficulty: report.by_difficulty,
        }
    }
}

// === Spelling Types ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCheckRequest {
    pub word_id: WordId,
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCheckResponse {
    pub is_correct: bool,
    pub correct_spelling: String,
    pub translation: String,
    pub similarity: f64,
    pub diff: Vec<DiffSegment>,
    pub mastery_level: u8,
    pub next_review: Option<NaiveDate>,
    pub error_count: u32,
    pub review_count: u32,
}

// === Progress Types ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkStudiedRequest {
    pub word_id: WordId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateRequest {
    pub word_ids: Vec<WordId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub word_id: WordId,
    pub mastery_level: u8,
    pub next_review: Option<NaiveDate>,
    pub error_count: u32,
    pub review_count: u32,
    pub last_reviewed: Option<NaiveDate>,
}

impl From<wordeasy_core::Progress> for ProgressResponse {
    fn from(p: wordeasy_core::Progress) -> Self {
        Self {
            word_id: p.word_id,
            mastery_level: p.mastery_level.to_value(),
            next_review: p.next_review,
            error_count: p.error_count,
            review_count: p.review_count,
            last_reviewed: p.last_reviewed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateResponse {
    pub requested: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub removed: usize,
}

// === Performance Types ===

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceResponse {
    pub operations: std::collections::BTreeMap<String, OperationStats>,
}
