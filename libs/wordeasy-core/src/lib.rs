//! Core vocabulary library used by the backend.
//!
//! Provides:
//! - Fixed-interval spaced repetition (three mastery levels)
//! - Scheduler with optimistic, retried progress updates
//! - Rule-based difficulty classification
//! - Spelling comparison (Levenshtein, character diff)
//! - Storage traits with an in-memory implementation
//! - Statistics, bulk ingestion, TTL cache and call timing

pub mod algorithm;
pub mod cache;
pub mod classifier;
pub mod error;
pub mod ingest;
pub mod matching;
pub mod memory;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod timing;
pub mod types;

pub use algorithm::FixedIntervals;
pub use cache::TtlCache;
pub use classifier::{classify, classify_batch};
pub use error::{Result, ScheduleError, StoreError, StoreResult};
pub use ingest::{ingest, IngestReport, WordEntry};
pub use matching::{
    char_diff, compare_spelling, levenshtein_distance, normalize, normalized_similarity, DiffSegment,
    DiffType, SpellingMatch,
};
pub use memory::MemoryStore;
pub use scheduler::{Scheduler, SpellCheck, DEFAULT_MAX_RETRIES, MAX_SPELLING_LEN};
pub use stats::{CatalogStats, DailyActivity, MasteryBreakdown, ProgressStats, StatsAggregator};
pub use store::{due_ordering, error_ordering, Catalog, ProgressStore};
pub use timing::{OperationStats, PerfStats};
pub use types::{
    Attempt, DeckId, Difficulty, MasteryLevel, NewWord, Progress, Word, WordId, WordProgress,
};
