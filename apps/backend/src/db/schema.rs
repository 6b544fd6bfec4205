//! SQLite schema definitions.

/// Complete schema for the vocabulary database.
pub const SCHEMA: &str = r#"
-- Vocabulary catalog, immutable once ingested
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    translation TEXT NOT NULL,
    difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 3),
    category TEXT,
    deck_id INTEGER NOT NULL DEFAULT 0,
    UNIQUE (text, deck_id)
);

-- Learning state, one row per word
CREATE TABLE IF NOT EXISTS progress (
    word_id INTEGER PRIMARY KEY REFERENCES words(id) ON DELETE CASCADE,
    mastery_level INTEGER NOT NULL DEFAULT 0 CHECK (mastery_level BETWEEN 0 AND 2),
    next_review TEXT,
    error_count INTEGER NOT NULL DEFAULT 0,
    review_count INTEGER NOT NULL DEFAULT 0,
    last_reviewed TEXT
);

CREATE INDEX IF NOT EXISTS idx_words_difficulty ON words(difficulty);
CREATE INDEX IF NOT EXISTS idx_progress_next_review ON progress(next_review);
CREATE INDEX IF NOT EXISTS idx_progress_error_count ON progress(error_count);
"#;

/// Connection settings applied on open.
pub const PRAGMAS: &str = r#"
PRAGMA foreign_keys = ON;
"#;
