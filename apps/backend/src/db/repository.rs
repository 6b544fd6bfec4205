//! SQLite implementation of the catalog and progress stores.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use wordeasy_core::{
    Catalog, Difficulty, MasteryLevel, NewWord, Progress, ProgressStore, StoreResult, Word, WordId,
    WordProgress,
};

use crate::db::error::DbError;
use crate::db::schema::{PRAGMAS, SCHEMA};

type Result<T> = std::result::Result<T, DbError>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const WORD_COLUMNS: &str = "w.id, w.text, w.translation, w.difficulty, w.deck_id, w.category";
const PROGRESS_COLUMNS: &str =
    "p.word_id, p.mastery_level, p.next_review, p.error_count, p.review_count, p.last_reviewed";

/// SQLite-backed store. One connection, serialized behind a mutex.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open database at path, creating it and its directory if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::initialize(Connection::open(path)?)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(PRAGMAS)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_word(&self, id: WordId) -> Result<Option<Word>> {
        let sql = format!("SELECT {WORD_COLUMNS} FROM words w WHERE w.id = ?1");
        self.conn()
            .query_row(&sql, params![id], |row| row_to_word(row, 0))
            .optional()
            .map_err(Into::into)
    }

    /// Insert words in one transaction, ignoring `(text, deck_id)` duplicates.
    pub fn insert_words(&self, words: &[NewWord]) -> Result<Vec<Word>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut inserted = Vec::new();
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO words (text, translation, difficulty, category, deck_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for word in words {
                let changed = stmt.execute(params![
                    word.text,
                    word.translation,
                    word.difficulty.to_value(),
                    word.category,
                    word.deck_id,
                ])?;
                if changed == 1 {
                    inserted.push(word.clone().with_id(tx.last_insert_rowid()));
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn sample_words(&self, difficulty: Difficulty, limit: usize) -> Result<Vec<Word>> {
        let sql = format!(
            "SELECT {WORD_COLUMNS} FROM words w WHERE w.difficulty = ?1 ORDER BY RANDOM() LIMIT ?2"
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let words = stmt
            .query_map(params![difficulty.to_value(), limit], |row| row_to_word(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(words)
    }

    pub fn difficulty_counts(&self) -> Result<BTreeMap<Difficulty, usize>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT difficulty, COUNT(*) FROM words GROUP BY difficulty")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, u8>(0)?, row.get::<_, usize>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(value, count)| {
                Difficulty::from_value(value)
                    .map(|d| (d, count))
                    .ok_or_else(|| DbError::InvalidData(format!("difficulty {value}")))
            })
            .collect()
    }

    /// Delete every word; progress rows go with them through the foreign key.
    pub fn clear_words(&self) -> Result<usize> {
        Ok(self.conn().execute("DELETE FROM words", [])?)
    }

    /// Number of words in the catalog.
    pub fn word_count(&self) -> Result<usize> {
        Ok(self
            .conn()
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?)
    }

    pub fn get_progress(&self, word_id: WordId) -> Result<Option<Progress>> {
        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM progress p WHERE p.word_id = ?1");
        self.conn()
            .query_row(&sql, params![word_id], |row| row_to_progress(row, 0))
            .optional()
            .map_err(Into::into)
    }

    pub fn insert_progress_if_absent(&self, progress: &Progress) -> Result<Progress> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO progress
                (word_id, mastery_level, next_review, error_count, review_count, last_reviewed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                progress.word_id,
                progress.mastery_level.to_value(),
                progress.next_review,
                progress.error_count,
                progress.review_count,
                progress.last_reviewed,
            ],
        )?;
        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM progress p WHERE p.word_id = ?1");
        Ok(conn.query_row(&sql, params![progress.word_id], |row| row_to_progress(row, 0))?)
    }

    /// Compare-and-swap. Returns whether the row still matched `expected`.
    pub fn replace_progress(&self, expected: &Progress, next: &Progress) -> Result<bool> {
        let changed = self.conn().execute(
            "UPDATE progress
             SET mastery_level = ?1, next_review = ?2, error_count = ?3,
                 review_count = ?4, last_reviewed = ?5
             WHERE word_id = ?6
               AND mastery_level = ?7 AND next_review IS ?8 AND error_count = ?9
               AND review_count = ?10 AND last_reviewed IS ?11",
            params![
                next.mastery_level.to_value(),
                next.next_review,
                next.error_count,
                next.review_count,
                next.last_reviewed,
                expected.word_id,
                expected.mastery_level.to_value(),
                expected.next_review,
                expected.error_count,
                expected.review_count,
                expected.last_reviewed,
            ],
        )?;
        Ok(changed == 1)
    }

    pub fn due_words(&self, as_of: NaiveDate, limit: usize) -> Result<Vec<WordProgress>> {
        let sql = format!(
            "SELECT {WORD_COLUMNS}, {PROGRESS_COLUMNS}
             FROM progress p
             JOIN words w ON w.id = p.word_id
             WHERE p.next_review IS NOT NULL AND p.next_review <= ?1
             ORDER BY p.mastery_level ASC, p.error_count DESC, w.id ASC
             LIMIT ?2"
        );
        self.query_joined(&sql, params![as_of, limit])
    }

    pub fn error_words(&self, limit: usize) -> Result<Vec<WordProgress>> {
        let sql = format!(
            "SELECT {WORD_COLUMNS}, {PROGRESS_COLUMNS}
             FROM progress p
             JOIN words w ON w.id = p.word_id
             WHERE p.error_count > 0
             ORDER BY p.error_count DESC, p.mastery_level ASC, w.id ASC
             LIMIT ?1"
        );
        self.query_joined(&sql, params![limit])
    }

    pub fn count_due(&self, as_of: NaiveDate) -> Result<usize> {
        Ok(self.conn().query_row(
            "SELECT COUNT(*) FROM progress WHERE next_review IS NOT NULL AND next_review <= ?1",
            params![as_of],
            |row| row.get(0),
        )?)
    }

    pub fn all_progress(&self) -> Result<Vec<Progress>> {
        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM progress p ORDER BY p.word_id");
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| row_to_progress(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn clear_progress(&self) -> Result<usize> {
        Ok(self.conn().execute("DELETE FROM progress", [])?)
    }

    fn query_joined(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<WordProgress>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(WordProgress {
                    word: row_to_word(row, 0)?,
                    progress: row_to_progress(row, 6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn row_to_word(row: &Row, start: usize) -> rusqlite::Result<Word> {
    let difficulty: u8 = row.get(start + 3)?;
    Ok(Word {
        id: row.get(start)?,
        text: row.get(start + 1)?,
        translation: row.get(start + 2)?,
        difficulty: Difficulty::from_value(difficulty)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(start + 3, difficulty.into()))?,
        deck_id: row.get(start + 4)?,
        category: row.get(start + 5)?,
    })
}

fn row_to_progress(row: &Row, start: usize) -> rusqlite::Result<Progress> {
    let level: u8 = row.get(start + 1)?;
    Ok(Progress {
        word_id: row.get(start)?,
        mastery_level: MasteryLevel::from_value(level)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(start + 1, level.into()))?,
        next_review: row.get(start + 2)?,
        error_count: row.get(start + 3)?,
        review_count: row.get(start + 4)?,
        last_reviewed: row.get(start + 5)?,
    })
}

impl Catalog for SqliteRepository {
    fn get_word(&self, id: WordId) -> StoreResult<Option<Word>> {
        Ok(SqliteRepository::get_word(self, id)?)
    }

    fn insert_words(&self, words: &[NewWord]) -> StoreResult<Vec<Word>> {
        Ok(SqliteRepository::insert_words(self, words)?)
    }

    fn sample_words(&self, difficulty: Difficulty, limit: usize) -> StoreResult<Vec<Word>> {
        Ok(SqliteRepository::sample_words(self, difficulty, limit)?)
    }

    fn difficulty_counts(&self) -> StoreResult<BTreeMap<Difficulty, usize>> {
        Ok(SqliteRepository::difficulty_counts(self)?)
    }

    fn clear_words(&self) -> StoreResult<usize> {
        Ok(SqliteRepository::clear_words(self)?)
    }
}

impl ProgressStore for SqliteRepository {
    fn get_progress(&self, word_id: WordId) -> StoreResult<Option<Progress>> {
        Ok(SqliteRepository::get_progress(self, word_id)?)
    }

    fn insert_progress_if_absent(&self, progress: &Progress) -> StoreResult<Progress> {
        SqliteRepository::insert_progress_if_absent(self, progress)
            .map_err(|e| e.into_write_error(progress.word_id))
    }

    fn replace_progress(&self, expected: &Progress, next: &Progress) -> StoreResult<()> {
        match SqliteRepository::replace_progress(self, expected, next) {
            Ok(true) => Ok(()),
            Ok(false) => Err(wordeasy_core::StoreError::Conflict(expected.word_id)),
            Err(e) => Err(e.into_write_error(expected.word_id)),
        }
    }

    fn due_words(&self, as_of: NaiveDate, limit: usize) -> StoreResult<Vec<WordProgress>> {
        Ok(SqliteRepository::due_words(self, as_of, limit)?)
    }

    fn error_words(&self, limit: usize) -> StoreResult<Vec<WordProgress>> {
        Ok(SqliteRepository::error_words(self, limit)?)
    }

    fn count_due(&self, as_of: NaiveDate) -> StoreResult<usize> {
        Ok(SqliteRepository::count_due(self, as_of)?)
    }

    fn all_progress(&self) -> StoreResult<Vec<Progress>> {
        Ok(SqliteRepository::all_progress(self)?)
    }

    fn clear_progress(&self) -> StoreResult<usize> {
        Ok(SqliteRepository::clear_progress(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as Days;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use wordeasy_core::{Scheduler, StoreError};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn new_word(text: &str, difficulty: Difficulty, deck_id: i64) -> NewWord {
        NewWord {
            text: text.to_string(),
            translation: format!("{text}-t"),
            difficulty,
            deck_id,
            category: None,
        }
    }

    fn progress(word_id: WordId, level: MasteryLevel, errors: u32, next: Option<NaiveDate>) -> Progress {
        Progress {
            word_id,
            mastery_level: level,
            next_review: next,
            error_count: errors,
            review_count: errors,
            last_reviewed: None,
        }
    }

    fn seeded(words: &[NewWord]) -> (SqliteRepository, Vec<Word>) {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let inserted = repo.insert_words(words).unwrap();
        (repo, inserted)
    }

    #[test]
    fn test_insert_words_skips_duplicates() {
        let (repo, inserted) = seeded(&[
            new_word("apple", Difficulty::Basic, 1),
            new_word("apple", Difficulty::Basic, 1),
            new_word("apple", Difficulty::Basic, 2),
        ]);
        assert_eq!(inserted.len(), 2);
        assert_eq!(repo.word_count().unwrap(), 2);

        let again = repo.insert_words(&[new_word("apple", Difficulty::Basic, 1)]).unwrap();
        assert!(again.is_empty());
        assert_eq!(repo.get_word(inserted[0].id).unwrap(), Some(inserted[0].clone()));
    }

    #[test]
    fn test_difficulty_counts_and_sampling() {
        let (repo, _) = seeded(&[
            new_word("cat", Difficulty::Basic, 1),
            new_word("dog", Difficulty::Basic, 1),
            new_word("nationalization", Difficulty::Advanced, 1),
        ]);
        let counts = repo.difficulty_counts().unwrap();
        assert_eq!(counts.get(&Difficulty::Basic), Some(&2));
        assert_eq!(counts.get(&Difficulty::Intermediate), None);
        assert_eq!(counts.get(&Difficulty::Advanced), Some(&1));

        let sample = repo.sample_words(Difficulty::Basic, 1).unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].difficulty, Difficulty::Basic);
        assert!(repo.sample_words(Difficulty::Intermediate, 5).unwrap().is_empty());
    }

    #[test]
    fn test_insert_progress_if_absent_keeps_first_row() {
        let (repo, words) = seeded(&[new_word("cat", Difficulty::Basic, 1)]);
        let id = words[0].id;
        let first = progress(id, MasteryLevel::Familiar, 1, Some(today()));
        let second = progress(id, MasteryLevel::Unfamiliar, 0, Some(today()));

        assert_eq!(repo.insert_progress_if_absent(&first).unwrap(), first);
        assert_eq!(repo.insert_progress_if_absent(&second).unwrap(), first);
    }

    #[test]
    fn test_progress_for_unknown_word_is_rejected() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let orphan = progress(42, MasteryLevel::Unfamiliar, 0, Some(today()));
        assert!(ProgressStore::insert_progress_if_absent(&repo, &orphan).is_err());
    }

    #[test]
    fn test_replace_progress_is_compare_and_swap() {
        let (repo, words) = seeded(&[new_word("cat", Difficulty::Basic, 1)]);
        let id = words[0].id;
        let current = repo
            .insert_progress_if_absent(&progress(id, MasteryLevel::Unfamiliar, 0, Some(today())))
            .unwrap();
        let mut next = current.clone();
        next.mastery_level = MasteryLevel::Familiar;
        next.last_reviewed = Some(today());

        ProgressStore::replace_progress(&repo, &current, &next).unwrap();
        assert_eq!(repo.get_progress(id).unwrap(), Some(next.clone()));

        let stale = ProgressStore::replace_progress(&repo, &current, &next).unwrap_err();
        assert!(matches!(stale, StoreError::Conflict(word_id) if word_id == id));
    }

    #[test]
    fn test_due_and_error_ordering() {
        let (repo, words) = seeded(&[
            new_word("a", Difficulty::Basic, 1),
            new_word("b", Difficulty::Basic, 1),
            new_word("c", Difficulty::Basic, 1),
            new_word("d", Difficulty::Basic, 1),
        ]);
        let ids: Vec<_> = words.iter().map(|w| w.id).collect();
        let tomorrow = today() + Days::days(1);
        for p in [
            progress(ids[0], MasteryLevel::Familiar, 0, Some(today())),
            progress(ids[1], MasteryLevel::Unfamiliar, 1, Some(today())),
            progress(ids[2], MasteryLevel::Unfamiliar, 3, Some(today() - Days::days(2))),
            progress(ids[3], MasteryLevel::Unfamiliar, 5, Some(tomorrow)),
        ] {
            repo.insert_progress_if_absent(&p).unwrap();
        }

        let due: Vec<_> = repo
            .due_words(today(), 10)
            .unwrap()
            .into_iter()
            .map(|wp| wp.word.id)
            .collect();
        assert_eq!(due, vec![ids[2], ids[1], ids[0]]);
        assert_eq!(repo.count_due(today()).unwrap(), 3);
        assert_eq!(repo.count_due(tomorrow).unwrap(), 4);

        let errors: Vec<_> = repo
            .error_words(2)
            .unwrap()
            .into_iter()
            .map(|wp| (wp.word.text, wp.progress.error_count))
            .collect();
        assert_eq!(errors, vec![("d".to_string(), 5), ("c".to_string(), 3)]);
    }

    #[test]
    fn test_clear_words_cascades_to_progress() {
        let (repo, words) = seeded(&[new_word("cat", Difficulty::Basic, 1)]);
        repo.insert_progress_if_absent(&progress(words[0].id, MasteryLevel::Unfamiliar, 0, Some(today())))
            .unwrap();

        assert_eq!(repo.clear_words().unwrap(), 1);
        assert!(repo.all_progress().unwrap().is_empty());
    }

    #[test]
    fn test_scheduler_round_trip_through_sqlite() {
        let (repo, words) = seeded(&[new_word("apple", Difficulty::Basic, 1)]);
        let scheduler = Scheduler::new(Arc::new(repo));
        let id = words[0].id;

        let check = scheduler.submit_spelling(id, " APPLE ", today()).unwrap();
        assert!(check.matched.is_correct);
        assert_eq!(check.progress.mastery_level, MasteryLevel::Familiar);
        assert_eq!(check.progress.next_review, Some(today() + Days::days(3)));

        let check = scheduler.submit_spelling(id, "aple", today()).unwrap();
        assert!(!check.matched.is_correct);
        assert_eq!(check.progress.mastery_level, MasteryLevel::Unfamiliar);
        assert_eq!(check.progress.error_count, 1);
        assert_eq!(check.progress.review_count, 2);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("wordeasy-test-{}", std::process::id()));
        let path = dir.join("nested").join("words.db");
        let repo = SqliteRepository::open(&path).unwrap();
        repo.insert_words(&[new_word("cat", Difficulty::Basic, 1)]).unwrap();
        assert!(path.exists());
        drop(repo);
        let _ = std::fs::remove_dir_all(dir);
    }
}
