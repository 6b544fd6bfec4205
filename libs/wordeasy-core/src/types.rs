//! Core types for the vocabulary service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog identifier of a word.
pub type WordId = i64;

/// Identifier of the deck a word belongs to.
pub type DeckId = i64;

/// Difficulty tier of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    /// Numeric tier (1-3).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Basic => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
        }
    }

    /// Create from numeric tier.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Basic),
            2 => Some(Self::Intermediate),
            3 => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("difficulty must be 1, 2 or 3, got {value}"))
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.to_value()
    }
}

/// How well a word has been learned.
///
/// Levels move by exactly one step per attempt and never leave 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MasteryLevel {
    Unfamiliar,
    Familiar,
    Mastered,
}

impl Default for MasteryLevel {
    fn default() -> Self {
        Self::Unfamiliar
    }
}

impl MasteryLevel {
    pub fn to_value(self) -> u8 {
        match self {
            Self::Unfamiliar => 0,
            Self::Familiar => 1,
            Self::Mastered => 2,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unfamiliar),
            1 => Some(Self::Familiar),
            2 => Some(Self::Mastered),
            _ => None,
        }
    }

    /// One level up, capped at `Mastered`.
    pub fn promote(self) -> Self {
        match self {
            Self::Unfamiliar => Self::Familiar,
            Self::Familiar | Self::Mastered => Self::Mastered,
        }
    }

    /// One level down, floored at `Unfamiliar`.
    pub fn demote(self) -> Self {
        match self {
            Self::Mastered => Self::Familiar,
            Self::Familiar | Self::Unfamiliar => Self::Unfamiliar,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unfamiliar => "unfamiliar",
            Self::Familiar => "familiar",
            Self::Mastered => "mastered",
        }
    }
}

impl TryFrom<u8> for MasteryLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("mastery level must be 0, 1 or 2, got {value}"))
    }
}

impl From<MasteryLevel> for u8 {
    fn from(value: MasteryLevel) -> Self {
        value.to_value()
    }
}

/// Outcome of a spelling attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attempt {
    Correct,
    Incorrect,
}

impl From<bool> for Attempt {
    fn from(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

/// Vocabulary entry. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub text: String,
    pub translation: String,
    pub difficulty: Difficulty,
    pub deck_id: DeckId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Word ready to be inserted into a catalog (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWord {
    pub text: String,
    pub translation: String,
    pub difficulty: Difficulty,
    pub deck_id: DeckId,
    pub category: Option<String>,
}

impl NewWord {
    /// Attach a catalog id.
    pub fn with_id(self, id: WordId) -> Word {
        Word {
            id,
            text: self.text,
            translation: self.translation,
            difficulty: self.difficulty,
            deck_id: self.deck_id,
            category: self.category,
        }
    }
}

/// Per-word learning state, created lazily on first interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub word_id: WordId,
    pub mastery_level: MasteryLevel,
    pub next_review: Option<NaiveDate>,
    pub error_count: u32,
    pub review_count: u32,
    pub last_reviewed: Option<NaiveDate>,
}

impl Progress {
    /// Whether the word should be reviewed on `as_of`.
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.next_review.is_some_and(|date| date <= as_of)
    }
}

/// A word together with its learning state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordProgress {
    pub word: Word,
    pub progress: Progress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_promote_caps_at_mastered() {
        assert_eq!(MasteryLevel::Unfamiliar.promote(), MasteryLevel::Familiar);
        assert_eq!(MasteryLevel::Familiar.promote(), MasteryLevel::Mastered);
        assert_eq!(MasteryLevel::Mastered.promote(), MasteryLevel::Mastered);
    }

    #[test]
    fn mastery_demote_floors_at_unfamiliar() {
        assert_eq!(MasteryLevel::Mastered.demote(), MasteryLevel::Familiar);
        assert_eq!(MasteryLevel::Familiar.demote(), MasteryLevel::Unfamiliar);
        assert_eq!(MasteryLevel::Unfamiliar.demote(), MasteryLevel::Unfamiliar);
    }

    #[test]
    fn difficulty_rejects_out_of_range() {
        assert_eq!(Difficulty::from_value(0), None);
        assert_eq!(Difficulty::from_value(4), None);
        assert_eq!(Difficulty::from_value(2), Some(Difficulty::Intermediate));
    }

    #[test]
    fn levels_serialize_as_integers() {
        let progress = Progress {
            word_id: 7,
            mastery_level: MasteryLevel::Familiar,
            next_review: None,
            error_count: 0,
            review_count: 1,
            last_reviewed: None,
        };
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"mastery_level\":1"));

        let back: Progress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }

    #[test]
    fn never_scheduled_progress_is_not_due() {
        let progress = Progress {
            word_id: 1,
            mastery_level: MasteryLevel::Unfamiliar,
            next_review: None,
            error_count: 0,
            review_count: 0,
            last_reviewed: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(!progress.is_due(today));
    }
}
