//! Read-only rollups over progress and catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::store::{Catalog, ProgressStore};
use crate::types::{Difficulty, MasteryLevel, Progress};

/// Coins awarded per mastered word.
pub const COINS_PER_MASTERED: usize = 10;

/// Mastered words needed per level.
pub const MASTERED_PER_LEVEL: usize = 10;

pub const MAX_LEVEL: usize = 99;

/// Days covered by the recent activity view.
pub const ACTIVITY_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryBreakdown {
    pub unfamiliar: usize,
    pub familiar: usize,
    pub mastered: usize,
}

/// Word counts per difficulty tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub level1: usize,
    pub level2: usize,
    pub level3: usize,
    pub total: usize,
}

impl CatalogStats {
    pub fn from_counts(counts: &BTreeMap<Difficulty, usize>) -> Self {
        let get = |d: Difficulty| counts.get(&d).copied().unwrap_or(0);
        let (level1, level2, level3) = (
            get(Difficulty::Basic),
            get(Difficulty::Intermediate),
            get(Difficulty::Advanced),
        );
        Self {
            level1,
            level2,
            level3,
            total: level1 + level2 + level3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    /// `MM-DD`
    pub label: String,
    pub reviewed: usize,
}

/// Learning progress overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub level: usize,
    pub coins: usize,
    pub mastery: MasteryBreakdown,
    pub difficulty_distribution: CatalogStats,
    pub total_words: usize,
    pub reviewed_words: usize,
    pub error_words: usize,
    /// Percentage of progress rows with at least one error, two decimals.
    pub error_rate: f64,
    /// Oldest day first.
    pub recent_activity: Vec<DailyActivity>,
}

impl ProgressStats {
    /// Build the overview from a progress scan and catalog tier counts.
    pub fn compute(
        progress: &[Progress],
        difficulty_counts: &BTreeMap<Difficulty, usize>,
        today: NaiveDate,
    ) -> Self {
        let mut mastery = MasteryBreakdown::default();
        let mut reviewed_words = 0;
        let mut error_words = 0;
        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();

        for p in progress {
            match p.mastery_level {
                MasteryLevel::Unfamiliar => mastery.unfamiliar += 1,
                MasteryLevel::Familiar => mastery.familiar += 1,
                MasteryLevel::Mastered => mastery.mastered += 1,
            }
            if p.review_count > 0 {
                reviewed_words += 1;
            }
            if p.error_count > 0 {
                error_words += 1;
            }
            if let Some(day) = p.last_reviewed {
                *per_day.entry(day).or_insert(0) += 1;
            }
        }

        let difficulty_distribution = CatalogStats::from_counts(difficulty_counts);

        Self {
            level: level_for(mastery.mastered),
            coins: mastery.mastered * COINS_PER_MASTERED,
            total_words: difficulty_distribution.total,
            difficulty_distribution,
            mastery,
            reviewed_words,
            error_words,
            error_rate: error_rate(error_words, progress.len()),
            recent_activity: recent_activity(&per_day, today),
        }
    }

    /// All-zero view, used when the underlying scan fails.
    pub fn empty(today: NaiveDate) -> Self {
        Self::compute(&[], &BTreeMap::new(), today)
    }
}

/// Gamified level: one level per ten mastered words, capped at 99.
pub fn level_for(mastered: usize) -> usize {
    (mastered / MASTERED_PER_LEVEL + 1).min(MAX_LEVEL)
}

/// Percentage rounded to two decimals; zero when there is nothing to divide by.
pub fn error_rate(error_words: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = error_words as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

fn recent_activity(per_day: &BTreeMap<NaiveDate, usize>, today: NaiveDate) -> Vec<DailyActivity> {
    (0..ACTIVITY_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            DailyActivity {
                date,
                label: date.format("%m-%d").to_string(),
                reviewed: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Computes statistics from a store. Never fails: errors degrade to zeros.
pub struct StatsAggregator<S> {
    store: Arc<S>,
}

impl<S> StatsAggregator<S>
where
    S: Catalog + ProgressStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn progress_stats(&self, today: NaiveDate) -> ProgressStats {
        let scan = self
            .store
            .all_progress()
            .and_then(|progress| Ok((progress, self.store.difficulty_counts()?)));

        match scan {
            Ok((progress, counts)) => ProgressStats::compute(&progress, &counts, today),
            Err(e) => {
                tracing::warn!(error = %e, "Progress statistics unavailable");
                ProgressStats::empty(today)
            }
        }
    }

    pub fn catalog_stats(&self) -> CatalogStats {
        match self.store.difficulty_counts() {
            Ok(counts) => CatalogStats::from_counts(&counts),
            Err(e) => {
                tracing::warn!(error = %e, "Catalog statistics unavailable");
                CatalogStats::default()
            }
        }
    }
}
