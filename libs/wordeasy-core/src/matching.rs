//! Spelling comparison for typed answers.

use serde::{Deserialize, Serialize};

/// Result of comparing a typed spelling to the catalog text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellingMatch {
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    /// Trimmed, lowercased input.
    pub typed_normalized: String,
    /// Character diff of the input against the answer, for feedback.
    pub diff: Vec<DiffSegment>,
}

/// Kind of a diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    /// Present in both.
    Same,
    /// In the answer but not typed.
    Missing,
    /// Typed but not in the answer.
    Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub text: String,
    pub diff_type: DiffType,
}

/// Normalize a spelling for comparison: trim and lowercase.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Compare a typed spelling with the correct word, case-insensitively.
pub fn compare_spelling(typed: &str, correct: &str) -> SpellingMatch {
    let typed_normalized = normalize(typed);
    let correct_normalized = normalize(correct);

    SpellingMatch {
        is_correct: typed_normalized == correct_normalized,
        similarity: normalized_similarity(&typed_normalized, &correct_normalized),
        diff: char_diff(&typed_normalized, &correct_normalized),
        typed_normalized,
    }
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity (0.0 to 1.0) based on Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

/// Character diff of `typed` against `correct`, built from their longest common subsequence.
pub fn char_diff(typed: &str, correct: &str) -> Vec<DiffSegment> {
    let typed: Vec<char> = typed.chars().collect();
    let correct: Vec<char> = correct.chars().collect();
    let (m, n) = (typed.len(), correct.len());

    // lcs[i][j] = LCS length of typed[i..] and correct[j..]
    let mut lcs = vec![vec![0usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            lcs[i][j] = if typed[i] == correct[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut segments: Vec<DiffSegment> = Vec::new();
    let mut push = |c: char, diff_type: DiffType| match segments.last_mut() {
        Some(last) if last.diff_type == diff_type => last.text.push(c),
        _ => segments.push(DiffSegment {
            text: c.to_string(),
            diff_type,
        }),
    };

    let (mut i, mut j) = (0, 0);
    while i < m || j < n {
        if i < m && j < n && typed[i] == correct[j] {
            push(typed[i], DiffType::Same);
            i += 1;
            j += 1;
        } else if j < n && (i == m || lcs[i][j + 1] >= lcs[i + 1][j]) {
            push(correct[j], DiffType::Missing);
            j += 1;
        } else {
            push(typed[i], DiffType::Extra);
            i += 1;
        }
    }

    segments
}
