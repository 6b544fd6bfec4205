//! Lexical difficulty heuristics.
//!
//! Rules, first match wins:
//! 1. high-frequency basic word -> Basic
//! 2. at most 5 letters and no advanced affix -> Basic
//! 3. contains an advanced affix or root -> Advanced
//! 4. 10 letters or more -> Advanced
//! 5. anything else -> Intermediate
//!
//! Affix matching is plain substring containment.

use std::collections::BTreeMap;

use crate::types::Difficulty;

const BASIC_WORDS: &[&str] = &[
    "a", "an", "the", "i", "you", "he", "she", "it", "we", "they",
    "am", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "do", "does", "did", "can", "will", "would",
    "good", "bad", "big", "small", "hot", "cold", "new", "old",
    "cat", "dog", "bird", "fish", "one", "two", "red", "blue",
    "eat", "go", "see", "get", "make", "take", "know", "come",
    "yes", "no", "ok", "hello", "hi", "bye", "please", "sorry",
    "thank", "thanks", "love", "like", "want", "need", "help",
    "day", "time", "year", "home", "work", "name", "man", "woman",
    "boy", "girl", "water", "food", "book", "house", "car", "phone",
    "happy", "sad", "nice", "fine", "well", "very", "much", "many",
    "some", "any", "all", "not", "but", "and", "or", "with", "from",
];

const ADVANCED_AFFIXES: &[&str] = &[
    // abstract noun suffixes
    "tion", "sion", "ment", "ness", "ance", "ence",
    // fields of study
    "ology", "graphy", "metry",
    // adjective suffixes
    "able", "ible", "ive", "ous", "ful", "less",
    // verb suffixes
    "ate", "ify", "ize",
    // prefixes and roots
    "pre", "post", "anti", "pro", "contra",
    "hyper", "hypo", "meta", "pseudo",
    "circum", "trans", "inter", "intra",
];

/// Assign a difficulty tier to a word.
pub fn classify(word: &str) -> Difficulty {
    let word = word.trim().to_lowercase();
    let len = word.chars().count();

    if BASIC_WORDS.contains(&word.as_str()) {
        return Difficulty::Basic;
    }

    let has_affix = ADVANCED_AFFIXES.iter().any(|affix| word.contains(affix));

    if len <= 5 && !has_affix {
        Difficulty::Basic
    } else if has_affix || len >= 10 {
        Difficulty::Advanced
    } else {
        Difficulty::Intermediate
    }
}

/// Group words by their assigned tier.
pub fn classify_batch<'a, I>(words: I) -> BTreeMap<Difficulty, Vec<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<Difficulty, Vec<&'a str>> =
        Difficulty::ALL.iter().map(|d| (*d, Vec::new())).collect();
    for word in words {
        groups.entry(classify(word)).or_default().push(word);
    }
    groups
}
