//! Letter frequency accumulation

use std::collections::BTreeMap;

/// Occurrence count per lowercase letter.
///
/// Only letters seen at least once are present; merging never lowers a count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterHistogram {
    counts: BTreeMap<char, u64>,
}

impl LetterHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every alphabetic character of `text`, case-folded to lowercase.
    ///
    /// Digits, punctuation, whitespace and other non-letters are ignored.
    pub fn count(text: &str) -> Self {
        let mut histogram = Self::new();
        for letter in text.chars().filter(|c| c.is_alphabetic()) {
            histogram.add(fold_case(letter), 1);
        }
        histogram
    }

    /// Sum of `self` and `other`
    pub fn merge(mut self, other: &LetterHistogram) -> Self {
        self.merge_from(other);
        self
    }

    /// Add every count of `other` into `self`
    pub fn merge_from(&mut self, other: &LetterHistogram) {
        for (&letter, &count) in &other.counts {
            self.add(letter, count);
        }
    }

    fn add(&mut self, letter: char, count: u64) {
        if count > 0 {
            *self.counts.entry(letter).or_insert(0) += count;
        }
    }

    pub fn get(&self, letter: char) -> u64 {
        self.counts.get(&letter).copied().unwrap_or(0)
    }

    /// Total number of letters counted
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct letters
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Letters in ascending order with their counts
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts.iter().map(|(&letter, &count)| (letter, count))
    }
}

impl FromIterator<(char, u64)> for LetterHistogram {
    fn from_iter<I: IntoIterator<Item = (char, u64)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (letter, count) in iter {
            histogram.add(letter, count);
        }
        histogram
    }
}

// One input letter always folds to exactly one key, even where Unicode lowercasing expands
// (e.g. 'İ' becomes "i\u{307}").
fn fold_case(letter: char) -> char {
    letter.to_lowercase().next().unwrap_or(letter)
}
