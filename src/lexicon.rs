//! Load and index the word corpus that every query runs against.
//!
//! The input is plain text, one candidate word per line. Each line is trimmed and
//! lowercased; a line is kept only if every character is alphabetic. Blank and
//! non-alphabetic lines are skipped silently.
//!
//! The resulting [`Lexicon`] keeps three views of the same words:
//! - a sorted `Vec<String>` of every word (stable, reproducible result order),
//! - a map from length (in characters) to the sorted words of that length,
//! - a `HashSet` for O(1) membership tests.
//!
//! A `Lexicon` is immutable once built. Callers share it (usually behind an
//! `Arc`) across concurrent queries and replace it wholesale to reload.

use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;

/// A processed, ready-to-query word corpus.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    /// All words, sorted alphabetically and deduplicated.
    words: Vec<String>,
    /// Length (in chars) → sorted words of that length.
    by_length: BTreeMap<usize, Vec<String>>,
    /// Membership set.
    members: HashSet<String>,
}

impl Lexicon {
    /// Parse a lexicon from an in-memory string.
    ///
    /// # Behavior:
    /// 1. Splits the input into lines.
    /// 2. Trims and lowercases each line.
    /// 3. Skips empty lines and lines containing any non-alphabetic character.
    /// 4. Sorts and deduplicates.
    /// 5. Builds the length buckets and the membership set.
    #[must_use]
    pub fn parse_from_str(contents: &str) -> Lexicon {
        let words: Vec<String> = contents
            .lines()
            .filter_map(|raw_line| {
                let word = raw_line.trim().to_lowercase();
                if !word.is_empty() && word.chars().all(char::is_alphabetic) {
                    Some(word)
                } else {
                    None
                }
            })
            .collect();

        Self::from_words(words)
    }

    /// Build a lexicon from already-normalized words.
    ///
    /// Words are sorted and deduplicated; no filtering is applied, so callers
    /// that did not normalize should go through [`Lexicon::parse_from_str`].
    pub fn from_words<I, S>(words: I) -> Lexicon
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();

        // `dedup()` only removes adjacent duplicates, so sort first.
        words.sort();
        words.dedup();

        let mut by_length: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for word in &words {
            // pushing in sorted order keeps each bucket sorted
            by_length.entry(word.chars().count()).or_default().push(word.clone());
        }
        let members = words.iter().cloned().collect();

        Lexicon { words, by_length, members }
    }

    /// Native-only convenience method: read from a file path and parse.
    ///
    /// The file is read fully before any parsing happens; there is no partial
    /// load.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to read a file at `path`.
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Lexicon> {
        let path_ref = path.as_ref();

        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read lexicon from '{}': {}", path_ref.display(), e),
            )
        })?;

        Ok(Self::parse_from_str(&data))
    }

    /// Every word, in sorted order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// O(1) membership test.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.members.contains(word)
    }

    /// Sorted words with exactly `len` characters (empty if none).
    #[must_use]
    pub fn bucket(&self, len: usize) -> &[String] {
        self.by_length.get(&len).map_or(&[], Vec::as_slice)
    }

    /// Words whose length lies in `lengths`, bucket by bucket (shortest first).
    pub fn words_in_lengths(&self, lengths: RangeInclusive<usize>) -> impl Iterator<Item = &String> {
        self.by_length.range(lengths).flat_map(|(_, bucket)| bucket.iter())
    }

    /// Words with at least `min_len` characters, bucket by bucket.
    pub fn words_at_least(&self, min_len: usize) -> impl Iterator<Item = &String> {
        self.by_length.range(min_len..).flat_map(|(_, bucket)| bucket.iter())
    }

    /// Lengths present in the lexicon, ascending.
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_length.keys().copied()
    }

    /// Number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let lexicon = Lexicon::parse_from_str("cat\ndog\nbird");
        assert_eq!(lexicon.words(), ["bird", "cat", "dog"]);
        assert_eq!(lexicon.len(), 3);
    }

    #[test]
    fn test_parse_normalizes_to_lowercase_and_trims() {
        let lexicon = Lexicon::parse_from_str("  CAT  \nDog\n\tBIRD ");
        assert_eq!(lexicon.words(), ["bird", "cat", "dog"]);
    }

    #[test]
    fn test_parse_skips_non_alphabetic_and_blank_lines() {
        let lexicon = Lexicon::parse_from_str("cat\n\n\nice cream\nx-ray\nabc123\ndon't\ndog\n");
        assert_eq!(lexicon.words(), ["cat", "dog"]);
    }

    #[test]
    fn test_parse_deduplicates() {
        let lexicon = Lexicon::parse_from_str("cat\nCat\ncat\ndog");
        assert_eq!(lexicon.words(), ["cat", "dog"]);
        assert_eq!(lexicon.bucket(3), ["cat", "dog"]);
    }

    #[test]
    fn test_every_word_in_exactly_one_bucket() {
        let lexicon = Lexicon::parse_from_str("a\nbe\ncat\ndogs\nemus\nzoo");
        let bucketed: usize = lexicon.lengths().map(|l| lexicon.bucket(l).len()).sum();
        assert_eq!(bucketed, lexicon.len());
        for word in lexicon.words() {
            assert!(lexicon.contains(word));
            assert!(lexicon.bucket(word.chars().count()).contains(word));
        }
    }

    #[test]
    fn test_buckets_sorted() {
        let lexicon = Lexicon::parse_from_str("zoo\ncat\nemu\nant");
        assert_eq!(lexicon.bucket(3), ["ant", "cat", "emu", "zoo"]);
        assert!(lexicon.bucket(7).is_empty());
    }

    #[test]
    fn test_length_ranges() {
        let lexicon = Lexicon::parse_from_str("a\nab\nabc\nabcd\nabcde");
        let mid: Vec<_> = lexicon.words_in_lengths(2..=4).map(String::as_str).collect();
        assert_eq!(mid, ["ab", "abc", "abcd"]);
        let long: Vec<_> = lexicon.words_at_least(4).map(String::as_str).collect();
        assert_eq!(long, ["abcd", "abcde"]);
    }

    #[test]
    fn test_unicode_lengths_are_char_counts() {
        let lexicon = Lexicon::parse_from_str("café\ncafe");
        assert_eq!(lexicon.bucket(4), ["cafe", "café"]);
    }

    #[test]
    fn test_parse_empty_input() {
        let lexicon = Lexicon::parse_from_str("");
        assert!(lexicon.is_empty());
        assert_eq!(lexicon.lengths().count(), 0);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = Lexicon::load_from_path("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
