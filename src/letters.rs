use std::ops::RangeInclusive;

// Character-set constants
pub(crate) const ALPHABET_SIZE: usize = 26;
#[cfg(test)]
pub(crate) const LOWERCASE_ALPHABET: RangeInclusive<char> = 'a'..='z';
#[cfg(test)]
pub(crate) const UPPERCASE_ALPHABET: RangeInclusive<char> = 'A'..='Z';

pub const VOWELS: &str = "aeiou";
pub const CONSONANTS: &str = "bcdfghjklmnpqrstvwxyz";

/// Variables accepted by the equation DSL.
pub(crate) const EQUATION_VARIABLES: RangeInclusive<char> = 'A'..='R';
/// Variables accepted by the segment (QAT) DSL.
pub(crate) const SEGMENT_VARIABLES: RangeInclusive<char> = 'A'..='Z';

/// Character classes used by the query grammars.
pub trait LetterClass {
    fn is_vowel(&self) -> bool;
    fn is_consonant(&self) -> bool;
    fn is_variable(&self) -> bool;
    fn is_literal(&self) -> bool;
}

impl LetterClass for char {
    fn is_vowel(&self) -> bool {
        VOWELS.contains(*self)
    }
    fn is_consonant(&self) -> bool {
        self.is_ascii_lowercase() && !self.is_vowel()
    }
    fn is_variable(&self) -> bool {
        self.is_ascii_uppercase()
    }
    fn is_literal(&self) -> bool {
        self.is_ascii_lowercase()
    }
}

/// Multiset of letters, keyed by character.
///
/// Lexicon words are alphabetic but not necessarily ASCII, so counts live in a
/// small fixed table for `a`-`z` with a sorted overflow list for anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LetterCounts {
    ascii: [u16; ALPHABET_SIZE],
    other: Vec<(char, u16)>,
    total: usize,
}

impl LetterCounts {
    pub(crate) fn of(s: &str) -> Self {
        let mut counts = Self::default();
        for c in s.chars() {
            counts.add(c);
        }
        counts
    }

    pub(crate) fn add(&mut self, c: char) {
        self.total += 1;
        if c.is_ascii_lowercase() {
            self.ascii[(c as u8 - b'a') as usize] += 1;
        } else {
            match self.other.binary_search_by_key(&c, |&(k, _)| k) {
                Ok(i) => self.other[i].1 += 1,
                Err(i) => self.other.insert(i, (c, 1)),
            }
        }
    }

    pub(crate) fn count(&self, c: char) -> u16 {
        if c.is_ascii_lowercase() {
            self.ascii[(c as u8 - b'a') as usize]
        } else {
            self.other
                .binary_search_by_key(&c, |&(k, _)| k)
                .map_or(0, |i| self.other[i].1)
        }
    }

    /// Remove one `c`; returns `false` (leaving counts unchanged) if none is left.
    pub(crate) fn take(&mut self, c: char) -> bool {
        let slot = if c.is_ascii_lowercase() {
            &mut self.ascii[(c as u8 - b'a') as usize]
        } else {
            match self.other.binary_search_by_key(&c, |&(k, _)| k) {
                Ok(i) => &mut self.other[i].1,
                Err(_) => return false,
            }
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        self.total -= 1;
        true
    }

    /// Total number of letters counted.
    pub(crate) fn total(&self) -> usize {
        self.total
    }

    /// True if every letter of `self` is available in `other` (sub-multiset).
    pub(crate) fn is_within(&self, other: &LetterCounts) -> bool {
        self.ascii.iter().zip(other.ascii.iter()).all(|(a, b)| a <= b)
            && self.other.iter().all(|&(c, n)| other.count(c) >= n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_vowel() {
        for c in ['a', 'e', 'i', 'o', 'u'] {
            assert!(c.is_vowel());
        }
        assert!(!'y'.is_vowel());
        assert!(!'A'.is_vowel());
        assert!(!'@'.is_vowel());
    }

    #[test]
    fn test_is_consonant() {
        assert!('b'.is_consonant());
        assert!('y'.is_consonant());
        assert!('z'.is_consonant());
        assert!(!'a'.is_consonant());
        assert!(!'B'.is_consonant());
        assert!(!'.'.is_consonant());
    }

    #[test]
    fn test_vowel_consonant_mutual_exclusivity() {
        for c in LOWERCASE_ALPHABET {
            assert_ne!(c.is_vowel(), c.is_consonant(), "char '{c}' must be exactly one of vowel/consonant");
        }
    }

    #[test]
    fn test_variable_literal_mutual_exclusivity() {
        for c in UPPERCASE_ALPHABET {
            assert!(c.is_variable());
            assert!(!c.is_literal());
        }
        for c in LOWERCASE_ALPHABET {
            assert!(!c.is_variable());
            assert!(c.is_literal());
        }
    }

    #[test]
    fn test_alphabet_constants() {
        assert_eq!(VOWELS.len() + CONSONANTS.len(), ALPHABET_SIZE);
        assert!(EQUATION_VARIABLES.contains(&'R'));
        assert!(!EQUATION_VARIABLES.contains(&'S'));
        assert!(SEGMENT_VARIABLES.contains(&'Z'));
    }

    #[test]
    fn test_letter_counts_take_and_within() {
        let mut word = LetterCounts::of("landform");
        let needed = LetterCounts::of("ford");
        assert!(needed.is_within(&word));
        assert!(!LetterCounts::of("fforr").is_within(&word));

        assert!(word.take('l'));
        assert!(!word.take('l'));
        assert_eq!(word.total(), 7);
        assert_eq!(word.count('o'), 1);
    }

    #[test]
    fn test_letter_counts_non_ascii() {
        let mut counts = LetterCounts::of("café");
        assert_eq!(counts.count('é'), 1);
        assert!(counts.take('é'));
        assert!(!counts.take('é'));
        assert_eq!(counts.total(), 3);
    }
}
