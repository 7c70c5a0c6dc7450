//! Wildcard pattern compiler.
//!
//! A wildcard describes one positional segment:
//!
//! | token     | meaning                                   |
//! |-----------|-------------------------------------------|
//! | `a`..`z`  | itself                                    |
//! | `.`       | exactly one character                     |
//! | `*`       | zero or more characters                   |
//! | `@`       | one vowel (`aeiou`)                       |
//! | `#`       | one consonant                             |
//! | `[abc]`   | one of the listed characters              |
//! | `[!abc]`  | one character not listed                  |
//! | `\x`      | `x`, literally                            |
//!
//! Patterns are translated to an anchored regex and compiled once per distinct
//! text; a [`WildcardCompiler`] keeps the compiled matchers in a bounded LRU.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use fancy_regex::Regex;
use lru::LruCache;

use crate::errors::ParseError;
use crate::letters::{CONSONANTS, VOWELS};

/// Default number of compiled patterns kept per compiler.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// A compiled wildcard predicate, anchored to the whole candidate.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// `*`: matches every string.
    Any,
    /// The empty pattern: matches only the empty string.
    Empty,
    /// A malformed pattern, degraded to "matches nothing".
    Nothing,
    Regex(Regex),
}

impl Matcher {
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Empty => candidate.is_empty(),
            Matcher::Nothing => false,
            // a backtracking-limit error counts as a non-match
            Matcher::Regex(re) => re.is_match(candidate).unwrap_or(false),
        }
    }
}

/// Translate wildcard text into an anchored regex string.
///
/// Malformed classes are copied through and surface when the regex is compiled.
pub(crate) fn wildcard_to_regex_str(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut regex_str = String::with_capacity(pattern.len() * 2 + 2);
    regex_str.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '.' => regex_str.push('.'),
            '*' => regex_str.push_str(".*"),
            '@' => {
                regex_str.push('[');
                regex_str.push_str(VOWELS);
                regex_str.push(']');
            }
            '#' => {
                regex_str.push('[');
                regex_str.push_str(CONSONANTS);
                regex_str.push(']');
            }
            '[' => {
                if let Some(offset) = chars[i + 1..].iter().position(|&c| c == ']') {
                    let close = i + 1 + offset;
                    push_class(&mut regex_str, &chars[i + 1..close]);
                    i = close;
                } else {
                    // unbalanced: a literal '['
                    regex_str.push_str("\\[");
                }
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    push_literal(&mut regex_str, next);
                    i += 1;
                } else {
                    regex_str.push_str("\\\\");
                }
            }
            c => push_literal(&mut regex_str, c),
        }
        i += 1;
    }

    regex_str.push('$');
    regex_str
}

fn push_literal(regex_str: &mut String, c: char) {
    let mut buf = [0u8; 4];
    regex_str.push_str(&fancy_regex::escape(c.encode_utf8(&mut buf)));
}

// Class bodies are copied through; `!` negates and `@`/`#` expand in place.
fn push_class(regex_str: &mut String, body: &[char]) {
    regex_str.push('[');
    let body = match body.split_first() {
        Some(('!', rest)) => {
            regex_str.push('^');
            rest
        }
        _ => body,
    };
    for &c in body {
        match c {
            '@' => regex_str.push_str(VOWELS),
            '#' => regex_str.push_str(CONSONANTS),
            '[' => regex_str.push_str("\\["),
            c => regex_str.push(c),
        }
    }
    regex_str.push(']');
}

/// Compiles wildcard text to [`Matcher`]s, memoizing by pattern text.
///
/// Locking strategy (same as a plain regex cache):
/// - the `Mutex` is held only for lookups and inserts;
/// - compilation happens outside the lock;
/// - `Matcher` clones are cheap (`Regex` is internally ref-counted).
#[derive(Debug)]
pub struct WildcardCompiler {
    cache: Mutex<LruCache<String, Matcher>>,
}

impl Default for WildcardCompiler {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl WildcardCompiler {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    /// Compile `pattern`, returning a cached matcher when one exists.
    ///
    /// # Errors
    /// Returns [`ParseError::InvalidWildcardSyntax`] if the translated regex does
    /// not compile (for example an empty or reversed character class).
    pub fn compile(&self, pattern: &str) -> Result<Matcher, ParseError> {
        match pattern {
            "*" => return Ok(Matcher::Any),
            "" => return Ok(Matcher::Empty),
            _ => {}
        }

        // if the lock is poisoned we just compile without caching
        if let Ok(mut guard) = self.cache.lock()
            && let Some(found) = guard.get(pattern)
        {
            return Ok(found.clone());
        }

        let regex_str = wildcard_to_regex_str(pattern);
        let compiled = Regex::new(&regex_str).map_err(|e| ParseError::InvalidWildcardSyntax {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        let matcher = Matcher::Regex(compiled);

        if let Ok(mut guard) = self.cache.lock() {
            guard.put(pattern.to_string(), matcher.clone());
        }
        Ok(matcher)
    }

    /// Compile `pattern`, degrading a syntax error to [`Matcher::Nothing`].
    ///
    /// The error is pushed onto `diagnostics` so the caller can surface it.
    pub fn matcher_or_nothing(&self, pattern: &str, diagnostics: &mut Vec<ParseError>) -> Matcher {
        self.compile(pattern).unwrap_or_else(|e| {
            log::warn!("{}", e.display_detailed());
            diagnostics.push(e);
            Matcher::Nothing
        })
    }

    /// Number of patterns currently cached.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map_or(0, |guard| guard.len())
    }
}
