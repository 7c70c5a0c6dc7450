use std::ops::RangeInclusive;

use nom::{
    character::complete::{char, digit1},
    combinator::opt,
    sequence::{preceded, terminated},
    Parser,
};

use super::PResult;
use crate::errors::ParseError;

/// A pattern with its optional `N:` / `N-M:` length prefix split off.
#[derive(Debug)]
pub struct LengthPrefix<'a> {
    /// Admissible word lengths, if a valid prefix was present.
    pub bounds: Option<RangeInclusive<usize>>,
    /// The text the matcher should compile.
    pub pattern: &'a str,
    /// Set when a prefix was present but invalid; `pattern` is then the whole input.
    pub diagnostic: Option<ParseError>,
}

impl<'a> LengthPrefix<'a> {
    fn unconstrained(pattern: &'a str) -> Self {
        Self { bounds: None, pattern, diagnostic: None }
    }
}

// "5:" or "2-4:" at the start of a pattern
fn length_prefix(input: &str) -> PResult<'_, (&str, Option<&str>)> {
    terminated((digit1, opt(preceded(char('-'), digit1))), char(':')).parse(input)
}

/// Validate a `min[-max]` pair of digit strings.
///
/// `0` lengths are rejected as [`ParseError::InvalidLengthRange`], and a
/// maximum below the minimum as [`ParseError::ContradictoryBounds`].
pub(crate) fn bounds_from_digits(min_digits: &str, max_digits: Option<&str>) -> Result<RangeInclusive<usize>, ParseError> {
    let min: usize = min_digits.parse()?;
    let max: usize = match max_digits {
        Some(digits) => digits.parse()?,
        None => min,
    };

    if min == 0 {
        let input = max_digits.map_or_else(|| min_digits.to_string(), |m| format!("{min_digits}-{m}"));
        return Err(ParseError::InvalidLengthRange { input });
    }
    if max < min {
        return Err(ParseError::ContradictoryBounds { min, max });
    }
    Ok(min..=max)
}

/// Split a leading length prefix off `raw`.
///
/// `N:` requires `N > 0` and `N-M:` requires `0 < N <= M`. An invalid prefix is
/// reported through [`LengthPrefix::diagnostic`] and the whole text is kept as
/// the pattern; text without a prefix passes through unchanged.
///
/// ```
/// use lexiq::parser::parse_length_prefix;
///
/// let split = parse_length_prefix("2-4:l*");
/// assert_eq!(split.bounds, Some(2..=4));
/// assert_eq!(split.pattern, "l*");
/// ```
#[must_use]
pub fn parse_length_prefix(raw: &str) -> LengthPrefix<'_> {
    let Ok((rest, (min_digits, max_digits))) = length_prefix(raw) else {
        return LengthPrefix::unconstrained(raw);
    };

    match bounds_from_digits(min_digits, max_digits) {
        Ok(bounds) => LengthPrefix { bounds: Some(bounds), pattern: rest, diagnostic: None },
        Err(e) => LengthPrefix { bounds: None, pattern: raw, diagnostic: Some(e) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_length() {
        let split = parse_length_prefix("5:l@n#f*m");
        assert_eq!(split.bounds, Some(5..=5));
        assert_eq!(split.pattern, "l@n#f*m");
        assert!(split.diagnostic.is_none());
    }

    #[test]
    fn test_length_range() {
        let split = parse_length_prefix("2-4:*");
        assert_eq!(split.bounds, Some(2..=4));
        assert_eq!(split.pattern, "*");
    }

    #[test]
    fn test_no_prefix() {
        let split = parse_length_prefix("l*x");
        assert!(split.bounds.is_none());
        assert_eq!(split.pattern, "l*x");
        assert!(split.diagnostic.is_none());

        // digits without a colon are just literal text
        let split = parse_length_prefix("12ab");
        assert!(split.bounds.is_none());
        assert_eq!(split.pattern, "12ab");
    }

    #[test]
    fn test_zero_length_is_diagnostic() {
        let split = parse_length_prefix("0:abc");
        assert!(split.bounds.is_none());
        assert_eq!(split.pattern, "0:abc");
        assert!(matches!(split.diagnostic, Some(ParseError::InvalidLengthRange { ref input }) if input == "0"));
    }

    #[test]
    fn test_reversed_range_is_diagnostic() {
        let split = parse_length_prefix("5-3:*");
        assert!(split.bounds.is_none());
        assert_eq!(split.pattern, "5-3:*");
        assert!(matches!(split.diagnostic, Some(ParseError::ContradictoryBounds { min: 5, max: 3 })));
    }

    #[test]
    fn test_overflowing_length_is_parse_int_error() {
        let split = parse_length_prefix("99999999999999999999999:*");
        assert_eq!(split.diagnostic.map(|e| e.code()), Some("E010"));
    }

    proptest! {
        #[test]
        fn prop_valid_prefix_yields_bounds(min in 1usize..50, extra in 0usize..50) {
            let max = min + extra;
            let raw = format!("{min}-{max}:a*");
            let split = parse_length_prefix(&raw);
            prop_assert_eq!(split.bounds, Some(min..=max));
            prop_assert_eq!(split.pattern, "a*");
        }
    }
}
