use std::ops::RangeInclusive;

use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1, satisfy},
    combinator::opt,
    sequence::preceded,
    Parser,
};

use super::length::bounds_from_digits;
use super::PResult;
use crate::errors::ParseError;
use crate::letters::{LetterClass, EQUATION_VARIABLES, SEGMENT_VARIABLES};

/// Which variable letters a DSL accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope {
    /// Equation DSL: `A`..=`R`.
    Equation,
    /// Segment (QAT) DSL: `A`..=`Z`.
    Segment,
}

impl VariableScope {
    #[must_use]
    pub fn accepts(self, name: char) -> bool {
        match self {
            VariableScope::Equation => EQUATION_VARIABLES.contains(&name),
            VariableScope::Segment => SEGMENT_VARIABLES.contains(&name),
        }
    }

    pub(crate) fn range_label(self) -> &'static str {
        match self {
            VariableScope::Equation => "A-R",
            VariableScope::Segment => "A-Z",
        }
    }
}

/// A declared variable: `X=(N:pattern)` or `X=(N-M:pattern)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: char,
    pub min_len: usize,
    pub max_len: usize,
    /// Wildcard pattern; an empty body is stored as `*`.
    pub pattern: String,
}

impl VariableDefinition {
    #[must_use]
    pub fn is_fixed_length(&self) -> bool {
        self.min_len == self.max_len
    }

    #[must_use]
    pub fn lengths(&self) -> RangeInclusive<usize> {
        self.min_len..=self.max_len
    }
}

/// True if `clause` is an attempt at a definition (`X=...`), valid or not.
pub(crate) fn looks_like_definition(clause: &str) -> bool {
    let mut chars = clause.chars();
    matches!((chars.next(), chars.next()), (Some(c), Some('=')) if c.is_variable())
}

// "X=(N:" or "X=(N-M:"
fn definition_head(input: &str) -> PResult<'_, (char, &str, Option<&str>)> {
    let (input, name) = satisfy(|c: char| c.is_variable()).parse(input)?;
    let (input, _) = tag("=(").parse(input)?;
    let (input, min_digits) = digit1.parse(input)?;
    let (input, max_digits) = opt(preceded(char('-'), digit1)).parse(input)?;
    let (input, _) = char(':').parse(input)?;
    Ok((input, (name, min_digits, max_digits)))
}

/// Parse one definition clause for the given scope.
///
/// # Errors
/// - [`ParseError::InvalidVariableDefinition`] if the clause is not of the form
///   `X=(N[-M]:pattern)`.
/// - [`ParseError::InvalidVariableName`] if `X` is outside `scope`.
/// - [`ParseError::ClauseParseError`] wrapping the length error if `N == 0` or `M < N`.
pub fn parse_variable_definition(clause: &str, scope: VariableScope) -> Result<VariableDefinition, ParseError> {
    let invalid = |reason: &str| ParseError::InvalidVariableDefinition {
        clause: clause.to_string(),
        reason: reason.to_string(),
    };

    let (rest, (name, min_digits, max_digits)) =
        definition_head(clause).map_err(|_| invalid("expected X=(N:pattern) or X=(N-M:pattern)"))?;
    let body = rest.strip_suffix(')').ok_or_else(|| invalid("missing closing ')'"))?;

    if !scope.accepts(name) {
        return Err(ParseError::InvalidVariableName { var: name.to_string(), range: scope.range_label() });
    }

    let lengths = bounds_from_digits(min_digits, max_digits)
        .map_err(|e| ParseError::ClauseParseError { clause: clause.to_string(), source: Box::new(e) })?;

    Ok(VariableDefinition {
        name,
        min_len: *lengths.start(),
        max_len: *lengths.end(),
        pattern: if body.is_empty() { "*".to_string() } else { body.to_string() },
    })
}
