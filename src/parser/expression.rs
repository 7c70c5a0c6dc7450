use std::collections::BTreeMap;
use std::fmt;

use nom::{
    branch::alt,
    character::complete::{anychar, char, satisfy},
    combinator::map,
    sequence::preceded,
    Parser,
};

use super::var_def::VariableDefinition;
use super::PResult;
use crate::bindings::Bindings;
use crate::errors::ParseError;
use crate::letters::EQUATION_VARIABLES;

/// One token of an equation expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Lit(char),                         // 'x': must appear verbatim
    Var { name: char, reversed: bool }, // 'A' or '~A'
}

/// How an expression participates in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// At most one variable reference, none reversed.
    Simple,
    /// Several variable references, none reversed.
    Composite,
    /// At least one `~X` reference.
    Reverse,
    /// Leading `/`: letters checked as a multiset.
    Anagram,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpressionKind::Simple => "simple",
            ExpressionKind::Composite => "composite",
            ExpressionKind::Reverse => "reverse",
            ExpressionKind::Anagram => "anagram",
        };
        f.write_str(label)
    }
}

/// A parsed equation expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternStructure {
    pub tokens: Vec<Token>,
    /// Literal count plus the fixed length of every variable reference.
    pub total_len: usize,
    pub kind: ExpressionKind,
    /// The expression as written.
    pub raw: String,
}

impl PatternStructure {
    /// Variable references in token order (repeats included).
    pub fn variables(&self) -> impl Iterator<Item = (char, bool)> + '_ {
        self.tokens.iter().filter_map(|t| match *t {
            Token::Var { name, reversed } => Some((name, reversed)),
            Token::Lit(_) => None,
        })
    }

    /// Build the concrete word this expression spells under `bindings`.
    /// Returns `None` if any referenced variable is unbound.
    #[must_use]
    pub fn materialize(&self, bindings: &Bindings) -> Option<String> {
        self.materialize_with(bindings, false)
    }

    /// Like [`PatternStructure::materialize`] but with every reversal flag
    /// toggled (`A~A` is read as `~AA`).
    #[must_use]
    pub fn materialize_mirrored(&self, bindings: &Bindings) -> Option<String> {
        self.materialize_with(bindings, true)
    }

    fn materialize_with(&self, bindings: &Bindings, toggle: bool) -> Option<String> {
        let mut word = String::with_capacity(self.total_len);
        for token in &self.tokens {
            match *token {
                Token::Lit(c) => word.push(c),
                Token::Var { name, reversed } => {
                    let value = bindings.get(name)?;
                    if reversed != toggle {
                        word.extend(value.chars().rev());
                    } else {
                        word.push_str(value);
                    }
                }
            }
        }
        Some(word)
    }
}

// === Token parsers ===

fn is_equation_variable(c: char) -> bool {
    EQUATION_VARIABLES.contains(&c)
}

fn rev_ref(input: &str) -> PResult<'_, Token> {
    map(preceded(char('~'), satisfy(is_equation_variable)), |name| Token::Var { name, reversed: true }).parse(input)
}

fn var_ref(input: &str) -> PResult<'_, Token> {
    map(satisfy(is_equation_variable), |name| Token::Var { name, reversed: false }).parse(input)
}

fn literal(input: &str) -> PResult<'_, Token> {
    map(anychar, Token::Lit).parse(input)
}

fn token(input: &str) -> PResult<'_, Token> {
    alt((rev_ref, var_ref, literal)).parse(input)
}

/// Parse one equation expression against the declared variables.
///
/// Scans left to right: `~X` is a reversed reference, `X` (A-R) a reference,
/// and any other character a literal. A leading `/` marks an anagram
/// expression and is not itself a token.
///
/// # Errors
/// - [`ParseError::UndefinedVariableReference`] if a referenced variable is not in `definitions`.
/// - [`ParseError::NonFixedLengthInEquation`] if a referenced variable has a length range.
pub fn parse_expression(
    raw: &str,
    definitions: &BTreeMap<char, VariableDefinition>,
) -> Result<PatternStructure, ParseError> {
    let (is_anagram, body) = match raw.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    let mut rest = body;
    let mut tokens = Vec::new();
    let mut total_len: usize = 0;

    while !rest.is_empty() {
        let (next, tok) = token(rest).map_err(|e| match e {
            nom::Err::Error(pe) | nom::Err::Failure(pe) => *pe,
            nom::Err::Incomplete(_) => ParseError::NomError(nom::error::ErrorKind::Complete),
        })?;

        let width = match tok {
            Token::Var { name, .. } => {
                let def = definitions.get(&name).ok_or_else(|| ParseError::UndefinedVariableReference {
                    var: name,
                    expression: raw.to_string(),
                })?;
                if !def.is_fixed_length() {
                    return Err(ParseError::NonFixedLengthInEquation { var: name, expression: raw.to_string() });
                }
                def.min_len
            }
            Token::Lit(_) => 1,
        };
        // query lengths are unbounded
        total_len = total_len
            .checked_add(width)
            .ok_or_else(|| ParseError::InvalidLengthRange { input: raw.to_string() })?;

        tokens.push(tok);
        rest = next;
    }

    let var_count = tokens.iter().filter(|t| matches!(t, Token::Var { .. })).count();
    let kind = if is_anagram {
        ExpressionKind::Anagram
    } else if tokens.iter().any(|t| matches!(t, Token::Var { reversed: true, .. })) {
        ExpressionKind::Reverse
    } else if var_count > 1 {
        ExpressionKind::Composite
    } else {
        ExpressionKind::Simple
    };

    Ok(PatternStructure { tokens, total_len, kind, raw: raw.to_string() })
}
