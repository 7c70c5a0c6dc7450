//! Error types for parsing operations with error codes and helpful messages.
//!
//! # Error Codes
//!
//! Each error variant has a unique code (E001-E012) for documentation lookup:
//!
//! - E001: `EmptyQuery` (Query contains no clauses)
//! - E002: `InvalidVariableDefinition` (Malformed `X=(N[-M]:pattern)` clause)
//! - E003: `InvalidVariableName` (Variable letter outside the accepted range)
//! - E004: `InvalidLengthRange` (Bad `N:` / `N-M:` length prefix)
//! - E005: `ContradictoryBounds` (Minimum length exceeds maximum)
//! - E006: `UndefinedVariableReference` (Pattern uses an undeclared variable)
//! - E007: `NonFixedLengthInEquation` (Equation variable has a length range)
//! - E008: `InvalidWildcardSyntax` (Wildcard pattern could not be compiled)
//! - E009: `InvalidQatStep` (Malformed segment-DSL step)
//! - E010: `ParseIntError` (Integer parsing error)
//! - E011: `NomError` (Low-level nom parser error)
//! - E012: `ClauseParseError` (Parse error in clause (wraps another error))
//!
//! Most of these are *recoverable*: the parser records them as diagnostics and
//! degrades the offending clause to "no match" instead of aborting the query.
//!
//! # Examples
//!
//! ```
//! use lexiq::errors::ParseError;
//!
//! let err = ParseError::ContradictoryBounds { min: 5, max: 3 };
//! assert_eq!(err.code(), "E005");
//! println!("{}", err.display_detailed());
//! ```

use nom::error::{ErrorKind, ParseError as NomParseError};
use std::num::ParseIntError;

/// Custom error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Invalid variable definition \"{clause}\": {reason}")]
    InvalidVariableDefinition { clause: String, reason: String },

    #[error("Invalid variable name '{var}' (must be {range})")]
    InvalidVariableName { var: String, range: &'static str },

    #[error("Invalid length range: \"{input}\"")]
    InvalidLengthRange { input: String },

    #[error("contradictory bounds: min={min}, max={max}")]
    ContradictoryBounds { min: usize, max: usize },

    #[error("Variable '{var}' used in pattern \"{expression}\" but not defined")]
    UndefinedVariableReference { var: char, expression: String },

    #[error("Variable '{var}' in pattern \"{expression}\" must have a fixed length")]
    NonFixedLengthInEquation { var: char, expression: String },

    #[error("Invalid wildcard pattern \"{pattern}\": {reason}")]
    InvalidWildcardSyntax { pattern: String, reason: String },

    #[error("Invalid step \"{step}\": {reason}")]
    InvalidQatStep { step: String, reason: String },

    #[error("int-parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),

    // nom parser error (lowest level)
    #[error("nom parser error: {0:?}")]
    NomError(ErrorKind),

    #[error("Parse error in clause '{clause}': {source}")]
    ClauseParseError {
        clause: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl<'a> NomParseError<&'a str> for Box<ParseError> {
    fn from_error_kind(_input: &'a str, kind: ErrorKind) -> Self {
        Box::new(ParseError::NomError(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl ParseError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::EmptyQuery => "E001",
            ParseError::InvalidVariableDefinition { .. } => "E002",
            ParseError::InvalidVariableName { .. } => "E003",
            ParseError::InvalidLengthRange { .. } => "E004",
            ParseError::ContradictoryBounds { .. } => "E005",
            ParseError::UndefinedVariableReference { .. } => "E006",
            ParseError::NonFixedLengthInEquation { .. } => "E007",
            ParseError::InvalidWildcardSyntax { .. } => "E008",
            ParseError::InvalidQatStep { .. } => "E009",
            ParseError::ParseIntError(_) => "E010",
            ParseError::NomError(_) => "E011",
            ParseError::ClauseParseError { .. } => "E012",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ParseError::EmptyQuery => "Query contains no clauses",
            ParseError::InvalidVariableDefinition { .. } => "Malformed variable definition",
            ParseError::InvalidVariableName { .. } => "Variable letter outside the accepted range",
            ParseError::InvalidLengthRange { .. } => "Invalid length prefix or range",
            ParseError::ContradictoryBounds { .. } => "Minimum length exceeds maximum length",
            ParseError::UndefinedVariableReference { .. } => "Pattern references an undeclared variable",
            ParseError::NonFixedLengthInEquation { .. } => "Equation variable lacks a fixed length",
            ParseError::InvalidWildcardSyntax { .. } => "Wildcard pattern could not be compiled",
            ParseError::InvalidQatStep { .. } => "Malformed segment-DSL step",
            ParseError::ParseIntError(_) => "Integer parsing error",
            ParseError::NomError(_) => "Low-level parser error",
            ParseError::ClauseParseError { .. } => "Parse error in clause",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            ParseError::EmptyQuery => "The query string is empty or contains only ';' separators.",
            ParseError::InvalidVariableDefinition { .. } => "A clause that starts with 'X=' was not of the form X=(N:pattern) or X=(N-M:pattern). The definition is skipped and the rest of the query is still attempted.",
            ParseError::InvalidVariableName { .. } => "The equation DSL accepts variables A-R; the segment DSL accepts A-Z. The definition is skipped.",
            ParseError::InvalidLengthRange { .. } => "A length prefix must be 'N:' with N > 0 or 'N-M:' with 0 < N <= M. An invalid prefix is treated as part of the pattern text.",
            ParseError::ContradictoryBounds { .. } => "A variable definition declared a maximum length below its minimum length.",
            ParseError::UndefinedVariableReference { .. } => "Every variable letter used in a pattern expression must be declared with X=(...) in the same query. The whole expression fails.",
            ParseError::NonFixedLengthInEquation { .. } => "Equation matching requires a fixed total word length, so every variable used in an equation expression must have min == max.",
            ParseError::InvalidWildcardSyntax { .. } => "The wildcard could not be compiled (usually a malformed character class). The pattern matches nothing instead of aborting the query.",
            ParseError::InvalidQatStep { .. } => "Segment-DSL steps look like 'preA..' (prefix, one variable, trailing dots); the final step may list several variables.",
            ParseError::ParseIntError(_) => "A number in the query could not be parsed (it may be too large).",
            ParseError::NomError(_) => "The low-level parser rejected the input.",
            ParseError::ClauseParseError { .. } => "Wraps another parse error with the clause it came from.",
        }
    }

    /// Returns a helpful suggestion or example for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ParseError::EmptyQuery => Some("Example: '5:l@n#f*m', 'A=(4:*);B=(3:*);AB' or '/landform'"),
            ParseError::InvalidVariableDefinition { .. } => Some("Expected format: A=(4:*) or A=(2-5:a*)"),
            ParseError::InvalidVariableName { .. } => Some("Variable names must be single uppercase letters"),
            ParseError::InvalidLengthRange { .. } => Some("Expected format: N:pattern or N-M:pattern where 0 < N <= M (e.g., '5:l*' or '2-4:*')"),
            ParseError::ContradictoryBounds { .. } => Some("The minimum length cannot exceed the maximum length"),
            ParseError::UndefinedVariableReference { .. } => Some("Declare the variable first, e.g. 'A=(4:*);A~A'"),
            ParseError::NonFixedLengthInEquation { .. } => Some("Use a single length such as A=(4:*) instead of A=(3-5:*)"),
            ParseError::InvalidWildcardSyntax { .. } => Some("Check character classes: use '[abc]' or '[!abc]', and escape a literal '[' as '\\['"),
            ParseError::InvalidQatStep { .. } => Some("Example: 'A=(1-3:*);B=(1-3:*);A;B;AB'"),
            _ => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(base_msg: &str, code: &str, help: Option<&str>) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}
