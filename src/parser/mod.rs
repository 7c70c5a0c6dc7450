//! Query-text parsing for both DSLs.
//!
//! - [`parse_query`] splits a query into variable definitions and clauses.
//! - [`parse_expression`] turns one equation clause into a [`PatternStructure`].
//! - [`parse_length_prefix`] splits an `N:` / `N-M:` prefix off a pattern.

use nom::IResult;

use crate::errors::ParseError;

pub mod expression;
pub mod length;
pub mod query;
pub mod var_def;

/// Parser result type: input, output, with our custom `ParseError`
pub(crate) type PResult<'a, O> = IResult<&'a str, O, Box<ParseError>>;

// Re-export the public API so call sites can use `crate::parser::...`.
pub use expression::{parse_expression, ExpressionKind, PatternStructure, Token};
pub use length::{parse_length_prefix, LengthPrefix};
pub use query::{parse_query, Query};
pub use var_def::{parse_variable_definition, VariableDefinition, VariableScope};
