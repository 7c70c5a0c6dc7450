use std::collections::BTreeMap;

use log::warn;

use super::var_def::{looks_like_definition, parse_variable_definition, VariableDefinition, VariableScope};
use crate::errors::ParseError;

/// A query split into its definitions and its remaining clauses.
#[derive(Debug, Default)]
pub struct Query {
    /// Declared variables by name. A later definition of the same name wins.
    pub definitions: BTreeMap<char, VariableDefinition>,
    /// Non-definition clauses, in query order: pattern expressions for the
    /// equation DSL, steps for the segment DSL.
    pub expressions: Vec<String>,
    /// Recoverable problems (skipped definitions).
    pub diagnostics: Vec<ParseError>,
}

impl Query {
    #[must_use]
    pub fn is_definition_only(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// Split `query` on `;` and sort its clauses into definitions and expressions.
///
/// Clauses are trimmed and empty ones dropped. A clause that starts with an
/// uppercase letter followed by `=` is a definition attempt; an invalid one is
/// logged, recorded in [`Query::diagnostics`] and skipped.
///
/// # Errors
/// [`ParseError::EmptyQuery`] if no clause remains.
///
/// ```
/// use lexiq::parser::{parse_query, VariableScope};
///
/// let q = parse_query("A=(4:*); A~A", VariableScope::Equation)?;
/// assert_eq!(q.definitions.len(), 1);
/// assert_eq!(q.expressions, ["A~A"]);
/// # Ok::<(), lexiq::errors::ParseError>(())
/// ```
pub fn parse_query(query: &str, scope: VariableScope) -> Result<Query, ParseError> {
    let clauses: Vec<&str> = query.split(';').map(str::trim).filter(|c| !c.is_empty()).collect();
    if clauses.is_empty() {
        return Err(ParseError::EmptyQuery);
    }

    let mut parsed = Query::default();
    for clause in clauses {
        if looks_like_definition(clause) {
            match parse_variable_definition(clause, scope) {
                Ok(def) => {
                    parsed.definitions.insert(def.name, def);
                }
                Err(e) => {
                    warn!("skipping definition: {}", e.display_detailed());
                    parsed.diagnostics.push(e);
                }
            }
        } else {
            parsed.expressions.push(clause.to_string());
        }
    }

    Ok(parsed)
}
