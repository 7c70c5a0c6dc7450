//! Generate error code documentation from the error enums themselves.
//!
//! Codes, descriptions, details and help text come straight from the `code()`,
//! `description()`, `details()` and `help()` methods of `ParseError` and
//! `SolverError`, so the reference cannot drift from the code.
//!
//! Run with:
//! ```bash
//! cargo run --bin generate_error_docs > docs/ERROR_CODES.md
//! ```

use std::time::Duration;

use lexiq::errors::ParseError;
use lexiq::solver::SolverError;

/// Print one documentation section per error value.
macro_rules! generate_error_docs {
    ($errors:expr) => {
        for error in $errors {
            println!("### {}: {}\n", error.code(), error.description());
            println!("**Details:** {}\n", error.details());

            if let Some(help_text) = error.help() {
                println!("**How to fix:**");
                println!("```");
                println!("{help_text}");
                println!("```\n");
            }

            println!("**Example error message:**");
            println!("```");
            println!("{error}");
            println!("```\n");

            println!("**Detailed format:**");
            println!("```");
            println!("{}", error.display_detailed());
            println!("```\n");

            println!("---\n");
        }
    };
}

/// One sample value of every `ParseError` variant, in code order.
fn all_parse_error_variants() -> Vec<ParseError> {
    let bad_int = "99999999999999999999999".parse::<usize>().map_err(ParseError::from);
    let mut errors = vec![
        ParseError::EmptyQuery,
        ParseError::InvalidVariableDefinition {
            clause: "A=3:*".to_string(),
            reason: "expected X=(N[-M]:pattern)".to_string(),
        },
        ParseError::InvalidVariableName { var: "Z".to_string(), range: "A-R" },
        ParseError::InvalidLengthRange { input: "0:".to_string() },
        ParseError::ContradictoryBounds { min: 5, max: 3 },
        ParseError::UndefinedVariableReference { var: 'B', expression: "AB".to_string() },
        ParseError::NonFixedLengthInEquation { var: 'A', expression: "AA".to_string() },
        ParseError::InvalidWildcardSyntax {
            pattern: "[]".to_string(),
            reason: "empty character class".to_string(),
        },
        ParseError::InvalidQatStep { step: "aBc".to_string(), reason: "unexpected text after the variables".to_string() },
    ];
    if let Err(e) = bad_int {
        errors.push(e);
    }
    errors.push(ParseError::NomError(nom::error::ErrorKind::Digit));
    errors.push(ParseError::ClauseParseError {
        clause: "A=(5-3:*)".to_string(),
        source: Box::new(ParseError::ContradictoryBounds { min: 5, max: 3 }),
    });
    errors
}

/// One sample value of every `SolverError` variant, in code order.
fn all_solver_error_variants() -> Vec<SolverError> {
    vec![
        SolverError::ParseFailure(Box::new(ParseError::EmptyQuery)),
        SolverError::NoSteps,
        SolverError::Timeout { elapsed: Duration::from_secs(30) },
        SolverError::WorkerFailed { reason: "worker thread terminated without a result".to_string() },
    ]
}

fn main() {
    println!("# Error Code Reference\n");
    println!("**⚠️ This document is auto-generated from the source code. Do not edit manually.**\n");

    println!("## Table of Contents\n");
    println!("- [Solver Errors (S001–S004)](#solver-errors)");
    println!("- [Parse Errors (E001–E012)](#parse-errors)");
    println!("- [How to Use Error Codes](#how-to-use-error-codes)\n");

    generate_solver_error_docs();
    generate_parse_error_docs();

    println!("\n## How to Use Error Codes\n");
    println!("When you see an error like:\n");
    println!("```");
    println!("Error: Empty query (E001)");
    println!("Example: 'l@n#*' or 'A=(3:*);AA'");
    println!("```\n");
    println!("1. Note the error code (e.g., `E001`)");
    println!("2. Look it up in this document for a detailed explanation");
    println!("3. Follow the suggested fix\n");

    println!("## Recoverable Errors\n");
    println!("Most parse errors do not fail the query. They are reported as warnings and the");
    println!("offending clause matches nothing; the rest of the query still runs.\n");
}

fn generate_solver_error_docs() {
    println!("## Solver Errors\n");
    println!("Top-level errors. These wrap a structural parse error or report a failed run.\n");
    generate_error_docs!(all_solver_error_variants());
}

fn generate_parse_error_docs() {
    println!("## Parse Errors\n");
    println!("Errors met while parsing queries, variable definitions, length prefixes and wildcard patterns.\n");
    generate_error_docs!(all_parse_error_variants());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_documented_once() {
        let parse_codes: Vec<&str> = all_parse_error_variants().iter().map(ParseError::code).collect();
        let expected: Vec<String> = (1..=12).map(|n| format!("E{n:03}")).collect();
        assert_eq!(parse_codes, expected);

        let solver_codes: Vec<&str> = all_solver_error_variants().iter().map(SolverError::code).collect();
        assert_eq!(solver_codes, ["S001", "S002", "S003", "S004"]);
    }
}
