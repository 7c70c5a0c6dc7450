//! The segment ("QAT") DSL: combine variable segments cut from lexicon words.
//!
//! ```text
//! A=(1-3:*);B=(1-3:*);A;B;AB
//! ```
//!
//! Definitions use the equation syntax but accept `A`-`Z`. Every other clause
//! is a *step* of the form `prefix VARS dots`:
//!
//! - A non-final step `preA..` says: for lexicon words starting with `pre`,
//!   the text right after `pre` is a candidate segment for `A`, provided the
//!   rest of the word is exactly `A`'s length plus one character per dot.
//! - The final step is the *combination*: `preAB` joins `pre` with a segment of
//!   `A` and a segment of `B` and keeps the join if it is a lexicon word.
//!   Trailing dots on the combination (`AB..`) switch to a positional scan of
//!   the lexicon, since the unknown characters cannot be enumerated.
//!
//! Segment collection walks the sorted lexicon, so when two words yield the
//! same segment the alphabetically last one is the one reported.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};
use nom::{
    bytes::complete::{take_while, take_while1},
    combinator::all_consuming,
    Parser,
};

use crate::bindings::Bindings;
use crate::errors::ParseError;
use crate::letters::LetterClass;
use crate::lexicon::Lexicon;
use crate::parser::{parse_query, PResult, VariableDefinition, VariableScope};
use crate::scan::{scan_candidates, status_of, ScanOutcome, ScanStop};
use crate::solver::{SolveOptions, SolveStatus, SolverError};
use crate::supervisor::{TimeBudget, CHECK_INTERVAL};
use crate::wildcard::WildcardCompiler;

/// Separator between independent queries in one batch.
pub const BATCH_SEPARATOR: &str = " - ";

/// Where a non-final step places its variable inside a lexicon word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SegmentStep {
    prefix: String,
    /// Characters that must follow the segment (one per trailing dot).
    extra: usize,
}

/// The final step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CombinationStep {
    prefix: String,
    order: Vec<char>,
    trailing: usize,
}

impl CombinationStep {
    /// Variables of `order` without repeats, in first-use order.
    fn distinct_variables(&self) -> Vec<char> {
        let mut seen = Vec::with_capacity(self.order.len());
        for &var in &self.order {
            if !seen.contains(&var) {
                seen.push(var);
            }
        }
        seen
    }
}

/// One combined word and where its pieces came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QatMatch {
    /// The lexicon word each segment was cut from, in combination order.
    pub words: Vec<String>,
    /// The combined lexicon word.
    pub combined: String,
    /// Segment bound to each variable.
    pub segments: Bindings,
}

#[derive(Debug)]
pub struct QatResult {
    pub matches: Vec<QatMatch>,
    pub status: SolveStatus,
    /// Recoverable problems met while parsing.
    pub diagnostics: Vec<ParseError>,
}

/// Render a match as `word1 | word2 || combined`.
#[must_use]
pub fn format_qat_match(m: &QatMatch) -> String {
    format!("{} || {}", m.words.join(" | "), m.combined)
}

// "pre", "AB", ".." -- the prefix, the variable run and the trailing dots
fn step_parts(input: &str) -> PResult<'_, (&str, &str, &str)> {
    (
        take_while(|c: char| c.is_literal()),
        take_while1(|c: char| c.is_variable()),
        take_while(|c: char| c == '.'),
    )
        .parse(input)
}

fn parse_step(step: &str) -> Result<(&str, &str, usize), ParseError> {
    all_consuming(step_parts)
        .parse(step)
        .map(|(_, (prefix, vars, dots))| (prefix, vars, dots.len()))
        .map_err(|_| ParseError::InvalidQatStep {
            step: step.to_string(),
            reason: "expected a lowercase prefix, variable letters, then optional dots".to_string(),
        })
}

/// Parsed steps of one segment query.
struct StepPlan {
    segments: HashMap<char, SegmentStep>,
    combination: CombinationStep,
}

fn plan_steps(
    steps: &[String],
    definitions: &BTreeMap<char, VariableDefinition>,
    diagnostics: &mut Vec<ParseError>,
) -> Result<StepPlan, SolverError> {
    // clauses that are not steps at all are dropped before the combination is picked
    let mut valid = Vec::with_capacity(steps.len());
    for step in steps {
        match parse_step(step) {
            Ok(parts) => valid.push((step, parts)),
            Err(e) => {
                warn!("skipping step: {}", e.display_detailed());
                diagnostics.push(e);
            }
        }
    }
    let ((last, (prefix, vars, trailing)), earlier) = valid.split_last().ok_or(SolverError::NoSteps)?;

    let mut segments = HashMap::new();
    for &(step, (prefix, vars, extra)) in earlier {
        let mut letters = vars.chars();
        match (letters.next(), letters.next()) {
            (Some(var), None) => {
                // a later step for the same variable replaces the earlier one
                segments.insert(var, SegmentStep { prefix: prefix.to_string(), extra });
            }
            _ => {
                let e = ParseError::InvalidQatStep {
                    step: step.clone(),
                    reason: "only the final step may name more than one variable".to_string(),
                };
                warn!("skipping step: {}", e.display_detailed());
                diagnostics.push(e);
            }
        }
    }

    if let Some(var) = vars.chars().find(|v| !definitions.contains_key(v)) {
        return Err(ParseError::UndefinedVariableReference { var, expression: last.to_string() }.into());
    }

    let combination =
        CombinationStep { prefix: prefix.to_string(), order: vars.chars().collect(), trailing: *trailing };
    Ok(StepPlan { segments, combination })
}

/// Parse and solve one segment-DSL query.
///
/// # Errors
/// - [`SolverError::ParseFailure`] for an empty query or a combination
///   variable that was never declared.
/// - [`SolverError::NoSteps`] if no clause is a well-formed step.
pub fn solve_qat(
    query: &str,
    lexicon: &Lexicon,
    compiler: &WildcardCompiler,
    options: &SolveOptions,
    budget: &TimeBudget,
) -> Result<QatResult, SolverError> {
    let parsed = parse_query(query, VariableScope::Segment)?;
    let mut diagnostics = parsed.diagnostics;
    let plan = plan_steps(&parsed.expressions, &parsed.definitions, &mut diagnostics)?;
    let combination = &plan.combination;
    debug!(
        "segment query {query:?}: combination {:?} with prefix {:?} and {} trailing",
        combination.order.iter().collect::<String>(),
        combination.prefix,
        combination.trailing
    );

    if lexicon.is_empty() {
        warn!("no lexicon loaded; segment query {query:?} has no candidates");
        return Ok(QatResult { matches: Vec::new(), status: SolveStatus::EmptyLexicon, diagnostics });
    }

    // segment tables for every variable the combination uses
    let mut tables: HashMap<char, BTreeMap<String, String>> = HashMap::new();
    for var in combination.distinct_variables() {
        let Some(def) = parsed.definitions.get(&var) else {
            continue;
        };
        let step = plan.segments.get(&var).cloned().unwrap_or_default();
        let (table, timed_out) = collect_segments(def, &step, lexicon, compiler, options, budget, &mut diagnostics);
        debug!("variable {var}: {} distinct segments", table.len());
        tables.insert(var, table);
        if timed_out {
            return Ok(QatResult { matches: Vec::new(), status: status_of(Some(ScanStop::TimedOut), budget), diagnostics });
        }
    }

    let (matches, stopped) = if combination.trailing == 0 {
        combine_segments(combination, &tables, lexicon, options, budget)
    } else {
        let outcome = scan_positional(combination, &parsed.definitions, &tables, lexicon, options, budget);
        (outcome.found, outcome.stopped)
    };

    Ok(QatResult { matches, status: status_of(stopped, budget), diagnostics })
}

/// Segment text -> the lexicon word it was cut from.
fn collect_segments(
    def: &VariableDefinition,
    step: &SegmentStep,
    lexicon: &Lexicon,
    compiler: &WildcardCompiler,
    options: &SolveOptions,
    budget: &TimeBudget,
    diagnostics: &mut Vec<ParseError>,
) -> (BTreeMap<String, String>, bool) {
    let matcher = compiler.matcher_or_nothing(&def.pattern, diagnostics);
    let lengths = def.lengths();

    // the result limit applies to combinations, not to segment collection
    let unlimited = SolveOptions { max_results: None, ..options.clone() };
    let outcome = scan_candidates(lexicon.words(), &unlimited, budget, |word| {
        let tail = word.strip_prefix(step.prefix.as_str())?;
        let len = tail.chars().count().checked_sub(step.extra)?;
        if !lengths.contains(&len) {
            return None;
        }
        let segment: String = tail.chars().take(len).collect();
        matcher.is_match(&segment).then(|| (segment, word.to_string()))
    });

    let timed_out = outcome.stopped == Some(ScanStop::TimedOut);
    // sorted scan order makes "last write wins" deterministic
    (outcome.found.into_iter().collect(), timed_out)
}

/// Cartesian product of the segment tables, walked lazily as an odometer.
fn combine_segments(
    combination: &CombinationStep,
    tables: &HashMap<char, BTreeMap<String, String>>,
    lexicon: &Lexicon,
    options: &SolveOptions,
    budget: &TimeBudget,
) -> (Vec<QatMatch>, Option<ScanStop>) {
    let distinct = combination.distinct_variables();
    let columns: Vec<Vec<(&String, &String)>> =
        distinct.iter().map(|var| tables.get(var).map(|t| t.iter().collect()).unwrap_or_default()).collect();
    if options.max_results == Some(0) {
        return (Vec::new(), Some(ScanStop::FoundEnough));
    }
    if columns.iter().any(Vec::is_empty) {
        return (Vec::new(), None);
    }

    // position in `distinct` of each variable in combination order
    let slots: Vec<usize> =
        combination.order.iter().filter_map(|var| distinct.iter().position(|d| d == var)).collect();
    let mut dial = vec![0usize; columns.len()];
    let mut matches = Vec::new();
    let mut turns = 0usize;

    loop {
        if turns % CHECK_INTERVAL == 0 && budget.expired() {
            return (matches, Some(ScanStop::TimedOut));
        }
        turns += 1;

        let mut combined = combination.prefix.clone();
        for &slot in &slots {
            combined.push_str(columns[slot][dial[slot]].0);
        }

        if lexicon.contains(&combined) {
            let mut segments = Bindings::default();
            let mut words = Vec::with_capacity(slots.len());
            for (&var, &slot) in combination.order.iter().zip(&slots) {
                let (segment, word) = columns[slot][dial[slot]];
                segments.set(var, segment.as_str());
                words.push(word.clone());
            }
            matches.push(QatMatch { words, combined, segments });
            if options.max_results.is_some_and(|n| matches.len() >= n) {
                return (matches, Some(ScanStop::FoundEnough));
            }
        }

        if !advance(&mut dial, &columns) {
            break;
        }
    }

    debug!("combined {turns} candidate(s)");
    (matches, None)
}

/// Step the odometer, rightmost dial fastest. Returns `false` after the last position.
fn advance<T>(dial: &mut [usize], columns: &[Vec<T>]) -> bool {
    for i in (0..dial.len()).rev() {
        dial[i] += 1;
        if dial[i] < columns[i].len() {
            return true;
        }
        dial[i] = 0;
    }
    false
}

/// Combination with trailing unknowns: cut every candidate word positionally.
fn scan_positional(
    combination: &CombinationStep,
    definitions: &BTreeMap<char, VariableDefinition>,
    tables: &HashMap<char, BTreeMap<String, String>>,
    lexicon: &Lexicon,
    options: &SolveOptions,
    budget: &TimeBudget,
) -> ScanOutcome<QatMatch> {
    let widths: Vec<(char, usize)> = combination
        .order
        .iter()
        .filter_map(|var| definitions.get(var).map(|def| (*var, def.min_len)))
        .collect();
    let total = widths
        .iter()
        .try_fold(combination.prefix.chars().count(), |acc, &(_, w)| acc.checked_add(w))
        .and_then(|len| len.checked_add(combination.trailing));
    let Some(total) = total else {
        debug!("positional scan length overflows; no word can match");
        return ScanOutcome { found: Vec::new(), stopped: None };
    };
    debug!("positional scan over words of length {total}");

    scan_candidates(lexicon.bucket(total), options, budget, |word| {
        let tail: Vec<char> = word.strip_prefix(combination.prefix.as_str())?.chars().collect();
        let mut segments = Bindings::default();
        let mut words = Vec::with_capacity(widths.len());
        let mut pos = 0;

        for &(var, width) in &widths {
            let segment: String = tail.get(pos..pos + width)?.iter().collect();
            pos += width;
            if segments.get(var).is_some_and(|bound| bound != segment) {
                return None;
            }
            words.push(tables.get(&var)?.get(&segment)?.clone());
            segments.set(var, segment);
        }

        Some(QatMatch { words, combined: word.to_string(), segments })
    })
}

/// Solve several segment queries separated by [`BATCH_SEPARATOR`], each with its own budget.
///
/// Empty queries are skipped; each entry pairs the trimmed query with its outcome.
pub fn solve_qat_batch(
    input: &str,
    lexicon: &Lexicon,
    compiler: &WildcardCompiler,
    options: &SolveOptions,
) -> Vec<(String, Result<QatResult, SolverError>)> {
    input
        .split(BATCH_SEPARATOR)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|query| {
            let outcome = solve_qat(query, lexicon, compiler, options, &options.budget());
            match &outcome {
                Ok(result) => info!("segment query {query:?}: {} match(es)", result.matches.len()),
                Err(e) => info!("segment query {query:?} failed: {e}"),
            }
            (query.to_string(), outcome)
        })
        .collect()
}
