//! The equation-DSL solver: query text in, matching lexicon words out.
//!
//! # Dispatch
//!
//! | query shape                               | [`QueryKind`]      |
//! |-------------------------------------------|--------------------|
//! | definitions plus at least one expression  | `Equation`         |
//! | one `/letters` expression                 | `Anagram`          |
//! | one other expression                      | `Simple`           |
//! | several expressions, no definitions       | `Intersection`     |
//! | definitions only                          | `DefinitionOnly`   |
//!
//! Equation solving is one pass with no backtracking: the first expression
//! generates candidate words and a [`Bindings`] decomposition for each, and
//! every other expression is only *checked* against that decomposition. A
//! query whose first expression admits several decompositions of the same
//! word only ever tries the left-to-right one.
//!
//! # Error Handling
//!
//! The solver uses [`SolverError`] with four variants:
//!
//! - S001: `ParseFailure` (Query parsing failed (wraps [`ParseError`]))
//! - S002: `NoSteps` (Segment query has no steps to combine)
//! - S003: `Timeout` (Hard deadline passed before the query finished)
//! - S004: `WorkerFailed` (Isolated worker died without a result)
//!
//! Recoverable problems (bad definitions, bad wildcards, bad length prefixes)
//! never fail the query; they are returned in [`SolveResult::diagnostics`].
//!
//! # Examples
//!
//! ```
//! use lexiq::lexicon::Lexicon;
//! use lexiq::solver::{self, SolveOptions, SolveStatus};
//! use lexiq::supervisor::TimeBudget;
//! use lexiq::wildcard::WildcardCompiler;
//!
//! let lexicon = Lexicon::parse_from_str("lax\ntax\nlox\nnoon\n");
//! let compiler = WildcardCompiler::default();
//! let options = SolveOptions::default();
//!
//! let result = solver::solve_query("l.x", &lexicon, &compiler, &options, &TimeBudget::unlimited())?;
//! let words: Vec<_> = result.matches.iter().map(|m| m.primary.as_str()).collect();
//! assert_eq!(words, ["lax", "lox"]);
//! assert_eq!(result.status, SolveStatus::LexiconExhausted);
//! # Ok::<(), lexiq::solver::SolverError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use log::{debug, warn};

use crate::bindings::Bindings;
use crate::errors::ParseError;
use crate::letters::LetterCounts;
use crate::lexicon::Lexicon;
use crate::parser::{
    parse_expression, parse_length_prefix, parse_query, ExpressionKind, PatternStructure, Query, Token,
    VariableDefinition, VariableScope,
};
use crate::scan::{scan_candidates, status_of, ScanOutcome, ScanStop};
use crate::supervisor::TimeBudget;
use crate::wildcard::{Matcher, WildcardCompiler};

/// Default wall-clock limit per query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
/// Candidate count above which a parallel scan is worth its overhead.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 20_000;

/// Tunables for one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Cooperative time limit; `None` disables it.
    pub timeout: Option<Duration>,
    /// Stop after this many matches.
    pub max_results: Option<usize>,
    /// Split large candidate lists across the rayon pool.
    pub parallel: bool,
    pub parallel_threshold: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            max_results: None,
            parallel: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl SolveOptions {
    /// A fresh budget for one query, starting now.
    #[must_use]
    pub fn budget(&self) -> TimeBudget {
        TimeBudget::new(self.timeout)
    }
}

/// Which strategy a query was solved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Simple,
    Anagram,
    Intersection,
    Equation,
    DefinitionOnly,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueryKind::Simple => "simple",
            QueryKind::Anagram => "anagram",
            QueryKind::Intersection => "intersection",
            QueryKind::Equation => "equation",
            QueryKind::DefinitionOnly => "definition_only",
        };
        f.write_str(label)
    }
}

/// Status of the solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// Every candidate was examined.
    LexiconExhausted,

    /// Solver stopped early because `max_results` matches were found.
    FoundEnough,

    /// Solver stopped because the time budget expired. Contains the elapsed time.
    TimedOut { elapsed: Duration },

    /// The query declared variables but had nothing to solve.
    DefinitionOnly,

    /// No lexicon is loaded.
    EmptyLexicon,
}

/// One result record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The lexicon word that matched.
    pub primary: String,
    /// A second lexicon word implied by the same bindings (equation queries only).
    pub companion: Option<String>,
    /// Variable decomposition of `primary`; empty for non-equation queries.
    pub bindings: Bindings,
}

impl Match {
    fn word(primary: &str) -> Self {
        Self { primary: primary.to_string(), companion: None, bindings: Bindings::default() }
    }
}

/// Successful solver run (even if it stopped early).
#[derive(Debug)]
pub struct SolveResult {
    /// Matches in discovery order (sorted for intersections).
    pub matches: Vec<Match>,
    pub status: SolveStatus,
    pub kind: QueryKind,
    /// Recoverable problems met while parsing and compiling.
    pub diagnostics: Vec<ParseError>,
}

impl SolveResult {
    fn empty(kind: QueryKind, status: SolveStatus, diagnostics: Vec<ParseError>) -> Self {
        Self { matches: Vec::new(), status, kind, diagnostics }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Unified error type for both solvers.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// A structural parse error that fails the whole query.
    ///
    /// Boxed to keep the error type size stable.
    #[error("parse failure: {0}")]
    ParseFailure(#[from] Box<ParseError>),

    /// A segment query with no step clauses.
    #[error("no valid steps found")]
    NoSteps,

    /// The hard deadline of an isolated run passed.
    #[error("query timed out after {:.2}s", .elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },

    /// The isolated worker thread died (panicked or could not be spawned).
    #[error("query worker failed: {reason}")]
    WorkerFailed { reason: String },
}

impl From<ParseError> for SolverError {
    fn from(pe: ParseError) -> Self {
        SolverError::ParseFailure(Box::new(pe))
    }
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "S001",
            SolverError::NoSteps => "S002",
            SolverError::Timeout { .. } => "S003",
            SolverError::WorkerFailed { .. } => "S004",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "Query parsing failed",
            SolverError::NoSteps => "Segment query has no steps to combine",
            SolverError::Timeout { .. } => "Hard deadline passed before the query finished",
            SolverError::WorkerFailed { .. } => "Isolated worker died without a result",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "The query had a structural error that fails it as a whole, such as a pattern that references an undeclared variable. This wraps an underlying ParseError (see Parse Errors section for specific error codes).",
            SolverError::NoSteps => "A segment (QAT) query needs at least one step clause such as 'AB'; the last step is the combination.",
            SolverError::Timeout { .. } => "The query ran on an isolated worker and did not finish before the deadline. The worker is told to stop and no partial results are returned. Cooperative timeouts are not errors: they return partial results with a TimedOut status.",
            SolverError::WorkerFailed { .. } => "The isolated worker thread panicked or could not be started. This is usually a bug.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::NoSteps => Some("Example: 'A=(1-3:*);B=(1-3:*);A;B;AB'"),
            SolverError::Timeout { .. } => Some("Narrow the query (add length prefixes or literals) or raise the timeout with -t"),
            SolverError::WorkerFailed { .. } => Some("This is an internal error. Re-run with LEXIQ_DEBUG=1 for details."),
            SolverError::ParseFailure(_) => None, // ParseError has its own help
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::ParseFailure(pe) => {
                // delegate to ParseError's detailed display
                format!("{}\n  caused by: {}", self.code(), pe.display_detailed())
            }
            _ => crate::errors::format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
        }
    }
}

/// Render a match the way the CLI prints it.
///
/// - no bindings: `word`
/// - bindings: `word    (A=.. - B=..)`
/// - bindings and companion: `word / companion    (A=.. - B=..)`
#[must_use]
pub fn format_match(m: &Match) -> String {
    if m.bindings.is_empty() {
        return m.primary.clone();
    }
    match &m.companion {
        Some(companion) => format!("{} / {}    ({})", m.primary, companion, m.bindings),
        None => format!("{}    ({})", m.primary, m.bindings),
    }
}

/// Read-only inputs shared by every strategy.
struct SolveCtx<'a> {
    lexicon: &'a Lexicon,
    compiler: &'a WildcardCompiler,
    options: &'a SolveOptions,
    budget: &'a TimeBudget,
}

/// Parse and solve one equation-DSL query.
///
/// # Errors
/// [`SolverError::ParseFailure`] for structural errors: an empty query, or a
/// pattern that references an undeclared or variable-length variable.
pub fn solve_query(
    query: &str,
    lexicon: &Lexicon,
    compiler: &WildcardCompiler,
    options: &SolveOptions,
    budget: &TimeBudget,
) -> Result<SolveResult, SolverError> {
    let parsed = parse_query(query, VariableScope::Equation)?;
    let kind = classify(&parsed);
    debug!("query {query:?} classified as {kind}");

    let Query { definitions, expressions, mut diagnostics } = parsed;

    if kind != QueryKind::DefinitionOnly && lexicon.is_empty() {
        warn!("no lexicon loaded; query {query:?} has no candidates");
        return Ok(SolveResult::empty(kind, SolveStatus::EmptyLexicon, diagnostics));
    }

    let ctx = SolveCtx { lexicon, compiler, options, budget };
    let (matches, stopped) = match kind {
        QueryKind::DefinitionOnly => {
            return Ok(SolveResult::empty(kind, SolveStatus::DefinitionOnly, diagnostics));
        }
        QueryKind::Equation => solve_equation(&ctx, &definitions, &expressions, &mut diagnostics)?,
        QueryKind::Anagram => words_to_matches(anagram_scan(&ctx, &expressions[0])),
        QueryKind::Simple => words_to_matches(simple_scan(&ctx, &expressions[0], &mut diagnostics)),
        QueryKind::Intersection => intersect(&ctx, &expressions, &mut diagnostics),
    };

    Ok(SolveResult { matches, status: status_of(stopped, budget), kind, diagnostics })
}

fn classify(query: &Query) -> QueryKind {
    if query.is_definition_only() {
        return QueryKind::DefinitionOnly;
    }
    match (query.definitions.is_empty(), query.expressions.as_slice()) {
        (false, _) => QueryKind::Equation,
        (true, [only]) if only.starts_with('/') => QueryKind::Anagram,
        (true, [_]) => QueryKind::Simple,
        (true, _) => QueryKind::Intersection,
    }
}

fn words_to_matches(outcome: ScanOutcome<String>) -> (Vec<Match>, Option<ScanStop>) {
    let matches = outcome.found.iter().map(|w| Match::word(w)).collect();
    (matches, outcome.stopped)
}

// === Simple and anagram scans ===

fn simple_scan(ctx: &SolveCtx<'_>, expression: &str, diagnostics: &mut Vec<ParseError>) -> ScanOutcome<String> {
    let split = parse_length_prefix(expression);
    if let Some(e) = split.diagnostic {
        warn!("ignoring length prefix: {}", e.display_detailed());
        diagnostics.push(e);
    }
    let matcher = ctx.compiler.matcher_or_nothing(split.pattern, diagnostics);
    let check = |word: &str| matcher.is_match(word).then(|| word.to_string());

    match split.bounds {
        Some(bounds) => {
            let candidates: Vec<&String> = ctx.lexicon.words_in_lengths(bounds).collect();
            scan_candidates(&candidates, ctx.options, ctx.budget, check)
        }
        None => scan_candidates(ctx.lexicon.words(), ctx.options, ctx.budget, check),
    }
}

/// Letter requirements of a `/letters` expression.
#[derive(Debug)]
struct AnagramSpec {
    letters: LetterCounts,
    dots: usize,
    has_star: bool,
}

impl AnagramSpec {
    fn parse(expression: &str) -> Self {
        let body = expression.strip_prefix('/').unwrap_or(expression);
        let mut letters = LetterCounts::default();
        let mut dots = 0;
        let mut has_star = false;
        for c in body.chars() {
            match c {
                '.' => dots += 1,
                '*' => has_star = true,
                c if c.is_alphabetic() => letters.add(c),
                _ => {}
            }
        }
        Self { letters, dots, has_star }
    }

    fn min_len(&self) -> usize {
        self.letters.total() + self.dots
    }

    fn accepts(&self, word: &str) -> bool {
        let len = word.chars().count();
        let length_ok = if self.has_star { len >= self.min_len() } else { len == self.min_len() };
        length_ok && self.letters.is_within(&LetterCounts::of(word))
    }
}

fn anagram_scan(ctx: &SolveCtx<'_>, expression: &str) -> ScanOutcome<String> {
    let spec = AnagramSpec::parse(expression);
    let candidates: Vec<&String> = if spec.has_star {
        ctx.lexicon.words_at_least(spec.min_len()).collect()
    } else {
        ctx.lexicon.bucket(spec.min_len()).iter().collect()
    };
    debug!("anagram {expression:?}: {} candidates", candidates.len());

    scan_candidates(&candidates, ctx.options, ctx.budget, |word| spec.accepts(word).then(|| word.to_string()))
}

fn intersect(
    ctx: &SolveCtx<'_>,
    expressions: &[String],
    diagnostics: &mut Vec<ParseError>,
) -> (Vec<Match>, Option<ScanStop>) {
    // each operand is scanned in full; the result limit applies to the intersection
    let unlimited = SolveOptions { max_results: None, ..ctx.options.clone() };
    let operand_ctx = SolveCtx { options: &unlimited, ..*ctx };

    let mut common: Option<BTreeSet<String>> = None;
    for expression in expressions {
        let outcome = if expression.starts_with('/') {
            anagram_scan(&operand_ctx, expression)
        } else {
            simple_scan(&operand_ctx, expression, diagnostics)
        };
        let timed_out = outcome.stopped == Some(ScanStop::TimedOut);
        let current: BTreeSet<String> = outcome.found.into_iter().collect();

        let next = match common.take() {
            None => current,
            Some(prev) => prev.intersection(&current).cloned().collect(),
        };
        let exhausted = next.is_empty();
        common = Some(next);

        if timed_out {
            // a partial operand cannot shrink the set soundly; stop here
            return (collect_limited(common, ctx.options.max_results).0, Some(ScanStop::TimedOut));
        }
        if exhausted {
            break;
        }
    }

    collect_limited(common, ctx.options.max_results)
}

fn collect_limited(words: Option<BTreeSet<String>>, limit: Option<usize>) -> (Vec<Match>, Option<ScanStop>) {
    let mut matches: Vec<Match> = words.unwrap_or_default().iter().map(|w| Match::word(w)).collect();
    match limit {
        Some(n) if matches.len() >= n => {
            matches.truncate(n);
            (matches, Some(ScanStop::FoundEnough))
        }
        _ => (matches, None),
    }
}

// === Equations ===

/// One step of a generator decomposition, resolved ahead of the scan.
enum PlanStep<'a> {
    Lit(char),
    Var { name: char, reversed: bool, len: usize, matcher: &'a Matcher },
}

/// The generator expression compiled into positional steps.
struct DecompositionPlan<'a> {
    steps: Vec<PlanStep<'a>>,
    total_len: usize,
}

impl<'a> DecompositionPlan<'a> {
    fn new(
        generator: &PatternStructure,
        definitions: &BTreeMap<char, VariableDefinition>,
        matchers: &'a BTreeMap<char, Matcher>,
    ) -> Result<Self, ParseError> {
        let steps = generator
            .tokens
            .iter()
            .map(|token| match *token {
                Token::Lit(c) => Ok(PlanStep::Lit(c)),
                Token::Var { name, reversed } => {
                    let undefined =
                        || ParseError::UndefinedVariableReference { var: name, expression: generator.raw.clone() };
                    let len = definitions.get(&name).ok_or_else(undefined)?.min_len;
                    let matcher = matchers.get(&name).ok_or_else(undefined)?;
                    Ok(PlanStep::Var { name, reversed, len, matcher })
                }
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(Self { steps, total_len: generator.total_len })
    }

    /// Left-to-right decomposition of `word`, or `None` if it does not fit.
    ///
    /// A variable that appears more than once must bind the same text each time.
    fn decompose(&self, word: &str) -> Option<Bindings> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() != self.total_len {
            return None;
        }

        let mut bindings = Bindings::default();
        let mut pos = 0;
        for step in &self.steps {
            match *step {
                PlanStep::Lit(c) => {
                    if chars[pos] != c {
                        return None;
                    }
                    pos += 1;
                }
                PlanStep::Var { name, reversed, len, matcher } => {
                    let slice = &chars[pos..pos + len];
                    pos += len;
                    let part: String = if reversed { slice.iter().rev().collect() } else { slice.iter().collect() };

                    if let Some(existing) = bindings.get(name) {
                        // already bound: must match exactly
                        if existing != part {
                            return None;
                        }
                        continue;
                    }
                    if !matcher.is_match(&part) {
                        return None;
                    }
                    bindings.set(name, part);
                }
            }
        }
        Some(bindings)
    }
}

/// True if the letters of every variable in `expression` can be drawn from `word`.
fn letters_available(expression: &PatternStructure, bindings: &Bindings, word: &str) -> bool {
    let mut pool = LetterCounts::of(word);
    expression
        .variables()
        .filter_map(|(name, _)| bindings.get(name))
        .all(|value| value.chars().all(|c| pool.take(c)))
}

fn solve_equation(
    ctx: &SolveCtx<'_>,
    definitions: &BTreeMap<char, VariableDefinition>,
    expressions: &[String],
    diagnostics: &mut Vec<ParseError>,
) -> Result<(Vec<Match>, Option<ScanStop>), SolverError> {
    let structures = expressions
        .iter()
        .map(|e| parse_expression(e, definitions))
        .collect::<Result<Vec<_>, _>>()?;

    let matchers: BTreeMap<char, Matcher> = definitions
        .values()
        .map(|def| (def.name, ctx.compiler.matcher_or_nothing(&def.pattern, diagnostics)))
        .collect();

    let (generator, secondaries) = structures.split_first().ok_or(ParseError::EmptyQuery)?;
    let plan = DecompositionPlan::new(generator, definitions, &matchers)?;
    let mirror_companion = secondaries.is_empty() && generator.kind == ExpressionKind::Reverse;

    debug!(
        "equation generator {:?} ({}, length {}), {} secondary expression(s)",
        generator.raw,
        generator.kind,
        generator.total_len,
        secondaries.len()
    );

    let check = |word: &str| -> Option<Match> {
        let bindings = plan.decompose(word)?;
        let mut companion = None;

        for secondary in secondaries {
            if secondary.kind == ExpressionKind::Anagram {
                if !letters_available(secondary, &bindings, word) {
                    return None;
                }
                continue;
            }
            let rebuilt = secondary.materialize(&bindings)?;
            if !ctx.lexicon.contains(&rebuilt) {
                return None;
            }
            if companion.is_none() {
                companion = Some(rebuilt);
            }
        }

        if mirror_companion {
            companion = generator
                .materialize_mirrored(&bindings)
                .filter(|mirror| mirror != word && ctx.lexicon.contains(mirror));
        }

        Some(Match { primary: word.to_string(), companion, bindings })
    };

    let outcome = scan_candidates(ctx.lexicon.bucket(plan.total_len), ctx.options, ctx.budget, check);
    Ok((outcome.found, outcome.stopped))
}
