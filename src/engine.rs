//! The long-lived query engine: an injected lexicon plus a shared pattern cache.
//!
//! The engine is cheap to clone and safe to share across threads. Reloading
//! swaps in a new lexicon wholesale; queries already running keep the one they
//! started with.

use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::lexicon::Lexicon;
use crate::qat::{self, QatResult};
use crate::solver::{self, SolveOptions, SolveResult, SolverError};
use crate::supervisor::{run_with_deadline, TimeBudget};
use crate::wildcard::WildcardCompiler;

#[derive(Debug, Clone, Default)]
pub struct Engine {
    lexicon: Arc<Lexicon>,
    compiler: Arc<WildcardCompiler>,
    options: SolveOptions,
}

impl Engine {
    #[must_use]
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon: Arc::new(lexicon), ..Self::default() }
    }

    #[must_use]
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Build an engine from a wordlist file.
    ///
    /// # Errors
    /// Returns the IO error if the file cannot be read.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(Lexicon::load_from_path(path)?))
    }

    /// Replace the lexicon with the contents of `path`, returning the new word count.
    ///
    /// The file is read in full before anything is swapped. On failure the
    /// engine is left with an empty lexicon rather than the previous one.
    ///
    /// # Errors
    /// Returns the IO error if the file cannot be read.
    pub fn reload_from_path<P: AsRef<Path>>(&mut self, path: P) -> io::Result<usize> {
        match Lexicon::load_from_path(path) {
            Ok(lexicon) => {
                let count = lexicon.len();
                info!("reloaded lexicon: {count} words across {} lengths", lexicon.lengths().count());
                self.replace_lexicon(lexicon);
                Ok(count)
            }
            Err(e) => {
                self.replace_lexicon(Lexicon::default());
                Err(e)
            }
        }
    }

    pub fn replace_lexicon(&mut self, lexicon: Lexicon) {
        self.lexicon = Arc::new(lexicon);
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    #[must_use]
    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Solve an equation-DSL query under the cooperative time budget.
    ///
    /// # Errors
    /// See [`solver::solve_query`].
    pub fn solve(&self, query: &str) -> Result<SolveResult, SolverError> {
        let result = solver::solve_query(query, &self.lexicon, &self.compiler, &self.options, &self.options.budget());
        debug!("{} patterns cached", self.compiler.cached_len());
        result
    }

    /// Solve a segment-DSL query under the cooperative time budget.
    ///
    /// # Errors
    /// See [`qat::solve_qat`].
    pub fn solve_qat(&self, query: &str) -> Result<QatResult, SolverError> {
        qat::solve_qat(query, &self.lexicon, &self.compiler, &self.options, &self.options.budget())
    }

    /// Solve several ` - `-separated segment queries, each with its own budget.
    #[must_use]
    pub fn solve_qat_batch(&self, input: &str) -> Vec<(String, Result<QatResult, SolverError>)> {
        qat::solve_qat_batch(input, &self.lexicon, &self.compiler, &self.options)
    }

    /// Like [`Engine::solve`], but on an isolated worker with a hard deadline.
    ///
    /// On expiry the worker is cancelled and [`SolverError::Timeout`] is
    /// returned with no partial results. Without a configured timeout this is
    /// the same as [`Engine::solve`].
    ///
    /// # Errors
    /// See [`solver::solve_query`], plus `Timeout` and `WorkerFailed`.
    pub fn solve_isolated(&self, query: &str) -> Result<SolveResult, SolverError> {
        let Some(limit) = self.options.timeout else {
            return self.solve(query);
        };
        let engine = self.clone();
        let query = query.to_string();
        debug!("solving {query:?} on an isolated worker ({:.1}s deadline)", limit.as_secs_f64());

        run_with_deadline(limit, move |token| {
            // the supervisor's deadline governs; the token stops the scan when it fires
            let budget = TimeBudget::with_cancel(None, token);
            solver::solve_query(&query, &engine.lexicon, &engine.compiler, &engine.options, &budget)
        })?
    }

    /// Like [`Engine::solve_qat`], but on an isolated worker with a hard deadline.
    ///
    /// # Errors
    /// See [`qat::solve_qat`], plus `Timeout` and `WorkerFailed`.
    pub fn solve_qat_isolated(&self, query: &str) -> Result<QatResult, SolverError> {
        let Some(limit) = self.options.timeout else {
            return self.solve_qat(query);
        };
        let engine = self.clone();
        let query = query.to_string();
        debug!("solving segment query {query:?} on an isolated worker ({:.1}s deadline)", limit.as_secs_f64());

        run_with_deadline(limit, move |token| {
            let budget = TimeBudget::with_cancel(None, token);
            qat::solve_qat(&query, &engine.lexicon, &engine.compiler, &engine.options, &budget)
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolveStatus;
    use std::time::Duration;

    fn engine(words: &str) -> Engine {
        Engine::new(Lexicon::parse_from_str(words))
    }

    #[test]
    fn test_solve_and_solve_qat() {
        let e = engine("cat\nat\nc\nact");
        let result = e.solve("/tac").unwrap();
        assert_eq!(result.len(), 2);

        let qat = e.solve_qat("A=(1:*);B=(2:*);AB").unwrap();
        assert_eq!(qat.matches.len(), 1);
        assert_eq!(qat.matches[0].combined, "cat");
    }

    #[test]
    fn test_idempotent() {
        let e = engine("noon\nnoonnoon\nabba\nabbaabba\ncat");
        let first = e.solve("A=(4:*);A~A").unwrap().matches;
        let second = e.solve("A=(4:*);A~A").unwrap().matches;
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_clones_share_pattern_cache() {
        let e = engine("cat\ncot\ndog");
        let clone = e.clone();
        assert_eq!(clone.solve("c.t").unwrap().len(), 2);
        assert_eq!(e.compiler.cached_len(), 1);
        assert_eq!(e.solve("c.t").unwrap().len(), 2);
        assert_eq!(clone.compiler.cached_len(), 1);
    }

    #[test]
    fn test_reload_failure_leaves_empty_lexicon() {
        let mut e = engine("cat\ndog");
        assert_eq!(e.lexicon().len(), 2);
        assert!(e.reload_from_path("/no/such/lexicon.txt").is_err());
        assert!(e.lexicon().is_empty());
        assert_eq!(e.solve("c*").unwrap().status, SolveStatus::EmptyLexicon);
    }

    #[test]
    fn test_clones_share_nothing_mutable() {
        let mut e = engine("cat");
        let snapshot = e.clone();
        e.replace_lexicon(Lexicon::parse_from_str("dog\ndig"));
        assert_eq!(snapshot.lexicon().words(), ["cat"]);
        assert_eq!(e.lexicon().len(), 2);
    }

    #[test]
    fn test_isolated_matches_direct() {
        let e = engine("cat\nat\nc").with_options(SolveOptions {
            timeout: Some(Duration::from_secs(10)),
            ..SolveOptions::default()
        });
        let direct = e.solve("c*").unwrap().matches;
        let isolated = e.solve_isolated("c*").unwrap().matches;
        assert_eq!(direct, isolated);

        let qat = e.solve_qat_isolated("A=(1:*);B=(2:*);AB").unwrap();
        assert_eq!(qat.matches.len(), 1);
    }

    #[test]
    fn test_isolated_without_timeout_runs_inline() {
        let e = engine("cat").with_options(SolveOptions { timeout: None, ..SolveOptions::default() });
        assert_eq!(e.solve_isolated("cat").unwrap().len(), 1);
    }
}
