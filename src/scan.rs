//! Candidate scanning, sequential or split across a rayon pool.
//!
//! Every solver strategy that walks a list of lexicon words goes through
//! [`scan_candidates`]: it applies a per-word check, stops at the result limit
//! and checks the shared [`TimeBudget`] every [`CHECK_INTERVAL`] candidates.

use rayon::prelude::*;

use crate::solver::{SolveOptions, SolveStatus};
use crate::supervisor::{timed_stop, TimeBudget, CHECK_INTERVAL};

/// Why a scan ended before exhausting its candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanStop {
    TimedOut,
    FoundEnough,
}

#[derive(Debug)]
pub(crate) struct ScanOutcome<T> {
    pub(crate) found: Vec<T>,
    pub(crate) stopped: Option<ScanStop>,
}

impl<T> ScanOutcome<T> {
    fn stopped(found: Vec<T>, reason: ScanStop) -> Self {
        Self { found, stopped: Some(reason) }
    }
}

/// Map how a scan ended onto the status reported to the caller.
pub(crate) fn status_of(stopped: Option<ScanStop>, budget: &TimeBudget) -> SolveStatus {
    match stopped {
        None => SolveStatus::LexiconExhausted,
        Some(ScanStop::FoundEnough) => SolveStatus::FoundEnough,
        Some(ScanStop::TimedOut) => {
            let elapsed = budget.elapsed();
            log::info!("query timed out after {:.2}s; returning partial results", elapsed.as_secs_f64());
            SolveStatus::TimedOut { elapsed }
        }
    }
}

/// Run `check` over `candidates`, collecting every `Some`.
///
/// With `options.parallel` set and more than `options.parallel_threshold`
/// candidates, contiguous chunks are checked on the rayon pool and merged back
/// in chunk order, so the output order matches the sequential scan.
pub(crate) fn scan_candidates<S, T, F>(
    candidates: &[S],
    options: &SolveOptions,
    budget: &TimeBudget,
    check: F,
) -> ScanOutcome<T>
where
    S: AsRef<str> + Sync,
    T: Send,
    F: Fn(&str) -> Option<T> + Sync,
{
    let limit = options.max_results;
    if limit == Some(0) {
        return ScanOutcome::stopped(Vec::new(), ScanStop::FoundEnough);
    }

    if !options.parallel || candidates.len() <= options.parallel_threshold {
        return scan_chunk(candidates, limit, budget, &check);
    }

    let chunk_size = (candidates.len() / (rayon::current_num_threads() * 4)).max(CHECK_INTERVAL);
    log::debug!("parallel scan: {} candidates in chunks of {chunk_size}", candidates.len());

    let chunks: Vec<ScanOutcome<T>> = candidates
        .par_chunks(chunk_size)
        .map(|chunk| scan_chunk(chunk, limit, budget, &check))
        .collect();

    let timed_out = chunks.iter().any(|c| c.stopped == Some(ScanStop::TimedOut));
    let mut found: Vec<T> = chunks.into_iter().flat_map(|c| c.found).collect();

    if let Some(n) = limit
        && found.len() >= n
    {
        found.truncate(n);
        return ScanOutcome::stopped(found, ScanStop::FoundEnough);
    }
    if timed_out {
        return ScanOutcome::stopped(found, ScanStop::TimedOut);
    }
    ScanOutcome { found, stopped: None }
}

fn scan_chunk<S, T, F>(chunk: &[S], limit: Option<usize>, budget: &TimeBudget, check: &F) -> ScanOutcome<T>
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<T>,
{
    let mut found = Vec::new();
    for (i, candidate) in chunk.iter().enumerate() {
        if i % CHECK_INTERVAL == 0 {
            timed_stop!(budget, ScanOutcome::stopped(found, ScanStop::TimedOut));
        }
        if let Some(item) = check(candidate.as_ref()) {
            found.push(item);
            if limit.is_some_and(|n| found.len() >= n) {
                return ScanOutcome::stopped(found, ScanStop::FoundEnough);
            }
        }
    }
    ScanOutcome { found, stopped: None }
}
