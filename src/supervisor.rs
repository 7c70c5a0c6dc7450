//! Timeouts and cancellation.
//!
//! Two disciplines are supported:
//!
//! - **Cooperative deadline**: every scan loop holds a [`TimeBudget`] and checks
//!   [`TimeBudget::expired`] every [`CHECK_INTERVAL`] candidates. On expiry the
//!   loop returns early and the caller reports `TimedOut` with whatever results
//!   were already accumulated.
//! - **Hard deadline via isolation**: [`run_with_deadline`] runs a job on its own
//!   thread and stops waiting once the deadline passes. The job receives a
//!   [`CancelToken`]; the supervisor cancels it on expiry, so a job that builds
//!   its budget from that token winds down at its next check instead of running
//!   on unseen.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use instant::Instant;

use crate::solver::SolverError;

/// How many candidates a scan loop processes between budget checks.
pub const CHECK_INTERVAL: usize = 256;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Wall-clock time limit plus a cancellation flag.
///
/// ```
/// use std::time::Duration;
/// use lexiq::supervisor::TimeBudget;
///
/// let budget = TimeBudget::new(Some(Duration::from_secs(30)));
/// assert!(!budget.expired());
/// ```
#[derive(Debug, Clone)]
pub struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
    cancel: CancelToken,
}

impl TimeBudget {
    /// A budget starting now; `None` means no time limit.
    #[must_use]
    pub fn new(limit: Option<Duration>) -> Self {
        Self::with_cancel(limit, CancelToken::new())
    }

    #[must_use]
    pub fn with_cancel(limit: Option<Duration>, cancel: CancelToken) -> Self {
        Self { start: Instant::now(), limit, cancel }
    }

    /// A budget that never expires unless cancelled.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// How long this budget has been running.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// True once the limit has elapsed or the token was cancelled.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.cancel.is_cancelled() || self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    #[cfg(test)]
    pub(crate) fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

/// Early-return from a scan function once the budget has run out.
macro_rules! timed_stop {
    ($budget:expr, $ret_expr:expr) => {
        if $budget.expired() {
            return $ret_expr;
        }
    };
}
pub(crate) use timed_stop;

/// Run `job` on an isolated thread and wait at most `limit` for its result.
///
/// On expiry the job's [`CancelToken`] is cancelled and
/// [`SolverError::Timeout`] is returned; the thread is detached rather than
/// joined. A job that panics yields [`SolverError::WorkerFailed`].
///
/// # Errors
/// `Timeout` if the deadline passes, `WorkerFailed` if the thread dies.
pub fn run_with_deadline<T, F>(limit: Duration, job: F) -> Result<T, SolverError>
where
    T: Send + 'static,
    F: FnOnce(CancelToken) -> T + Send + 'static,
{
    let token = CancelToken::new();
    let job_token = token.clone();
    let (tx, rx) = mpsc::channel();
    let start = Instant::now();

    thread::Builder::new()
        .name("lexiq-query".to_string())
        .spawn(move || {
            // the receiver may be gone after a timeout; nothing to do then
            let _ = tx.send(job(job_token));
        })
        .map_err(|e| SolverError::WorkerFailed { reason: e.to_string() })?;

    match rx.recv_timeout(limit) {
        Ok(value) => Ok(value),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            token.cancel();
            log::info!("query exceeded hard deadline of {:.1}s; cancelled worker", limit.as_secs_f64());
            Err(SolverError::Timeout { elapsed: start.elapsed() })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolverError::WorkerFailed {
            reason: "worker thread terminated without a result".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_expires() {
        let budget = TimeBudget::new(Some(Duration::ZERO));
        assert!(budget.expired());

        let unlimited = TimeBudget::unlimited();
        assert!(!unlimited.expired());
    }

    #[test]
    fn test_cancel_token_expires_budget() {
        let token = CancelToken::new();
        let budget = TimeBudget::with_cancel(None, token.clone());
        assert!(!budget.expired());
        token.cancel();
        assert!(budget.expired());
        assert!(budget.cancel_token().is_cancelled());
    }

    #[test]
    fn test_timed_stop_returns_value() {
        fn scan(budget: &TimeBudget) -> usize {
            for i in 0..10 {
                timed_stop!(budget, i);
            }
            10
        }
        assert_eq!(scan(&TimeBudget::new(Some(Duration::ZERO))), 0);
        assert_eq!(scan(&TimeBudget::unlimited()), 10);
    }

    #[test]
    fn test_run_with_deadline_returns_result() {
        let value = run_with_deadline(Duration::from_secs(5), |_token| 6 * 7).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_run_with_deadline_times_out_and_cancels() {
        let (seen_tx, seen_rx) = mpsc::channel();
        let result = run_with_deadline(Duration::from_millis(20), move |token| {
            let budget = TimeBudget::with_cancel(None, token);
            while !budget.expired() {
                thread::sleep(Duration::from_millis(1));
            }
            let _ = seen_tx.send(());
        });
        assert!(matches!(result, Err(SolverError::Timeout { .. })));
        // the worker observes the cancellation and exits on its own
        assert!(seen_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_run_with_deadline_reports_panics() {
        let result: Result<(), _> = run_with_deadline(Duration::from_secs(5), |_token| panic!("boom"));
        assert!(matches!(result, Err(SolverError::WorkerFailed { .. })));
    }
}
