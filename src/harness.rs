//! # Concurrency harness
//!
//! Fan-out / fan-in for short CPU-bound units of work. Every unit (a line of
//! the embeddings file, a token of a document, a word of a vocabulary list) gets
//! its own task on a [`tokio::task::JoinSet`]; the caller awaits the whole set
//! as one barrier and gets the results back **by original position**, never by
//! completion order.
//!
//! ## Failure policy
//! Fail-fast and cancel. The first unit that returns an error (or panics) ends
//! the batch: the remaining tasks are aborted, drained within the grace period,
//! and the cause is returned wrapped in [`SwapError::TaskFailure`] (or
//! [`SwapError::TaskAborted`] for a panic). Nothing partial is handed back.
//!
//! ## Scheduling
//! Units are lightweight tokio tasks on the runtime's worker pool (one worker
//! per core under the multi-threaded runtime), not OS threads, so a batch of
//! tens of thousands of lines costs one small allocation per unit. A unit is
//! synchronous and runs to completion once a worker picks it up.
//!
//! ## Shutdown
//! An abort cancels every unit that has not started yet but cannot interrupt
//! one already running. Draining waits at most
//! [`ConcurrencyHarness::grace_period`] for such stragglers; exceeding it logs
//! a warning and detaches them.
//!
//! ```no_run
//! use synonym_swap::harness::ConcurrencyHarness;
//!
//! # async fn demo() -> synonym_swap::error::Result<()> {
//! let harness = ConcurrencyHarness::default();
//! let squares = harness.run(vec![1, 2, 3], |_, n: i32| Ok(n * n)).await?;
//! assert_eq!(squares, vec![1, 4, 9]);
//! # Ok(()) }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{Result, SwapError};

/// Default time allowed for aborted stragglers to finish.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);

/// Callback invoked with `(completed, total)` as units finish.
pub type ProgressHook = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Task-per-unit dispatcher with an explicit await-all barrier.
#[derive(Debug, Clone)]
pub struct ConcurrencyHarness {
    grace_period: Duration,
}

impl Default for ConcurrencyHarness {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

impl ConcurrencyHarness {
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Run `work` once per unit and return the results in unit order.
    pub async fn run<T, R, F>(&self, units: Vec<T>, work: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(usize, T) -> Result<R> + Send + Sync + 'static,
    {
        self.run_with_progress(units, work, None).await
    }

    /// Like [`run`](Self::run), reporting `(completed, total)` to `progress`
    /// each time a unit finishes successfully.
    ///
    /// # Errors
    /// - [`SwapError::TaskFailure`] wrapping the first error returned by `work`.
    /// - [`SwapError::TaskAborted`] if a unit panicked.
    pub async fn run_with_progress<T, R, F>(
        &self,
        units: Vec<T>,
        work: F,
        progress: Option<ProgressHook>,
    ) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(usize, T) -> Result<R> + Send + Sync + 'static,
    {
        let total = units.len();
        let work = Arc::new(work);
        let mut set = JoinSet::new();

        for (index, unit) in units.into_iter().enumerate() {
            let work = Arc::clone(&work);
            set.spawn(async move { (index, work(index, unit)) });
        }
        debug!("Dispatched {} tasks", total);

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut completed = 0;

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Ok(value))) => {
                    slots[index] = Some(value);
                    completed += 1;
                    if let Some(report) = &progress {
                        report(completed, total);
                    }
                }
                Ok((index, Err(source))) => {
                    self.shutdown(set).await;
                    return Err(SwapError::TaskFailure {
                        index,
                        source: Box::new(source),
                    });
                }
                Err(join_error) => {
                    self.shutdown(set).await;
                    return Err(SwapError::TaskAborted {
                        reason: join_error.to_string(),
                    });
                }
            }
        }

        let missing = slots.iter().filter(|slot| slot.is_none()).count();
        if missing > 0 {
            return Err(SwapError::IncompleteBatch { missing, total });
        }
        Ok(slots.into_iter().flatten().collect())
    }

    /// Abort whatever is still queued and wait (bounded) for running units to stop.
    async fn shutdown<R: 'static>(&self, mut set: JoinSet<R>) {
        if set.is_empty() {
            return;
        }
        set.abort_all();
        let drained = tokio::time::timeout(self.grace_period, async {
            while set.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                "{} tasks did not terminate within {:?}; detaching them",
                set.len(),
                self.grace_period
            );
            set.detach_all();
        }
    }
}
