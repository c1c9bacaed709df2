use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{StreamExt, stream};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::checker::{BreachChecker, Exposure};
use crate::error::Error;

/// Default number of lookups in flight during a batch
pub const DEFAULT_CONCURRENCY: usize = 8;

/// What a batch does when one credential cannot be checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the error against that credential and keep going.
    #[default]
    Isolate,
    /// Stop at the first error and return what has completed so far.
    Abort,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum lookups in flight. 1 runs strictly one after another.
    pub concurrency: usize,
    pub policy: FailurePolicy,
    /// Stops outstanding lookups when cancelled.
    pub cancel: Option<CancellationToken>,
    /// Incremented once per finished credential.
    pub progress: Option<Arc<AtomicU64>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            policy: FailurePolicy::default(),
            cancel: None,
            progress: None,
        }
    }
}

/// One credential and what became of it. An `Err` outcome means its exposure
/// is unknown, not that it is safe.
#[derive(Debug)]
pub struct BatchEntry {
    pub credential: Vec<u8>,
    pub outcome: Result<Exposure, Error>,
}

impl BatchEntry {
    pub fn is_unknown(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Per-credential results in input order.
///
/// When `aborted` is set, `entries` holds only the credentials that finished
/// before the batch stopped, still in input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
    pub aborted: Option<Error>,
}

impl BatchResult {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    pub fn unknown_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_unknown()).count()
    }

    pub fn exposed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Ok(Exposure::Found(_))))
            .count()
    }
}

impl BreachChecker {
    /// Checks every credential, keeping one entry per input in input order
    /// (duplicates included).
    ///
    /// Up to `options.concurrency` lookups run at once. Each outcome is written
    /// into the slot of its input position, so completion order never leaks
    /// into the result.
    pub async fn evaluate_all<I>(&self, credentials: I, options: &BatchOptions) -> BatchResult
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        let credentials: Vec<Vec<u8>> = credentials.into_iter().map(Into::into).collect();
        let mut slots: Vec<Option<Result<Exposure, Error>>> =
            std::iter::repeat_with(|| None).take(credentials.len()).collect();
        let cancel = options.cancel.clone().unwrap_or_else(CancellationToken::new);
        let mut aborted = None;

        {
            let mut pending = pin!(
                stream::iter(credentials.iter().enumerate())
                    .map(|(index, credential)| async move {
                        (index, self.evaluate(credential).await)
                    })
                    .buffer_unordered(options.concurrency.max(1))
            );

            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        aborted = Some(Error::Cancelled);
                        break;
                    }
                    next = pending.next() => next,
                };
                let Some((index, outcome)) = next else {
                    break;
                };

                if let Some(progress) = &options.progress {
                    progress.fetch_add(1, Ordering::Relaxed);
                }

                match outcome {
                    Err(e) if options.policy == FailurePolicy::Abort => {
                        warn!(index, error = %e, "aborting batch");
                        aborted = Some(e);
                        break;
                    }
                    Err(e) => {
                        warn!(index, error = %e, "credential could not be checked");
                        slots[index] = Some(Err(e));
                    }
                    Ok(exposure) => slots[index] = Some(Ok(exposure)),
                }
            }
        }

        let entries = credentials
            .into_iter()
            .zip(slots)
            .filter_map(|(credential, outcome)| {
                outcome.map(|outcome| BatchEntry { credential, outcome })
            })
            .collect();

        BatchResult { entries, aborted }
    }
}
