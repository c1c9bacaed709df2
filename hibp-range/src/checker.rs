use serde::Serialize;
use tracing::debug;

use crate::client::RangeClient;
use crate::conversion::split;
use crate::error::Error;
use crate::retry::RetryPolicy;

/// Outcome of checking one credential against the range API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "count", rename_all = "snake_case")]
pub enum Exposure {
    NotFound,
    /// Number of times the full digest appears in the breach corpus (always >= 1).
    Found(u64),
}

impl Exposure {
    pub fn is_exposed(&self) -> bool {
        matches!(self, Exposure::Found(_))
    }

    pub fn count(&self) -> u64 {
        match self {
            Exposure::NotFound => 0,
            Exposure::Found(count) => *count,
        }
    }
}

/// Checks credentials against the range API using the k-anonymity split.
///
/// Only the 5-character digest prefix leaves the process; the suffix is matched
/// locally against the returned candidates.
#[derive(Debug, Clone)]
pub struct BreachChecker {
    client: RangeClient,
    retry: RetryPolicy,
}

impl BreachChecker {
    pub fn new(client: RangeClient) -> Self {
        Self { client, retry: RetryPolicy::none() }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &RangeClient {
        &self.client
    }

    /// Checks a single credential.
    ///
    /// Returns `Found(count)` for the first candidate whose suffix matches
    /// (ignoring case) and `NotFound` otherwise. A matching zero-count entry is a
    /// padding entry and counts as `NotFound`. Lookup errors are returned as-is,
    /// never folded into `NotFound`.
    pub async fn evaluate(&self, credential: impl AsRef<[u8]>) -> Result<Exposure, Error> {
        let (prefix, suffix) = split(credential.as_ref());

        let candidates = self.retry.run(|| self.client.fetch_range(&prefix)).await?;

        let exposure = match candidates.find(&suffix) {
            Some(0) | None => Exposure::NotFound,
            Some(count) => Exposure::Found(count),
        };
        debug!(%prefix, exposed = exposure.is_exposed(), "credential checked");

        Ok(exposure)
    }
}
