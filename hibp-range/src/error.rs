#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid range prefix {prefix:?}: expected 5 hex characters")]
    InvalidPrefix { prefix: String },

    #[error("range lookup for prefix {prefix} failed with HTTP {status}")]
    LookupFailed { prefix: String, status: u16 },

    #[error("HTTP request failed for prefix {prefix}: {source}")]
    Transport {
        prefix: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed range response at line {line}: {reason}")]
    MalformedResponse { line: usize, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("batch cancelled")]
    Cancelled,
}

impl Error {
    /// Whether retrying the same lookup could plausibly succeed.
    ///
    /// Network failures, throttling and server-side errors are transient. A
    /// malformed prefix or response, or a 4xx other than 429, is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::LookupFailed { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
