use std::time::Duration;

use tracing::debug;

use crate::candidate::CandidateSet;
use crate::conversion::Prefix;
use crate::error::Error;

/// Default base URL for the Pwned Passwords range API.
pub const DEFAULT_BASE_URL: &str = "https://api.pwnedpasswords.com";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the HTTP side of the range lookup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing `/range`.
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Ask the service to pad responses with zero-count entries so the
    /// response size doesn't hint at the prefix.
    pub add_padding: bool,
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("hibp-range/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
            add_padding: false,
            pool_max_idle_per_host: 16,
        }
    }
}

/// Queries the range API for every known suffix sharing a prefix.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RangeClient {
    http: reqwest::Client,
    base_url: String,
    add_padding: bool,
}

impl RangeClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(Error::Client)?;

        Ok(Self::with_http_client(http, &config.base_url, config.add_padding))
    }

    /// Build on top of an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: &str, add_padding: bool) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string(), add_padding }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up all candidates for `prefix`.
    ///
    /// The prefix is validated before anything is sent. Exactly one request is
    /// made; there are no retries at this level.
    pub async fn lookup(&self, prefix: &str) -> Result<CandidateSet, Error> {
        let prefix = Prefix::parse(prefix)?;
        self.fetch_range(&prefix).await
    }

    pub(crate) async fn fetch_range(&self, prefix: &Prefix) -> Result<CandidateSet, Error> {
        let url = format!("{}/range/{}", self.base_url, prefix);
        let transport = |source: reqwest::Error| Error::Transport {
            prefix: prefix.to_string(),
            source: source.without_url(),
        };

        let mut request = self.http.get(&url);
        if self.add_padding {
            request = request.header("Add-Padding", "true");
        }

        // Only 200 carries a complete range; any other status, 2xx included,
        // leaves the exposure undetermined.
        let response = request.send().await.map_err(transport)?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::LookupFailed {
                prefix: prefix.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        let candidates = CandidateSet::parse(&body)?;
        debug!(%prefix, candidates = candidates.len(), "range lookup complete");

        Ok(candidates)
    }
}
