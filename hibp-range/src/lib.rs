//! Checks passwords against the [Have I Been Pwned](https://haveibeenpwned.com/Passwords)
//! Pwned Passwords corpus without sending the password, or its full hash, anywhere.
//!
//! # k-anonymity
//!
//! Each password is hashed with SHA1 and the 40-character hex digest is split in two:
//!
//! - a 5-character prefix, the only thing sent to `GET /range/{PREFIX}`
//! - a 35-character suffix, which never leaves the process
//!
//! The service answers with every known suffix sharing that prefix (`SUFFIX:COUNT`
//! per line, typically several hundred), and the match happens locally. The service
//! learns only that the password is one of 16^35 possible hashes under that prefix.
//!
//! # Usage
//!
//! ```no_run
//! use hibp_range::{BreachChecker, ClientConfig, Exposure, RangeClient};
//!
//! # async fn run() -> Result<(), hibp_range::Error> {
//! let checker = BreachChecker::new(RangeClient::new(ClientConfig::default())?);
//!
//! match checker.evaluate("password").await? {
//!     Exposure::Found(count) => println!("seen {count} times"),
//!     Exposure::NotFound => println!("not found"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Batches go through [`BreachChecker::evaluate_all`], which runs lookups
//! concurrently and returns one entry per input in input order. By default a
//! failed lookup is recorded against its credential rather than stopping the
//! batch; a failure is never reported as "not found".

pub mod batch;
pub mod candidate;
pub mod checker;
pub mod client;
pub mod conversion;
pub mod error;
pub mod retry;

pub use batch::{BatchEntry, BatchOptions, BatchResult, DEFAULT_CONCURRENCY, FailurePolicy};
pub use candidate::{CandidateEntry, CandidateSet};
pub use checker::{BreachChecker, Exposure};
pub use client::{ClientConfig, DEFAULT_BASE_URL, RangeClient};
pub use conversion::{PREFIX_LEN, Prefix, SUFFIX_LEN, Suffix, digest_hex, split};
pub use error::Error;
pub use retry::RetryPolicy;
pub use tokio_util::sync::CancellationToken;
