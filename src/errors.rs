//! Error types for every stage of a rich list build.
//!
//! The split mirrors how failures propagate:
//! - [`FetchError`]: one HTTP call went wrong (retried by the caller)
//! - [`RetryError`]: a retried call ran out of attempts or time
//! - [`SourceError`]: one candidate source could not deliver (skipped by the aggregator)
//! - [`RichListError`]: the build itself failed

use std::time::Duration;

use thiserror::Error;

use crate::interfaces::SourceOutcome;

/// A single failed HTTP call.
///
/// Every variant is considered transient: the retry policy treats them alike.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or body transfer failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The body could not be interpreted.
    #[error("unparsable response from {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Parse { url, .. } => url,
        }
    }
}

/// Typed exhaustion of a retry loop.
#[derive(Error, Debug)]
pub enum RetryError {
    /// Every allowed attempt failed.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: FetchError,
    },

    /// The next backoff would overrun the elapsed-time budget.
    #[error("retry budget of {budget:?} spent after {attempts} attempt(s): {last}")]
    BudgetSpent {
        attempts: u32,
        budget: Duration,
        #[source]
        last: FetchError,
    },
}

impl RetryError {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::BudgetSpent { attempts, .. } => *attempts,
        }
    }

    pub fn last_error(&self) -> &FetchError {
        match self {
            Self::Exhausted { last, .. } | Self::BudgetSpent { last, .. } => last,
        }
    }
}

/// A candidate source that could not produce its list.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source {source_id}: page {page} failed: {error}")]
    PageFailed {
        source_id: String,
        page: u32,
        #[source]
        error: RetryError,
    },

    #[error("source {source_id}: all {pages} page(s) failed, last error: {last}")]
    AllPagesFailed {
        source_id: String,
        pages: u32,
        #[source]
        last: RetryError,
    },

    #[error("source {source_id}: deadline reached before the source finished")]
    DeadlineExceeded { source_id: String },
}

impl SourceError {
    pub fn source_id(&self) -> &str {
        match self {
            Self::PageFailed { source_id, .. }
            | Self::AllPagesFailed { source_id, .. }
            | Self::DeadlineExceeded { source_id } => source_id,
        }
    }
}

/// Build-level failure surfaced to callers.
#[derive(Error, Debug)]
pub enum RichListError {
    /// No source produced a single candidate address.
    #[error(
        "could not collect any candidate addresses from public sources ({} source(s) tried)",
        .outcomes.len()
    )]
    NoCandidates { outcomes: Vec<SourceOutcome> },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("invalid balance API URL {url}: {message}")]
    InvalidLookupUrl { url: String, message: String },
}
