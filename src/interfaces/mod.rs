use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::{RetryError, SourceError};

/// Address format family, decided by prefix and alphabet only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFormat {
    /// Base58 `1...` / `3...` addresses.
    Legacy,
    /// Bech32 `bc1...` / `tb1...` addresses.
    Segwit,
}

/// A format-valid address scraped from a source page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateAddress {
    pub address: String,
    pub format: AddressFormat,
}

/// One rich list entry. Only the ranking stage creates these, and always with a positive balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPair {
    address: String,
    balance: u64,
}

impl RankedPair {
    pub(crate) fn new(address: String, balance: u64) -> Self {
        debug_assert!(balance > 0);
        Self { address, balance }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Balance in satoshi.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn into_parts(self) -> (String, u64) {
        (self.address, self.balance)
    }
}

/// `rawaddr` payload from the balance API - only the field we need.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAddrResponse {
    #[serde(default)]
    pub final_balance: Option<i64>,
}

/// What happened to one source during aggregation.
#[derive(Debug)]
pub enum SourceOutcome {
    Collected { source_id: String, count: usize },
    Empty { source_id: String },
    Skipped { source_id: String, error: SourceError },
}

impl SourceOutcome {
    pub fn source_id(&self) -> &str {
        match self {
            Self::Collected { source_id, .. }
            | Self::Empty { source_id }
            | Self::Skipped { source_id, .. } => source_id,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// What happened to one candidate during balance resolution.
#[derive(Debug)]
pub enum LookupOutcome {
    Resolved { address: String, balance: u64 },
    Dropped { address: String, error: RetryError },
}

/// Summary of one build, returned next to the ranked entries.
#[derive(Debug)]
pub struct BuildReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub sources: Vec<SourceOutcome>,
    pub candidates: usize,
    pub resolved: usize,
    pub dropped: usize,
    /// Lookups still pending when the deadline fired.
    pub abandoned: usize,
    pub deadline_hit: bool,
}

impl BuildReport {
    pub fn skipped_sources(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.sources.iter().filter(|outcome| outcome.is_skipped())
    }
}
