use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use rustc_hash::FxHashMap;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ResolverSettings;
use crate::errors::FetchError;
use crate::interfaces::{CandidateAddress, LookupOutcome, RawAddrResponse};
use crate::utils::fetch_data::HttpFetch;
use crate::utils::retry::retry_with_backoff;

/// Current balance of one address, in satoshi.
#[async_trait]
pub trait BalanceLookup: Send + Sync {
    async fn balance_of(&self, address: &str) -> Result<u64, FetchError>;
}

/// blockchain.info `rawaddr` lookup.
pub struct BlockchainInfoLookup {
    http: Arc<dyn HttpFetch>,
    base_url: Url,
}

impl BlockchainInfoLookup {
    pub fn new(http: Arc<dyn HttpFetch>, base_url: &str) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self { http, base_url })
    }

    /// `{base}/{address}?cors=true`
    pub fn address_url(&self, address: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(address);
        }
        url.query_pairs_mut().append_pair("cors", "true");
        url.into()
    }
}

#[async_trait]
impl BalanceLookup for BlockchainInfoLookup {
    async fn balance_of(&self, address: &str) -> Result<u64, FetchError> {
        let url = self.address_url(address);
        let body = self.http.get_text(&url).await?;

        let payload: RawAddrResponse = serde_json::from_str(&body).map_err(|e| FetchError::Parse {
            url: url.clone(),
            message: e.to_string(),
        })?;

        // a payload without final_balance is an empty address
        match payload.final_balance {
            None => Ok(0),
            Some(balance) => u64::try_from(balance).map_err(|_| FetchError::Parse {
                url,
                message: format!("negative final_balance {}", balance),
            }),
        }
    }
}

/// Balances of the addresses that resolved.
#[derive(Debug, Default)]
pub struct Resolution {
    pub balances: FxHashMap<String, u64>,
    /// Addresses that exhausted their retries, sorted.
    pub dropped: Vec<String>,
    /// Lookups still pending when the deadline fired.
    pub abandoned: usize,
    pub deadline_hit: bool,
}

/// Looks up balances with at most `concurrency` requests in flight.
pub struct BalanceResolver {
    lookup: Arc<dyn BalanceLookup>,
    settings: ResolverSettings,
}

impl BalanceResolver {
    pub fn new(lookup: Arc<dyn BalanceLookup>, settings: ResolverSettings) -> Self {
        Self { lookup, settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    async fn lookup_one(&self, candidate: &CandidateAddress) -> LookupOutcome {
        let address = candidate.address.as_str();
        let lookup = self.lookup.as_ref();

        match retry_with_backoff(&self.settings.retry, address, || lookup.balance_of(address)).await {
            Ok(balance) => LookupOutcome::Resolved {
                address: address.to_string(),
                balance,
            },
            Err(error) => LookupOutcome::Dropped {
                address: address.to_string(),
                error,
            },
        }
    }

    /// Resolve every candidate, dropping the ones that never answer.
    ///
    /// Outcomes are merged here, on the calling task, as lookups complete.
    /// At `deadline` the remaining lookups are cancelled and what resolved so far is returned.
    pub async fn resolve(&self, candidates: &[CandidateAddress], deadline: Option<Instant>) -> Resolution {
        // owned items keep this stream Send
        let mut lookups = stream::iter(candidates.to_vec())
            .map(|candidate| async move { self.lookup_one(&candidate).await })
            .buffer_unordered(self.settings.concurrency.max(1));

        let mut resolution = Resolution::default();
        let mut pending = candidates.len();

        loop {
            let next = match deadline {
                Some(deadline) => match timeout_at(deadline, lookups.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        resolution.deadline_hit = true;
                        break;
                    }
                },
                None => lookups.next().await,
            };
            let Some(outcome) = next else {
                break;
            };
            pending -= 1;

            match outcome {
                LookupOutcome::Resolved { address, balance } => {
                    resolution.balances.insert(address, balance);
                }
                LookupOutcome::Dropped { address, error } => {
                    debug!(%address, attempts = error.attempts(), error = %error, "dropping unresolved address");
                    resolution.dropped.push(address);
                }
            }
        }

        resolution.abandoned = pending;
        resolution.dropped.sort();

        if resolution.deadline_hit {
            warn!(
                resolved = resolution.balances.len(),
                abandoned = resolution.abandoned,
                "deadline reached during balance resolution"
            );
        }
        info!(
            resolved = resolution.balances.len(),
            dropped = resolution.dropped.len(),
            "balances resolved"
        );
        resolution
    }
}
