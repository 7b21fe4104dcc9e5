use std::sync::Arc;

use futures_util::future::join_all;
use rustc_hash::FxHashSet;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::config::AggregatorSettings;
use crate::errors::{RichListError, SourceError};
use crate::interfaces::{CandidateAddress, SourceOutcome};
use crate::services::sources::CandidateSource;

/// Merged candidates plus what happened to each source.
#[derive(Debug)]
pub struct Aggregation {
    pub candidates: Vec<CandidateAddress>,
    /// One entry per source, in priority order.
    pub outcomes: Vec<SourceOutcome>,
}

/// Runs every source concurrently and merges their lists.
pub struct CandidateAggregator {
    sources: Vec<Arc<dyn CandidateSource>>,
    max_per_source: usize,
    settings: AggregatorSettings,
}

impl CandidateAggregator {
    /// `sources` order is the merge priority.
    pub fn new(sources: Vec<Arc<dyn CandidateSource>>, max_per_source: usize, settings: AggregatorSettings) -> Self {
        Self {
            sources,
            max_per_source,
            settings,
        }
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    async fn fetch_one(
        &self,
        source: &Arc<dyn CandidateSource>,
        deadline: Option<Instant>,
    ) -> (String, Result<Vec<CandidateAddress>, SourceError>) {
        let fetch = source.fetch_candidates(self.max_per_source);
        let result = match deadline {
            Some(deadline) => timeout_at(deadline, fetch).await.unwrap_or_else(|_| {
                Err(SourceError::DeadlineExceeded {
                    source_id: source.id().to_string(),
                })
            }),
            None => fetch.await,
        };
        (source.id().to_string(), result)
    }

    /// Collect candidates from all sources.
    ///
    /// A failing source is recorded and skipped; sources still running at
    /// `deadline` count as failed and contribute nothing, not even pages they
    /// had already parsed. Errors only when nothing at all was collected.
    pub async fn collect(&self, deadline: Option<Instant>) -> Result<Aggregation, RichListError> {
        let mut fetches = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            fetches.push(self.fetch_one(source, deadline));
        }

        // join_all keeps input order, so merging below follows source priority
        let results = join_all(fetches).await;

        let mut seen = FxHashSet::default();
        let mut candidates = Vec::new();
        let mut outcomes = Vec::with_capacity(results.len());

        for (source_id, result) in results {
            match result {
                Ok(found) if found.is_empty() => {
                    warn!(source = %source_id, "source returned no candidates");
                    outcomes.push(SourceOutcome::Empty { source_id });
                }
                Ok(found) => {
                    let count = found.len();
                    for candidate in found {
                        if candidates.len() >= self.settings.max_candidates {
                            break;
                        }
                        if seen.insert(candidate.address.clone()) {
                            candidates.push(candidate);
                        }
                    }
                    outcomes.push(SourceOutcome::Collected { source_id, count });
                }
                Err(error) => {
                    warn!(source = %source_id, error = %error, "skipping failed source");
                    outcomes.push(SourceOutcome::Skipped { source_id, error });
                }
            }
        }

        if candidates.is_empty() {
            return Err(RichListError::NoCandidates { outcomes });
        }

        info!(
            candidates = candidates.len(),
            sources = outcomes.len(),
            skipped = outcomes.iter().filter(|o| o.is_skipped()).count(),
            "candidates aggregated"
        );
        Ok(Aggregation { candidates, outcomes })
    }
}
