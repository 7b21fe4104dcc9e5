use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::info;

use crate::config::RichListSettings;
use crate::errors::RichListError;
use crate::interfaces::{BuildReport, RankedPair};
use crate::services::aggregator::CandidateAggregator;
use crate::services::ranking::build_ranking;
use crate::services::resolver::{BalanceLookup, BalanceResolver, BlockchainInfoLookup};
use crate::services::sources::build_sources;
use crate::utils::fetch_data::{HttpFetch, ReqwestFetcher};

/// Ranked entries of one build plus how they were obtained.
#[derive(Debug)]
pub struct RichList {
    pub entries: Vec<RankedPair>,
    pub report: BuildReport,
}

/// Aggregation, resolution and ranking under one overall deadline.
pub struct RichListBuilder {
    aggregator: CandidateAggregator,
    resolver: BalanceResolver,
    deadline: Option<Duration>,
}

impl RichListBuilder {
    pub fn new(aggregator: CandidateAggregator, resolver: BalanceResolver, deadline: Option<Duration>) -> Self {
        Self {
            aggregator,
            resolver,
            deadline,
        }
    }

    /// Production wiring: one shared reqwest client, the configured sources and blockchain.info.
    pub fn from_settings(settings: &RichListSettings) -> Result<Self, RichListError> {
        let fetcher = ReqwestFetcher::new(settings.http_timeout, &settings.user_agent)
            .map_err(RichListError::HttpClient)?;
        let http: Arc<dyn HttpFetch> = Arc::new(fetcher);
        Self::with_http(settings, http)
    }

    /// Same wiring as [`from_settings`](Self::from_settings) over any [`HttpFetch`].
    pub fn with_http(settings: &RichListSettings, http: Arc<dyn HttpFetch>) -> Result<Self, RichListError> {
        let lookup = BlockchainInfoLookup::new(Arc::clone(&http), &settings.balance_api_url).map_err(|e| {
            RichListError::InvalidLookupUrl {
                url: settings.balance_api_url.clone(),
                message: e.to_string(),
            }
        })?;
        let lookup: Arc<dyn BalanceLookup> = Arc::new(lookup);

        let aggregator = CandidateAggregator::new(
            build_sources(&settings.sources, http),
            settings.sources.max_per_source,
            settings.aggregator.clone(),
        );
        let resolver = BalanceResolver::new(lookup, settings.resolver.clone());
        Ok(Self::new(aggregator, resolver, settings.deadline))
    }

    /// Build a fresh rich list of at most `limit` entries.
    ///
    /// Only a build that collected no candidates at all fails. When the deadline
    /// fires the ranking covers whatever resolved in time.
    pub async fn build(&self, limit: usize) -> Result<RichList, RichListError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        // a deadline past what the clock can represent is no deadline
        let deadline = self.deadline.and_then(|d| clock.checked_add(d));

        info!(
            limit,
            sources = ?self.aggregator.source_ids(),
            concurrency = self.resolver.settings().concurrency,
            "building rich list"
        );
        let aggregation = self.aggregator.collect(deadline).await?;
        let candidates = aggregation.candidates.len();

        let resolution = self.resolver.resolve(&aggregation.candidates, deadline).await;
        let resolved = resolution.balances.len();
        let entries = build_ranking(resolution.balances, limit);

        let report = BuildReport {
            started_at,
            elapsed: clock.elapsed(),
            sources: aggregation.outcomes,
            candidates,
            resolved,
            dropped: resolution.dropped.len(),
            abandoned: resolution.abandoned,
            deadline_hit: resolution.deadline_hit,
        };
        info!(
            entries = entries.len(),
            candidates,
            resolved,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "rich list built"
        );

        Ok(RichList { entries, report })
    }
}

/// One-shot build with production wiring.
pub async fn build_rich_list(settings: &RichListSettings, limit: usize) -> Result<RichList, RichListError> {
    RichListBuilder::from_settings(settings)?.build(limit).await
}
