use std::time::Duration;

use super::sources::SourceKind;
use crate::utils::fetch_data::DEFAULT_USER_AGENT;
use crate::utils::retry::RetryPolicy;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_PER_SOURCE: usize = 200;
pub const DEFAULT_MAX_CANDIDATES: usize = 5_000;
pub const DEFAULT_RESOLVER_CONCURRENCY: usize = 10;
pub const DEFAULT_RICH_LIST_LIMIT: usize = 200;
pub const DEFAULT_BUILD_DEADLINE: Duration = Duration::from_secs(300);
pub const DEFAULT_BALANCE_API_URL: &str = "https://blockchain.info/rawaddr";

/// Scraping settings shared by every source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    /// Sources to run, in merge priority order.
    pub kinds: Vec<SourceKind>,
    pub max_per_source: usize,
    pub retry: RetryPolicy,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kinds: SourceKind::ALL.to_vec(),
            max_per_source: DEFAULT_MAX_PER_SOURCE,
            retry: RetryPolicy::source_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorSettings {
    /// Hard ceiling on merged candidates handed to the resolver.
    pub max_candidates: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Maximum lookups in flight at once.
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_RESOLVER_CONCURRENCY,
            retry: RetryPolicy::balance_default(),
        }
    }
}

/// Everything one build needs. `Default` gives the production values.
#[derive(Debug, Clone, PartialEq)]
pub struct RichListSettings {
    pub http_timeout: Duration,
    pub user_agent: String,
    pub balance_api_url: String,
    pub sources: SourceSettings,
    pub aggregator: AggregatorSettings,
    pub resolver: ResolverSettings,
    /// Overall deadline for aggregation plus resolution. `None` waits indefinitely.
    pub deadline: Option<Duration>,
    pub default_limit: usize,
}

impl Default for RichListSettings {
    fn default() -> Self {
        Self {
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            balance_api_url: DEFAULT_BALANCE_API_URL.to_string(),
            sources: SourceSettings::default(),
            aggregator: AggregatorSettings::default(),
            resolver: ResolverSettings::default(),
            deadline: Some(DEFAULT_BUILD_DEADLINE),
            default_limit: DEFAULT_RICH_LIST_LIMIT,
        }
    }
}
