use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::config::{PageFailurePolicy, Pagination, SourceKind, SourceSettings};
use crate::errors::{RetryError, SourceError};
use crate::interfaces::CandidateAddress;
use crate::services::extractor::extract_addresses;
use crate::utils::fetch_data::{fetch_text, HttpFetch};
use crate::utils::retry::RetryPolicy;

/// Something that can produce up to `max` candidate addresses, in the order it found them.
///
/// Failures are returned to the caller: deciding whether a failed source is
/// fatal is the aggregator's job.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    fn id(&self) -> &str;

    async fn fetch_candidates(&self, max: usize) -> Result<Vec<CandidateAddress>, SourceError>;
}

/// A rich list scraped from one or more HTML pages.
pub struct HtmlListSource {
    id: String,
    base_url: String,
    pagination: Pagination,
    on_page_failure: PageFailurePolicy,
    http: Arc<dyn HttpFetch>,
    retry: RetryPolicy,
}

impl HtmlListSource {
    pub fn new(
        id: impl Into<String>,
        base_url: impl Into<String>,
        pagination: Pagination,
        on_page_failure: PageFailurePolicy,
        http: Arc<dyn HttpFetch>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            pagination,
            on_page_failure,
            http,
            retry,
        }
    }

    /// One of the built-in sources.
    pub fn for_kind(kind: SourceKind, http: Arc<dyn HttpFetch>, retry: RetryPolicy) -> Self {
        Self::new(
            kind.id(),
            kind.base_url(),
            kind.pagination(),
            kind.page_failure_policy(),
            http,
            retry,
        )
    }

    pub fn page_url(&self, page: u32) -> String {
        self.pagination.page_url(&self.base_url, page)
    }
}

#[async_trait]
impl CandidateSource for HtmlListSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_candidates(&self, max: usize) -> Result<Vec<CandidateAddress>, SourceError> {
        let mut collected = Vec::new();
        if max == 0 {
            return Ok(collected);
        }

        let pages = self.pagination.page_count();
        let mut seen = FxHashSet::default();
        let mut pages_loaded = 0;
        let mut last_failure: Option<RetryError> = None;

        for page in 1..=pages {
            let url = self.page_url(page);
            let html = match fetch_text(self.http.as_ref(), &url, &self.retry).await {
                Ok(html) => html,
                Err(error) => match self.on_page_failure {
                    PageFailurePolicy::FailSource => {
                        return Err(SourceError::PageFailed {
                            source_id: self.id.clone(),
                            page,
                            error,
                        });
                    }
                    PageFailurePolicy::SkipPage => {
                        warn!(source = %self.id, page, error = %error, "skipping page");
                        last_failure = Some(error);
                        continue;
                    }
                },
            };
            pages_loaded += 1;

            let found = extract_addresses(&html);
            let before = collected.len();
            for candidate in found {
                if seen.insert(candidate.address.clone()) {
                    collected.push(candidate);
                }
            }
            debug!(source = %self.id, page, new = collected.len() - before, "page parsed");

            if collected.len() >= max {
                break;
            }
        }

        if pages_loaded == 0 {
            if let Some(last) = last_failure {
                return Err(SourceError::AllPagesFailed {
                    source_id: self.id.clone(),
                    pages,
                    last,
                });
            }
        }

        collected.truncate(max);
        info!(source = %self.id, candidates = collected.len(), pages_loaded, "source scraped");
        Ok(collected)
    }
}

/// Sources for `settings.kinds`, in priority order, sharing one HTTP client.
pub fn build_sources(settings: &SourceSettings, http: Arc<dyn HttpFetch>) -> Vec<Arc<dyn CandidateSource>> {
    settings
        .kinds
        .iter()
        .map(|kind| {
            Arc::new(HtmlListSource::for_kind(*kind, Arc::clone(&http), settings.retry)) as Arc<dyn CandidateSource>
        })
        .collect()
}
