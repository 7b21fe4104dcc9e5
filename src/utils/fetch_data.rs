use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::{FetchError, RetryError};
use crate::utils::retry::{retry_with_backoff, RetryPolicy};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; RichListBot/1.0; +https://example.local)";

/// Plain GET returning the body as text. Non-2xx answers are errors.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// [`HttpFetch`] over a shared reqwest connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

/// GET `url` as text, retrying per `policy`.
pub async fn fetch_text(
    http: &dyn HttpFetch,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, RetryError> {
    retry_with_backoff(policy, url, || http.get_text(url)).await
}
