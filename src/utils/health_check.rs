use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::RichListSettings;
use crate::services::extractor::extract_addresses;
use crate::services::resolver::{BalanceLookup, BlockchainInfoLookup};
use crate::utils::fetch_data::{fetch_text, HttpFetch, ReqwestFetcher};
use crate::utils::format::format_btc;
use crate::utils::logger::Logger;
use crate::utils::retry::RetryPolicy;

/// Genesis block coinbase address; always known to the balance API.
pub const PROBE_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub sources: Vec<CheckResult>,
    pub balance_api: CheckResult,
    pub timestamp: i64,
}

/// Probe the first page of every configured source and one balance lookup, single attempt each.
///
/// Healthy means the balance API answered and at least one source produced candidates.
pub async fn perform_health_check(settings: &RichListSettings) -> Result<HealthCheckResult> {
    let fetcher = ReqwestFetcher::new(settings.http_timeout, &settings.user_agent)
        .context("Failed to build HTTP client")?;
    let http: Arc<dyn HttpFetch> = Arc::new(fetcher);
    check_with(settings, http).await
}

pub async fn check_with(settings: &RichListSettings, http: Arc<dyn HttpFetch>) -> Result<HealthCheckResult> {
    let mut sources = Vec::with_capacity(settings.sources.kinds.len());
    for kind in &settings.sources.kinds {
        let url = kind.pagination().page_url(kind.base_url(), 1);
        let check = match fetch_text(http.as_ref(), &url, &RetryPolicy::once()).await {
            Ok(html) => {
                let found = extract_addresses(&html).len();
                if found > 0 {
                    CheckResult {
                        name: kind.id().to_string(),
                        status: CheckStatus::Ok,
                        message: format!("{} candidate(s) on first page", found),
                    }
                } else {
                    CheckResult {
                        name: kind.id().to_string(),
                        status: CheckStatus::Warning,
                        message: "Page loaded but no addresses recognised (layout changed?)".to_string(),
                    }
                }
            }
            Err(e) => CheckResult {
                name: kind.id().to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        };
        sources.push(check);
    }

    let lookup = BlockchainInfoLookup::new(http, &settings.balance_api_url)
        .with_context(|| format!("Invalid balance API URL {}", settings.balance_api_url))?;
    let balance_api = match lookup.balance_of(PROBE_ADDRESS).await {
        Ok(balance) => CheckResult {
            name: "balance_api".to_string(),
            status: CheckStatus::Ok,
            message: format!("{} holds {} BTC", Logger::format_address(PROBE_ADDRESS), format_btc(balance)),
        },
        Err(e) => CheckResult {
            name: "balance_api".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    };

    let healthy = balance_api.status == CheckStatus::Ok
        && sources.iter().any(|check| check.status == CheckStatus::Ok);

    Ok(HealthCheckResult {
        healthy,
        sources,
        balance_api,
        timestamp: chrono::Utc::now().timestamp(),
    })
}

fn log_check(check: &CheckResult) {
    let line = format!("{}: {}", check.name, check.message);
    match check.status {
        CheckStatus::Ok => Logger::success(&line),
        CheckStatus::Warning => Logger::warning(&line),
        CheckStatus::Error => Logger::error(&line),
    }
}

pub fn log_health_check(result: &HealthCheckResult) {
    Logger::separator();
    Logger::header("🏥 HEALTH CHECK");
    for check in &result.sources {
        log_check(check);
    }
    log_check(&result.balance_api);
    Logger::separator();
    if result.healthy {
        Logger::success("Health check passed");
    } else {
        Logger::error("Health check failed");
    }
}
