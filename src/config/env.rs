use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::settings::{
    RichListSettings, DEFAULT_BALANCE_API_URL, DEFAULT_BUILD_DEADLINE, DEFAULT_HTTP_TIMEOUT,
    DEFAULT_MAX_CANDIDATES, DEFAULT_MAX_PER_SOURCE, DEFAULT_RESOLVER_CONCURRENCY, DEFAULT_RICH_LIST_LIMIT,
};
use super::sources::parse_source_list;
use crate::utils::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Env {
    pub settings: RichListSettings,
    /// Only the chat bot needs this.
    pub telegram_bot_token: Option<String>,
}

/// Upper bound for every duration setting (one week).
const MAX_CONFIG_SECS: f64 = 604_800.0;

/// Reads one variable through `lookup`, falling back to `default` when unset or blank.
fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid {}: \"{}\"", key, raw)),
        None => Ok(default),
    }
}

fn parse_bounded<F>(lookup: &F, key: &str, default: u64, min: u64, max: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_var(lookup, key, default)?;
    if value < min || value > max {
        anyhow::bail!("Invalid {}: must be between {} and {}", key, min, max);
    }
    Ok(value)
}

fn parse_seconds<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_var(lookup, key, default.as_secs_f64())?;
    if !(0.0..=MAX_CONFIG_SECS).contains(&secs) {
        anyhow::bail!("Invalid {}: must be between 0 and {} seconds", key, MAX_CONFIG_SECS);
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("Invalid {}: \"{}\"", key, secs))
}

fn validate_http_url(key: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value).with_context(|| format!("Invalid {}: \"{}\"", key, value))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        eprintln!("\n❌ Invalid {}\n", key);
        eprintln!("Current value: {}", value);
        eprintln!("Must start with: http:// or https://\n");
        anyhow::bail!("Invalid {}: must be a valid HTTP/HTTPS URL", key);
    }
    Ok(())
}

fn parse_retry_policy<F>(
    lookup: &F,
    prefix: &str,
    defaults: RetryPolicy,
    max_elapsed: Duration,
) -> Result<RetryPolicy>
where
    F: Fn(&str) -> Option<String>,
{
    let attempts_key = format!("{}_RETRY_LIMIT", prefix);
    let min_key = format!("{}_BACKOFF_MIN_SECS", prefix);
    let max_key = format!("{}_BACKOFF_MAX_SECS", prefix);

    let max_attempts = parse_bounded(lookup, &attempts_key, defaults.max_attempts as u64, 1, 10)? as u32;
    let min_delay = parse_seconds(lookup, &min_key, defaults.min_delay)?;
    let max_delay = parse_seconds(lookup, &max_key, defaults.max_delay)?;
    if max_delay < min_delay {
        anyhow::bail!("Invalid {}: must be >= {}", max_key, min_key);
    }

    Ok(RetryPolicy {
        max_attempts,
        multiplier: defaults.multiplier,
        min_delay,
        max_delay,
        max_elapsed,
    })
}

impl Env {
    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Env>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = RichListSettings {
            http_timeout: parse_seconds(&lookup, "HTTP_TIMEOUT", DEFAULT_HTTP_TIMEOUT)?,
            ..RichListSettings::default()
        };
        if settings.http_timeout.is_zero() {
            anyhow::bail!("Invalid HTTP_TIMEOUT: must be positive");
        }

        if let Some(user_agent) = lookup("USER_AGENT").filter(|v| !v.trim().is_empty()) {
            settings.user_agent = user_agent.trim().to_string();
        }

        let balance_api_url: String = parse_var(&lookup, "BALANCE_API_URL", DEFAULT_BALANCE_API_URL.to_string())?;
        validate_http_url("BALANCE_API_URL", &balance_api_url)?;
        settings.balance_api_url = balance_api_url;

        if let Some(list) = lookup("SOURCES").filter(|v| !v.trim().is_empty()) {
            settings.sources.kinds = parse_source_list(&list).context("Invalid SOURCES")?;
        }

        settings.sources.max_per_source =
            parse_bounded(&lookup, "MAX_PER_SOURCE", DEFAULT_MAX_PER_SOURCE as u64, 1, 10_000)? as usize;
        settings.aggregator.max_candidates =
            parse_bounded(&lookup, "MAX_CANDIDATES", DEFAULT_MAX_CANDIDATES as u64, 1, 100_000)? as usize;
        settings.resolver.concurrency = parse_bounded(
            &lookup,
            "RESOLVER_CONCURRENCY",
            DEFAULT_RESOLVER_CONCURRENCY as u64,
            1,
            100,
        )? as usize;
        settings.default_limit =
            parse_bounded(&lookup, "RICH_LIST_LIMIT", DEFAULT_RICH_LIST_LIMIT as u64, 1, 5_000)? as usize;

        let max_elapsed = parse_seconds(&lookup, "RETRY_MAX_ELAPSED_SECS", RetryPolicy::DEFAULT_MAX_ELAPSED)?;
        settings.sources.retry =
            parse_retry_policy(&lookup, "SOURCE", RetryPolicy::source_default(), max_elapsed)?;
        settings.resolver.retry =
            parse_retry_policy(&lookup, "BALANCE", RetryPolicy::balance_default(), max_elapsed)?;

        // 0 disables the overall deadline
        let deadline = parse_seconds(&lookup, "BUILD_DEADLINE_SECS", DEFAULT_BUILD_DEADLINE)?;
        settings.deadline = (!deadline.is_zero()).then_some(deadline);

        Ok(Env {
            settings,
            telegram_bot_token: lookup("TELEGRAM_BOT_TOKEN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

pub fn load_env() -> Result<Env> {
    dotenvy::dotenv().ok(); // Load .env file if it exists

    Env::from_lookup(|key| env::var(key).ok())
}
