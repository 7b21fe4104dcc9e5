//! Standalone health check utility

use anyhow::Result;
use btc_richlist_bot::config::{load_env, Env};
use btc_richlist_bot::utils::health_check::{CheckStatus, HealthCheckResult};
use btc_richlist_bot::utils::{init_tracing, log_health_check, perform_health_check};
use colored::*;

fn print_header() {
    println!("\n{}", "━".repeat(59).cyan().bold());
    println!("{}", "     🏥 BTC RICH LIST - HEALTH CHECK".cyan().bold());
    println!("{}\n", "━".repeat(59).cyan().bold());
}

fn print_recommendations(result: &HealthCheckResult) {
    let mut issues = Vec::new();

    if result.balance_api.status == CheckStatus::Error {
        issues.push("❌ Balance API Failed");
        println!("{}\n", "📋 Balance API Issue:".red().bold());
        println!("   • Check BALANCE_API_URL in .env file");
        println!("   • blockchain.info rate-limits aggressively, wait a minute and retry");
        println!("   • Check your internet connection\n");
    }

    let failing: Vec<&str> = result
        .sources
        .iter()
        .filter(|check| check.status == CheckStatus::Error)
        .map(|check| check.name.as_str())
        .collect();
    let empty: Vec<&str> = result
        .sources
        .iter()
        .filter(|check| check.status == CheckStatus::Warning)
        .map(|check| check.name.as_str())
        .collect();

    if !result.sources.iter().any(|check| check.status == CheckStatus::Ok) {
        issues.push("❌ No Usable Source");
        println!("{}\n", "📋 Source Issue:".red().bold());
        println!("   • None of the configured sources returned candidate addresses");
        println!("   • Check SOURCES in .env (blockchair, btc_com, bitinfocharts)");
        println!("   • Sites behind bot protection may need a different USER_AGENT\n");
    } else if !failing.is_empty() || !empty.is_empty() {
        println!("{}\n", "⚠️  Degraded Sources:".yellow().bold());
        for name in &failing {
            println!("   • {} is unreachable, it will be skipped", name);
        }
        for name in &empty {
            println!("   • {} returned no addresses, its page layout may have changed", name);
        }
        println!();
    }

    if issues.is_empty() {
        println!("{}\n", "🎉 All Systems Operational!".green().bold());
        println!("{}", "You're ready to build the list:".cyan());
        println!("   {}\n", "cargo run --release".green());
    } else {
        println!("{}\n", format!("⚠️  {} Issue(s) Found", issues.len()).red().bold());
        println!("{}\n", "Fix the issues above before starting the bot.".yellow());
    }
}

fn print_configuration(env: &Env) {
    let settings = &env.settings;
    println!("{}", "📊 Configuration Summary:".cyan());
    println!();
    println!("   Sources: {}", settings.sources.kinds.iter().map(|k| k.id()).collect::<Vec<_>>().join(", "));
    println!("   Per source: {} | Candidates max: {}", settings.sources.max_per_source, settings.aggregator.max_candidates);
    println!("   Concurrent lookups: {}", settings.resolver.concurrency);
    println!("   HTTP timeout: {}s", settings.http_timeout.as_secs());
    match settings.deadline {
        Some(deadline) => println!("   Build deadline: {}s", deadline.as_secs()),
        None => println!("   Build deadline: none"),
    }
    println!(
        "   Telegram token: {}",
        if env.telegram_bot_token.is_some() { "set" } else { "not set" }
    );
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    print_header();
    println!("{}\n", "⏳ Running diagnostic checks...".yellow());

    let env = load_env()?;
    let result = perform_health_check(&env.settings).await?;

    log_health_check(&result);
    print_configuration(&env);
    print_recommendations(&result);

    if result.healthy {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
