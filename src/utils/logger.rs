use chrono::Local;
use colored::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::RichListSettings;
use crate::interfaces::{BuildReport, RankedPair, SourceOutcome};
use crate::utils::format::format_btc;

/// Install the `tracing` subscriber used by the binaries.
///
/// `RUST_LOG` overrides the default `btc_richlist_bot=info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("btc_richlist_bot=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub struct Logger;

impl Logger {
    fn get_logs_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("logs")
    }

    fn get_log_file_name() -> PathBuf {
        let date = Local::now().format("%Y-%m-%d").to_string();
        Self::get_logs_dir().join(format!("richlist-{}.log", date))
    }

    fn write_to_file(message: &str) {
        let _ = (|| -> std::io::Result<()> {
            fs::create_dir_all(Self::get_logs_dir())?;
            let timestamp = Local::now().to_rfc3339();
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(Self::get_log_file_name())?;
            writeln!(file, "[{}] {}", timestamp, message)
        })();
    }

    pub fn format_address(address: &str) -> String {
        if address.len() >= 14 {
            format!("{}...{}", &address[..8], &address[address.len() - 6..])
        } else {
            address.to_string()
        }
    }

    pub fn header(title: &str) {
        println!("\n{}", "━".repeat(70).cyan());
        println!("{}", format!("  {}", title).cyan().bold());
        println!("{}\n", "━".repeat(70).cyan());
        Self::write_to_file(&format!("HEADER: {}", title));
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
        Self::write_to_file(&format!("INFO: {}", message));
    }

    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
        Self::write_to_file(&format!("SUCCESS: {}", message));
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
        Self::write_to_file(&format!("WARNING: {}", message));
    }

    pub fn error(message: &str) {
        println!("{} {}", "✗".red(), message);
        Self::write_to_file(&format!("ERROR: {}", message));
    }

    pub fn separator() {
        println!("{}", "─".repeat(70).bright_black());
    }

    pub fn startup(settings: &RichListSettings, limit: usize) {
        Self::header("₿ BITCOIN RICH LIST");
        let sources: Vec<&str> = settings.sources.kinds.iter().map(|k| k.id()).collect();
        println!("{}", "📡 Sources (priority order):".cyan());
        for (index, source) in sources.iter().enumerate() {
            println!("{}", format!("   {}. {}", index + 1, source).bright_black());
        }
        println!("{}", "\n⚙️  Limits:".cyan());
        println!(
            "{}",
            format!(
                "   top {} | {} per source | {} candidates max | {} concurrent lookups",
                limit,
                settings.sources.max_per_source,
                settings.aggregator.max_candidates,
                settings.resolver.concurrency
            )
            .bright_black()
        );
        if let Some(deadline) = settings.deadline {
            println!("{}", format!("   deadline {}s\n", deadline.as_secs()).bright_black());
        } else {
            println!("{}", "   no deadline\n".bright_black());
        }
        Self::write_to_file(&format!("STARTUP: limit={} sources={}", limit, sources.join(",")));
    }

    pub fn report(report: &BuildReport) {
        println!("\n{}", "📊 BUILD REPORT".magenta().bold());
        for outcome in &report.sources {
            let line = match outcome {
                SourceOutcome::Collected { source_id, count } => {
                    format!("   {} {}: {} candidates", "✓".green(), source_id, count)
                }
                SourceOutcome::Empty { source_id } => {
                    format!("   {} {}: no candidates", "⚠".yellow(), source_id)
                }
                SourceOutcome::Skipped { source_id, error } => {
                    format!("   {} {}: skipped ({})", "✗".red(), source_id, error)
                }
            };
            println!("{}", line);
        }
        println!(
            "{}",
            format!(
                "   {} candidates, {} resolved, {} dropped in {:.1}s",
                report.candidates,
                report.resolved,
                report.dropped,
                report.elapsed.as_secs_f64()
            )
            .bright_black()
        );
        if report.deadline_hit {
            println!(
                "{}",
                format!("   ⏱  deadline reached, {} lookups abandoned", report.abandoned).yellow()
            );
        }
        Self::write_to_file(&format!(
            "REPORT: candidates={} resolved={} dropped={} abandoned={} deadline_hit={}",
            report.candidates, report.resolved, report.dropped, report.abandoned, report.deadline_hit
        ));
    }

    pub fn rich_list(entries: &[RankedPair]) {
        println!("\n{}", "🏆 TOP ADDRESSES".cyan().bold());
        for (index, pair) in entries.iter().enumerate() {
            println!(
                "{} {} {}",
                format!("{:>4}.", index + 1).bright_black(),
                format!("{:<64}", pair.address()).white(),
                format!("{:>20} BTC", format_btc(pair.balance())).green()
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address_shortens_long_addresses() {
        assert_eq!(
            Logger::format_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"),
            "1A1zP1eP...DivfNa"
        );
        assert_eq!(Logger::format_address("short"), "short");
    }
}
