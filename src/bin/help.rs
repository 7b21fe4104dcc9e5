//! Help command - displays all available commands

use colored::*;

fn main() {
    println!("{}", "━".repeat(59).cyan().bold());
    println!("{}", "     ₿ BTC RICH LIST BOT - COMMANDS".cyan().bold());
    println!("{}\n", "━".repeat(59).cyan().bold());

    println!("{}\n", "📖 GETTING STARTED".yellow().bold());
    println!("  {}   Verify sources and balance API", "cargo run --bin health_check".green());
    println!("  {}          Compile Rust project", "cargo build --release".green());
    println!("  {}              Build and print the top 200", "cargo run --release".green());
    println!();

    println!("{}\n", "🏆 RICH LIST".yellow().bold());
    println!("  {}   Rank a different number of addresses", "cargo run -- --limit 50".green());
    println!("  {}   Also export the list as CSV", "cargo run -- --csv top200.csv".green());
    println!("  {}   Skip the table, keep the report", "cargo run -- --quiet".green());
    println!();

    println!("{}\n", "🤖 TELEGRAM BOT".yellow().bold());
    println!("  {}   Start the bot (needs TELEGRAM_BOT_TOKEN)", "cargo run --bin telegram_bot".green());
    println!("  {}            Post the current top-200 in chat", "/top200btc".cyan());
    println!("  {}                  Send the top-200 as a CSV file", "/csv".cyan());
    println!("  {}          Show the command list", "/start, /help".cyan());
    println!();

    println!("{}\n", "⚙️  CONFIGURATION (.env)".yellow().bold());
    println!("  {}   Comma-separated priority list", "SOURCES=blockchair,btc_com,bitinfocharts".green());
    println!("  {}                   Addresses kept per source", "MAX_PER_SOURCE=200".green());
    println!("  {}                 Ceiling after merge", "MAX_CANDIDATES=5000".green());
    println!("  {}              Parallel balance lookups", "RESOLVER_CONCURRENCY=10".green());
    println!("  {}             Overall build deadline, 0 disables", "BUILD_DEADLINE_SECS=300".green());
    println!("  {}                     Log level for tracing output", "RUST_LOG=btc_richlist_bot=debug".green());
    println!();

    println!("{}\n", "━".repeat(65).blue());
    println!("{}\n", "💡 Quick Tips:".yellow());
    println!("  • Before a long run: cargo run --bin health_check");
    println!("  • A full build takes 1-3 minutes, blockchain.info is the bottleneck");
    println!("  • Logs are written to logs/richlist-YYYY-MM-DD.log");
    println!();
}
