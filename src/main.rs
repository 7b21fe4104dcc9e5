use anyhow::{Context, Result};
use btc_richlist_bot::config::load_env;
use btc_richlist_bot::services::RichListBuilder;
use btc_richlist_bot::utils::{init_tracing, write_csv, Logger};
use clap::Parser;
use std::path::PathBuf;

/// Build the current Bitcoin rich list from public sources.
#[derive(Debug, Parser)]
#[command(name = "richlist", version, about)]
struct Cli {
    /// Number of addresses to rank (defaults to RICH_LIST_LIMIT, 200)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Write the result as CSV to this path
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Skip printing the table
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let env = load_env()?;
    let limit = cli.limit.unwrap_or(env.settings.default_limit);
    Logger::startup(&env.settings, limit);

    let builder = RichListBuilder::from_settings(&env.settings)?;
    Logger::info("Collecting candidates and refreshing balances... this can take a few minutes.");

    let rich_list = match builder.build(limit).await {
        Ok(rich_list) => rich_list,
        Err(e) => {
            Logger::error(&format!("Build failed: {}", e));
            return Err(e.into());
        }
    };

    Logger::report(&rich_list.report);
    if rich_list.entries.len() < limit {
        Logger::warning(&format!(
            "Only {} of {} requested addresses have a positive balance",
            rich_list.entries.len(),
            limit
        ));
    }

    if !cli.quiet {
        Logger::rich_list(&rich_list.entries);
    }

    if let Some(path) = cli.csv {
        write_csv(&path, &rich_list.entries).context("CSV export failed")?;
        Logger::success(&format!("CSV written to {}", path.display()));
    }

    Logger::success("Done");
    Ok(())
}
