use anyhow::{Context, Result};
use std::path::Path;

use crate::interfaces::RankedPair;

pub const SATS_PER_BTC: u64 = 100_000_000;

/// Telegram rejects messages above 4096 characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;
pub const ENTRIES_PER_MESSAGE: usize = 25;

/// Satoshi as BTC with exactly 8 decimals.
pub fn format_btc(sats: u64) -> String {
    format!("{}.{:08}", sats / SATS_PER_BTC, sats % SATS_PER_BTC)
}

/// One HTML line of a chat message, `rank` is 1-based.
pub fn format_rank_line(rank: usize, pair: &RankedPair) -> String {
    format!(
        "{:>3}. <code>{}</code> - <b>{}</b> BTC",
        rank,
        pair.address(),
        format_btc(pair.balance())
    )
}

/// Split the list into chat messages of at most `per_batch` lines and `max_chars` characters.
///
/// Ranks continue across batches.
pub fn render_batches(pairs: &[RankedPair], per_batch: usize, max_chars: usize) -> Vec<String> {
    let per_batch = per_batch.max(1);
    let mut batches = Vec::new();
    let mut current = String::new();
    let mut lines = 0;

    for (index, pair) in pairs.iter().enumerate() {
        let line = format_rank_line(index + 1, pair);
        let needed = if current.is_empty() {
            line.chars().count()
        } else {
            current.chars().count() + 1 + line.chars().count()
        };

        if lines > 0 && (lines >= per_batch || needed > max_chars) {
            batches.push(std::mem::take(&mut current));
            lines = 0;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
        lines += 1;
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// CSV export: `rank,address,balance_btc`.
pub fn to_csv_bytes(pairs: &[RankedPair]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["rank", "address", "balance_btc"])?;
    for (index, pair) in pairs.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            pair.address().to_string(),
            format_btc(pair.balance()),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV output: {}", e.error()))
}

pub fn write_csv(path: &Path, pairs: &[RankedPair]) -> Result<()> {
    let bytes = to_csv_bytes(pairs)?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
