use anyhow::Result;
use std::fmt;
use std::str::FromStr;

/// Rich-list pages the bot knows how to scrape.
///
/// The order of a `Vec<SourceKind>` is the merge priority used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Blockchair,
    BtcCom,
    BitInfoCharts,
}

/// How a source splits its list across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    Single,
    /// `pages` pages; page N adds `?{param}=N`, page 1 only when `query_on_first_page`.
    Query {
        param: &'static str,
        pages: u32,
        query_on_first_page: bool,
    },
}

/// What to do when one page of a paginated source exhausts its retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFailurePolicy {
    FailSource,
    /// Move on to the next page; the source only fails when no page loaded.
    SkipPage,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Blockchair, SourceKind::BtcCom, SourceKind::BitInfoCharts];

    pub fn id(&self) -> &'static str {
        match self {
            SourceKind::Blockchair => "blockchair",
            SourceKind::BtcCom => "btc_com",
            SourceKind::BitInfoCharts => "bitinfocharts",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            SourceKind::Blockchair => "https://blockchair.com/bitcoin/richest-addresses",
            SourceKind::BtcCom => "https://btc.com/stats/rich-list",
            SourceKind::BitInfoCharts => "https://bitinfocharts.com/top-100-richest-bitcoin-addresses.html",
        }
    }

    pub fn pagination(&self) -> Pagination {
        match self {
            SourceKind::Blockchair => Pagination::Query {
                param: "page",
                pages: 4,
                query_on_first_page: false,
            },
            SourceKind::BtcCom => Pagination::Query {
                param: "p",
                pages: 5,
                query_on_first_page: true,
            },
            SourceKind::BitInfoCharts => Pagination::Single,
        }
    }

    pub fn page_failure_policy(&self) -> PageFailurePolicy {
        match self {
            SourceKind::BtcCom => PageFailurePolicy::SkipPage,
            SourceKind::Blockchair | SourceKind::BitInfoCharts => PageFailurePolicy::FailSource,
        }
    }
}

impl Pagination {
    pub fn page_count(&self) -> u32 {
        match self {
            Pagination::Single => 1,
            Pagination::Query { pages, .. } => *pages,
        }
    }

    /// URL of `page` (1-based) under `base`.
    pub fn page_url(&self, base: &str, page: u32) -> String {
        match self {
            Pagination::Single => base.to_string(),
            Pagination::Query {
                query_on_first_page: false,
                ..
            } if page <= 1 => base.to_string(),
            Pagination::Query { param, .. } => {
                let separator = if base.contains('?') { '&' } else { '?' };
                format!("{}{}{}={}", base, separator, param, page)
            }
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '.'], "_");
        match normalized.as_str() {
            "blockchair" => Ok(SourceKind::Blockchair),
            "btc_com" | "btccom" => Ok(SourceKind::BtcCom),
            "bitinfocharts" => Ok(SourceKind::BitInfoCharts),
            _ => anyhow::bail!(
                "Unknown source \"{}\". Known sources: {}",
                s.trim(),
                SourceKind::ALL.map(|k| k.id()).join(", ")
            ),
        }
    }
}

/// Parse a comma-separated source list such as `"bitinfocharts,blockchair"`.
///
/// Order is preserved (it is the merge priority). Empty lists and repeats are rejected.
pub fn parse_source_list(input: &str) -> Result<Vec<SourceKind>> {
    let mut kinds = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let kind: SourceKind = part.parse()?;
        if kinds.contains(&kind) {
            anyhow::bail!("Source \"{}\" listed more than once", kind);
        }
        kinds.push(kind);
    }

    if kinds.is_empty() {
        anyhow::bail!("Source list is empty: configure at least one source");
    }
    Ok(kinds)
}
