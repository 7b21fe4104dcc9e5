pub mod extractor;
pub mod sources;
pub mod aggregator;
pub mod resolver;
pub mod ranking;
pub mod rich_list;

pub use extractor::{classify_address, extract_addresses};
pub use sources::{build_sources, CandidateSource, HtmlListSource};
pub use aggregator::{Aggregation, CandidateAggregator};
pub use resolver::{BalanceLookup, BalanceResolver, BlockchainInfoLookup, Resolution};
pub use ranking::build_ranking;
pub use rich_list::{build_rich_list, RichList, RichListBuilder};
