//! Bitcoin rich list builder.
//!
//! Candidate addresses are scraped from several public rich-list pages, their
//! live balances are looked up through a balance API, and the result is ranked
//! by balance. See [`services::rich_list`] for the pipeline entry point.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod utils;

pub use errors::{FetchError, RetryError, RichListError, SourceError};
pub use interfaces::{AddressFormat, CandidateAddress, RankedPair};
pub use services::rich_list::{build_rich_list, RichList, RichListBuilder};
