//! Candidate address extraction from rich-list HTML.
//!
//! Pages are not parsed against a schema. Every `<a href>` is inspected: links
//! into an address-detail page give the address from the URL, other links are
//! considered only when their visible text is address-sized. Whatever comes out
//! must pass one of the two format grammars.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use scraper::{Html, Selector};

use crate::interfaces::{AddressFormat, CandidateAddress};

/// Path markers of address-detail pages on known explorers.
pub const ADDRESS_PATH_MARKERS: &[&str] = &["/address/", "/btc/address/", "/bitcoin/address/", "/wallet/"];

/// Link texts shorter than this are labels, not addresses.
pub const MIN_TEXT_CANDIDATE_LEN: usize = 26;

// base58 without 0, O, I, l; 26-35 chars in total
static LEGACY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[13][a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("legacy address pattern"));

// bech32 data charset (no 1, b, i, o); 26-84 chars in total
static SEGWIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(bc1|tb1)[02-9ac-hj-np-z]{23,81}$").expect("segwit address pattern"));

/// Format family of `token`, or `None` when it matches neither grammar.
pub fn classify_address(token: &str) -> Option<AddressFormat> {
    let token = token.trim();
    if LEGACY_RE.is_match(token) {
        Some(AddressFormat::Legacy)
    } else if SEGWIT_RE.is_match(token) {
        Some(AddressFormat::Segwit)
    } else {
        None
    }
}

/// Token an anchor points at: the path component after an address marker, else the
/// link text when it is long enough. A marker match never falls back to the text.
fn candidate_token<'a>(href: &'a str, text: &'a str) -> Option<&'a str> {
    for marker in ADDRESS_PATH_MARKERS {
        if let Some(pos) = href.rfind(marker) {
            let tail = &href[pos + marker.len()..];
            let end = tail.find(['?', '#', '/']).unwrap_or(tail.len());
            return Some(&tail[..end]);
        }
    }

    (text.chars().count() >= MIN_TEXT_CANDIDATE_LEN).then_some(text)
}

/// Candidates in `html`, deduplicated, in order of first appearance.
pub fn extract_addresses(html: &str) -> Vec<CandidateAddress> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("static selector");

    let mut seen = FxHashSet::default();
    let mut candidates = Vec::new();

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text: String = anchor.text().collect();

        let Some(token) = candidate_token(href.trim(), text.trim()) else {
            continue;
        };
        let token = token.trim();
        let Some(format) = classify_address(token) else {
            continue;
        };

        if seen.insert(token.to_string()) {
            candidates.push(CandidateAddress {
                address: token.to_string(),
                format,
            });
        }
    }

    candidates
}
