//! Common test utilities and helpers
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use btc_richlist_bot::errors::{FetchError, RetryError, SourceError};
use btc_richlist_bot::interfaces::{AddressFormat, CandidateAddress};
use btc_richlist_bot::services::{BalanceLookup, CandidateSource};
use btc_richlist_bot::utils::fetch_data::HttpFetch;

pub const GENESIS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
pub const SEGWIT: &str = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh";

const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Distinct, format-valid legacy address number `i` (i < 58 * 58).
pub fn legacy_address(i: usize) -> String {
    format!(
        "1BoatSLRHtKNngkdXEeobR76b53LETt{}{}",
        BASE58[(i / 58) % 58] as char,
        BASE58[i % 58] as char
    )
}

pub fn candidate(address: &str) -> CandidateAddress {
    let format = if address.starts_with("bc1") {
        AddressFormat::Segwit
    } else {
        AddressFormat::Legacy
    };
    CandidateAddress {
        address: address.to_string(),
        format,
    }
}

/// A rich-list page linking every address to an explorer detail page, plus navigation noise.
pub fn rich_list_page(addresses: &[String]) -> String {
    let rows: String = addresses
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "<tr><td>{}</td><td><a href=\"/bitcoin/address/{}\">{}</a></td><td>1,000 BTC</td></tr>",
                i + 1,
                a,
                a
            )
        })
        .collect();
    format!(
        "<html><body><nav><a href=\"/\">Home</a><a href=\"/bitcoin/blocks\">Blocks</a></nav>\
         <table>{}</table><a href=\"?page=2\">Next</a></body></html>",
        rows
    )
}

#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Status(u16),
    /// Wait, then answer with the inner reply.
    Delayed(Duration, Box<Reply>),
}

/// Scripted [`HttpFetch`]: each URL answers with its queued replies in order,
/// the last reply repeats. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeHttp {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), replies.into_iter().collect());
        self
    }

    pub fn page(self, url: impl Into<String>, html: String) -> Self {
        self.route(url, vec![Reply::Body(html)])
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn next_reply(&self, url: &str) -> Reply {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404)),
            None => Reply::Status(404),
        }
    }
}

#[async_trait]
impl HttpFetch for FakeHttp {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut reply = self.next_reply(url);
        loop {
            match reply {
                Reply::Body(body) => return Ok(body),
                Reply::Status(status) => {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    })
                }
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Script {
    Balance(u64),
    /// Fail `failures` times, then answer.
    Flaky { failures: usize, balance: u64 },
    AlwaysFail,
}

/// Scripted [`BalanceLookup`] that also records how many lookups overlap.
pub struct ScriptedLookup {
    scripts: HashMap<String, Script>,
    latency: Duration,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedLookup {
    pub fn new(scripts: impl IntoIterator<Item = (String, Script)>) -> Self {
        Self {
            scripts: scripts.into_iter().collect(),
            latency: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self, address: &str) -> usize {
        self.calls.lock().unwrap().get(address).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceLookup for ScriptedLookup {
    async fn balance_of(&self, address: &str) -> Result<u64, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(address.to_string()).or_default();
            *count += 1;
            *count
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = || FetchError::Status {
            url: format!("https://lookup.test/{}", address),
            status: 500,
        };
        match self.scripts.get(address).copied().unwrap_or(Script::AlwaysFail) {
            Script::Balance(balance) => Ok(balance),
            Script::Flaky { failures, balance } if call > failures => Ok(balance),
            Script::Flaky { .. } | Script::AlwaysFail => Err(failure()),
        }
    }
}

/// [`CandidateSource`] returning a fixed answer after an optional delay.
pub struct StaticSource {
    id: String,
    addresses: Option<Vec<String>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(id: &str, addresses: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            addresses: Some(addresses),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails.
    pub fn failing(id: &str) -> Self {
        Self {
            id: id.to_string(),
            addresses: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateSource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_candidates(&self, max: usize) -> Result<Vec<CandidateAddress>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.addresses {
            Some(addresses) => Ok(addresses.iter().take(max).map(|a| candidate(a)).collect()),
            None => Err(SourceError::PageFailed {
                source_id: self.id.clone(),
                page: 1,
                error: RetryError::Exhausted {
                    attempts: 3,
                    last: FetchError::Status {
                        url: format!("https://{}.test/", self.id),
                        status: 503,
                    },
                },
            }),
        }
    }
}
