use std::cmp::Ordering;

use crate::interfaces::RankedPair;

/// Rich list ordering: balance descending, then address ascending.
///
/// Lookups complete in arbitrary order, so ties are broken on the address to
/// keep the output reproducible.
pub fn rank_order(a: &RankedPair, b: &RankedPair) -> Ordering {
    b.balance()
        .cmp(&a.balance())
        .then_with(|| a.address().cmp(b.address()))
}

/// Keep positive balances, sort them, and cut to `limit`.
///
/// Returns fewer than `limit` entries when there are not enough positive balances.
pub fn build_ranking<I>(balances: I, limit: usize) -> Vec<RankedPair>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut ranked: Vec<RankedPair> = balances
        .into_iter()
        .filter(|(_, balance)| *balance > 0)
        .map(|(address, balance)| RankedPair::new(address, balance))
        .collect();

    ranked.sort_unstable_by(rank_order);
    ranked.truncate(limit);
    ranked
}
