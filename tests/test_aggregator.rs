//! Integration tests for merging candidate sources

mod common;

use std::sync::Arc;
use std::time::Duration;

use btc_richlist_bot::config::AggregatorSettings;
use btc_richlist_bot::errors::{RichListError, SourceError};
use btc_richlist_bot::interfaces::SourceOutcome;
use btc_richlist_bot::services::{CandidateAggregator, CandidateSource};
use common::{legacy_address, StaticSource};
use tokio::time::Instant;

fn aggregator(sources: Vec<Arc<dyn CandidateSource>>, max_per_source: usize, max_candidates: usize) -> CandidateAggregator {
    CandidateAggregator::new(sources, max_per_source, AggregatorSettings { max_candidates })
}

fn addresses(indices: &[usize]) -> Vec<String> {
    indices.iter().copied().map(legacy_address).collect()
}

#[tokio::test(start_paused = true)]
async fn test_merge_follows_priority_and_drops_repeats() {
    // the slower first source still wins the merge order
    let sources: Vec<Arc<dyn CandidateSource>> = vec![
        Arc::new(StaticSource::new("first", addresses(&[1, 2, 3])).with_delay(Duration::from_secs(5))),
        Arc::new(StaticSource::new("second", addresses(&[3, 4, 1, 5]))),
    ];

    let aggregation = aggregator(sources, 200, 5_000)
        .collect(None)
        .await
        .unwrap();

    let got: Vec<String> = aggregation.candidates.into_iter().map(|c| c.address).collect();
    assert_eq!(got, addresses(&[1, 2, 3, 4, 5]));
    assert!(matches!(
        &aggregation.outcomes[..],
        [
            SourceOutcome::Collected { count: 3, .. },
            SourceOutcome::Collected { count: 4, .. }
        ]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_failing_source_is_skipped() {
    let sources: Vec<Arc<dyn CandidateSource>> = vec![
        Arc::new(StaticSource::failing("blockchair")),
        Arc::new(StaticSource::new("btc_com", addresses(&[7, 8]))),
        Arc::new(StaticSource::new("bitinfocharts", vec![])),
    ];

    let aggregation = aggregator(sources, 200, 5_000).collect(None).await.unwrap();

    assert_eq!(aggregation.candidates.len(), 2);
    let ids: Vec<&str> = aggregation.outcomes.iter().map(|o| o.source_id()).collect();
    assert_eq!(ids, vec!["blockchair", "btc_com", "bitinfocharts"]);
    assert!(aggregation.outcomes[0].is_skipped());
    assert!(matches!(aggregation.outcomes[2], SourceOutcome::Empty { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_all_sources_failing_is_fatal() {
    let sources: Vec<Arc<dyn CandidateSource>> = vec![
        Arc::new(StaticSource::failing("blockchair")),
        Arc::new(StaticSource::failing("btc_com")),
        Arc::new(StaticSource::failing("bitinfocharts")),
    ];

    let err = aggregator(sources, 200, 5_000).collect(None).await.unwrap_err();

    match err {
        RichListError::NoCandidates { outcomes } => {
            assert_eq!(outcomes.len(), 3);
            assert!(outcomes.iter().all(SourceOutcome::is_skipped));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_only_empty_sources_is_fatal() {
    let sources: Vec<Arc<dyn CandidateSource>> = vec![Arc::new(StaticSource::new("quiet", vec![]))];

    let err = aggregator(sources, 200, 5_000).collect(None).await.unwrap_err();

    assert!(matches!(err, RichListError::NoCandidates { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_per_source_and_global_caps() {
    let sources: Vec<Arc<dyn CandidateSource>> = vec![
        Arc::new(StaticSource::new("first", (0..50).map(legacy_address).collect())),
        Arc::new(StaticSource::new("second", (100..150).map(legacy_address).collect())),
    ];

    let aggregation = aggregator(sources, 30, 45).collect(None).await.unwrap();

    let got: Vec<String> = aggregation.candidates.into_iter().map(|c| c.address).collect();
    let mut want: Vec<String> = (0..30).map(legacy_address).collect();
    want.extend((100..115).map(legacy_address));
    assert_eq!(got, want);
}

#[tokio::test(start_paused = true)]
async fn test_slow_source_is_cut_off_at_deadline() {
    let sources: Vec<Arc<dyn CandidateSource>> = vec![
        Arc::new(StaticSource::new("slow", addresses(&[3])).with_delay(Duration::from_secs(600))),
        Arc::new(StaticSource::new("fast", addresses(&[1, 2]))),
    ];

    let deadline = Instant::now() + Duration::from_secs(30);
    let aggregation = aggregator(sources, 200, 5_000)
        .collect(Some(deadline))
        .await
        .unwrap();

    // nothing from the cut-off source survives
    let got: Vec<String> = aggregation.candidates.into_iter().map(|c| c.address).collect();
    assert_eq!(got, addresses(&[1, 2]));
    match &aggregation.outcomes[0] {
        SourceOutcome::Skipped { error, .. } => {
            assert!(matches!(error, SourceError::DeadlineExceeded { .. }));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
