// tests/aggregate_scenario.rs
//! End-to-end walk of the mixed-adapter scenario: a partially failing
//! adapter, a healthy one with a cross-source duplicate, a seniority
//! exclusion, and the processed count out of the store.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use jobradar::aggregate::{dedup_by_url, Aggregator};
use jobradar::config::AppConfig;
use jobradar::filter::EligibilityFilter;
use jobradar::governor::RateGovernor;
use jobradar::sources::types::{CanonicalPosting, Flag, SourceAdapter, Transport};
use jobradar::store::JobStore;

fn posting(source: &str, title: &str, url: &str) -> CanonicalPosting {
    CanonicalPosting {
        title: title.to_string(),
        company: "Co".to_string(),
        url: url.to_string(),
        date_posted: "2025-01-06".to_string(),
        location: "Remote".to_string(),
        description: None,
        source: source.to_string(),
        flags: Vec::new(),
    }
}

/// Adapter A: three raw entries, one of which fails extraction mid-call.
/// The extraction loop skips the bad entry and keeps its two siblings.
struct PartiallyFailingAdapter;

#[async_trait]
impl SourceAdapter for PartiallyFailingAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        let raw_entries: Vec<Result<CanonicalPosting>> = vec![
            Ok(posting("A", "Junior Engineer", "https://a.example/jobs/1")),
            Err(anyhow::anyhow!("malformed entry")),
            Ok(posting("A", "Graduate Tester", "https://a.example/jobs/2")),
        ];
        let mut out = Vec::new();
        for entry in raw_entries {
            match entry {
                Ok(p) => out.push(p),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping bad entry");
                    continue;
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "A"
    }
    fn transport(&self) -> Transport {
        Transport::Feed
    }
    fn result_cap(&self) -> usize {
        20
    }
}

/// Adapter B: three postings, one sharing a url with adapter A, one with a
/// title the seniority filter rejects.
struct HealthyAdapter;

#[async_trait]
impl SourceAdapter for HealthyAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        Ok(vec![
            posting("B", "Junior Engineer", "https://a.example/jobs/1"),
            posting("B", "Director of QA", "https://b.example/jobs/7"),
            posting("B", "Entry Level Analyst", "https://b.example/jobs/8"),
        ])
    }

    fn name(&self) -> &'static str {
        "B"
    }
    fn transport(&self) -> Transport {
        Transport::JsonApi
    }
    fn result_cap(&self) -> usize {
        20
    }
}

#[tokio::test]
async fn five_then_four_then_three_then_three() {
    let aggregator = Aggregator::new(
        vec![Box::new(PartiallyFailingAdapter), Box::new(HealthyAdapter)],
        RateGovernor::new(Duration::ZERO),
        Duration::from_secs(10),
    );

    let combined = aggregator.collect().await;
    assert_eq!(combined.len(), 5);

    let unique = dedup_by_url(combined);
    assert_eq!(unique.len(), 4);
    // first-seen wins: the shared url keeps adapter A's record
    assert_eq!(
        unique
            .iter()
            .find(|p| p.url == "https://a.example/jobs/1")
            .unwrap()
            .source,
        "A"
    );

    let filter = EligibilityFilter::from_config(&AppConfig::default());
    let eligible = filter.apply(unique);
    assert_eq!(eligible.len(), 3);
    assert!(eligible.iter().all(|p| !p.title.contains("Director")));

    let store = JobStore::in_memory().await.unwrap();
    let processed = store.upsert_all(&eligible).await.unwrap();
    assert_eq!(processed, 3);
}

/// A totally failing adapter contributes nothing and leaves the others alone.
struct BrokenAdapter;

#[async_trait]
impl SourceAdapter for BrokenAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        Err(anyhow::anyhow!("connection refused"))
    }
    fn name(&self) -> &'static str {
        "Broken"
    }
    fn transport(&self) -> Transport {
        Transport::Markup
    }
    fn result_cap(&self) -> usize {
        20
    }
}

#[tokio::test]
async fn failing_adapter_leaves_n_minus_one_sources_usable() {
    let aggregator = Aggregator::new(
        vec![Box::new(BrokenAdapter), Box::new(HealthyAdapter)],
        RateGovernor::new(Duration::ZERO),
        Duration::from_secs(10),
    );
    let combined = aggregator.collect().await;
    assert_eq!(combined.len(), 3);
    assert!(combined.iter().all(|p| p.source == "B"));
}

/// Flags declared by an adapter are stamped onto every record it returns.
struct FlaggedAdapter;

#[async_trait]
impl SourceAdapter for FlaggedAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        Ok(vec![posting("Flagged", "Junior Dev", "https://f.example/1")])
    }
    fn name(&self) -> &'static str {
        "Flagged"
    }
    fn transport(&self) -> Transport {
        Transport::Feed
    }
    fn result_cap(&self) -> usize {
        20
    }
    fn flags(&self) -> &[Flag] {
        &[Flag::PreVerifiedRemote]
    }
}

#[tokio::test]
async fn aggregator_stamps_declared_flags() {
    let aggregator = Aggregator::new(
        vec![Box::new(FlaggedAdapter)],
        RateGovernor::new(Duration::ZERO),
        Duration::from_secs(10),
    );
    let combined = aggregator.collect().await;
    assert_eq!(combined[0].flags, vec![Flag::PreVerifiedRemote]);
}

/// The declared result cap bounds what an over-eager adapter contributes.
struct ChattyAdapter;

#[async_trait]
impl SourceAdapter for ChattyAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        Ok((0..10)
            .map(|i| posting("Chatty", "Junior Dev", &format!("https://c.example/{i}")))
            .collect())
    }
    fn name(&self) -> &'static str {
        "Chatty"
    }
    fn transport(&self) -> Transport {
        Transport::JsonApi
    }
    fn result_cap(&self) -> usize {
        4
    }
}

#[tokio::test]
async fn result_cap_truncates_at_the_aggregator() {
    let aggregator = Aggregator::new(
        vec![Box::new(ChattyAdapter)],
        RateGovernor::new(Duration::ZERO),
        Duration::from_secs(10),
    );
    assert_eq!(aggregator.collect().await.len(), 4);
}

/// A hung adapter is cut off by the fetch timeout instead of stalling the run.
struct HungAdapter;

#[async_trait]
impl SourceAdapter for HungAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "Hung"
    }
    fn transport(&self) -> Transport {
        Transport::Markup
    }
    fn result_cap(&self) -> usize {
        20
    }
}

#[tokio::test(start_paused = true)]
async fn hung_adapter_times_out_and_contributes_nothing() {
    let aggregator = Aggregator::new(
        vec![Box::new(HungAdapter), Box::new(HealthyAdapter)],
        RateGovernor::new(Duration::ZERO),
        Duration::from_secs(10),
    );
    let combined = aggregator.collect().await;
    assert_eq!(combined.len(), 3);
}
