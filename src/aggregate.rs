// src/aggregate.rs
//! Runs the full adapter set and merges the results into one working
//! sequence. This is the failure boundary for individual sources: an error
//! or timeout from one adapter degrades to zero records from that adapter,
//! and the other N-1 sources remain usable.

use std::collections::HashSet;
use std::time::Duration;

use metrics::counter;

use crate::governor::RateGovernor;
use crate::sources::types::{CanonicalPosting, SourceAdapter};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Aggregator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    governor: RateGovernor,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        governor: RateGovernor,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            adapters,
            governor,
            fetch_timeout,
        }
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Invoke every adapter, contain its failures, cap its results, and stamp
    /// its declared flags onto each record.
    pub async fn collect(&self) -> Vec<CanonicalPosting> {
        let mut combined = Vec::new();

        for adapter in &self.adapters {
            self.governor.wait_turn(adapter.name()).await;

            let fetched =
                match tokio::time::timeout(self.fetch_timeout, adapter.fetch()).await {
                    Ok(Ok(postings)) => postings,
                    Ok(Err(e)) => {
                        tracing::warn!(source = adapter.name(), error = ?e, "source fetch failed");
                        counter!("source_errors_total").increment(1);
                        Vec::new()
                    }
                    Err(_) => {
                        tracing::warn!(
                            source = adapter.name(),
                            timeout_secs = self.fetch_timeout.as_secs(),
                            "source fetch timed out"
                        );
                        counter!("source_errors_total").increment(1);
                        Vec::new()
                    }
                };

            let flags = adapter.flags().to_vec();
            for mut posting in fetched.into_iter().take(adapter.result_cap()) {
                posting.flags = flags.clone();
                combined.push(posting);
            }
        }

        combined
    }
}

/// Collapse records describing the same posting. Records without a url are
/// dropped first (they cannot be merged or persisted); afterwards the first
/// occurrence of each url wins, order preserved.
pub fn dedup_by_url(postings: Vec<CanonicalPosting>) -> Vec<CanonicalPosting> {
    let mut seen: HashSet<String> = HashSet::new();
    postings
        .into_iter()
        .filter(|p| !p.url.is_empty() && seen.insert(p.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::types::CanonicalPosting;

    fn posting(url: &str, source: &str) -> CanonicalPosting {
        CanonicalPosting {
            url: url.to_string(),
            ..CanonicalPosting::for_source(source)
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let input = vec![
            posting("https://a.example/1", "A"),
            posting("https://a.example/2", "A"),
            posting("https://a.example/1", "B"),
        ];
        let out = dedup_by_url(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source, "A");
    }

    #[test]
    fn empty_urls_never_survive() {
        let input = vec![posting("", "A"), posting("", "B"), posting("https://x/1", "C")];
        let out = dedup_by_url(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://x/1");
    }

    #[test]
    fn query_parameter_variants_stay_distinct() {
        let input = vec![
            posting("https://x/1?ref=feed", "A"),
            posting("https://x/1?ref=api", "B"),
        ];
        assert_eq!(dedup_by_url(input).len(), 2);
    }
}
