// src/pipeline.rs
//! The run orchestrator: aggregate -> dedup -> filter -> persist, returning
//! the filtered set to the caller. Constructed once at process start; there
//! is no global registry.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::aggregate::{dedup_by_url, Aggregator};
use crate::filter::EligibilityFilter;
use crate::notify::PostingNotifier;
use crate::sources::types::CanonicalPosting;
use crate::store::JobStore;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("source_postings_total", "Postings parsed out of source payloads.");
        describe_counter!("source_errors_total", "Source fetches that failed or timed out.");
        describe_counter!("scrape_runs_total", "Completed pipeline runs.");
        describe_counter!("scrape_failed_runs_total", "Pipeline runs that errored.");
        describe_counter!(
            "postings_deduped_total",
            "Records removed as duplicate or url-less."
        );
        describe_counter!(
            "postings_filtered_total",
            "Records removed by the eligibility filter."
        );
        describe_counter!("postings_kept_total", "Records surviving a full run.");
        describe_gauge!("scrape_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

pub struct Pipeline {
    aggregator: Aggregator,
    filter: EligibilityFilter,
    store: JobStore,
    notifier: Option<Arc<dyn PostingNotifier>>,
}

impl Pipeline {
    pub fn new(
        aggregator: Aggregator,
        filter: EligibilityFilter,
        store: JobStore,
        notifier: Option<Arc<dyn PostingNotifier>>,
    ) -> Self {
        Self {
            aggregator,
            filter,
            store,
            notifier,
        }
    }

    /// Execute one full run and return the filtered set (not the persisted
    /// rows), so the caller can inspect "what came out of this run"
    /// independent of storage. Source failures are already contained below
    /// this level; a store failure is the one error that surfaces here.
    pub async fn run(&self) -> Result<Vec<CanonicalPosting>> {
        ensure_metrics_described();

        let collected = self.aggregator.collect().await;
        let collected_count = collected.len();

        let unique = dedup_by_url(collected);
        let unique_count = unique.len();

        let eligible = self.filter.apply(unique);
        let eligible_count = eligible.len();

        let processed = self
            .store
            .upsert_all(&eligible)
            .await
            .context("persisting filtered postings")?;

        counter!("postings_deduped_total").increment((collected_count - unique_count) as u64);
        counter!("postings_filtered_total").increment((unique_count - eligible_count) as u64);
        counter!("postings_kept_total").increment(eligible_count as u64);
        gauge!("scrape_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        tracing::info!(
            collected = collected_count,
            unique = unique_count,
            eligible = eligible_count,
            processed,
            "pipeline run complete"
        );

        Ok(eligible)
    }

    /// Guarded entry point for scheduled and fire-and-forget invocations:
    /// errors become an empty result set instead of propagating, and a
    /// non-empty result set is handed to the notifier. Empty results never
    /// trigger a notification.
    pub async fn run_scheduled(&self) -> Vec<CanonicalPosting> {
        counter!("scrape_runs_total").increment(1);

        let postings = match self.run().await {
            Ok(postings) => postings,
            Err(e) => {
                tracing::error!(error = ?e, "pipeline run failed");
                counter!("scrape_failed_runs_total").increment(1);
                return Vec::new();
            }
        };

        if postings.is_empty() {
            tracing::info!("no eligible postings this run; skipping notification");
        } else if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(&postings).await {
                tracing::warn!(error = ?e, "notification failed");
            }
        }

        postings
    }
}
