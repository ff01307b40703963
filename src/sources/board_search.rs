// src/sources/board_search.rs
//! Adapter for the external multi-board search service. The service fans a
//! query out to the big boards and returns merged JSON; from this side it is
//! one opaque source that happens to take a search term. The adapter walks
//! the configured search-term list and concatenates the answers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::sources::clean_text;
use crate::sources::types::{CanonicalPosting, SourceAdapter, Transport};

const NAME: &str = "Board Search";

enum Mode {
    Fixture(Vec<String>),
    Http {
        endpoint: String,
        client: reqwest::Client,
    },
}

pub struct BoardSearchAdapter {
    search_terms: Vec<String>,
    location: String,
    results_per_term: usize,
    cap: usize,
    mode: Mode,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchJob {
    title: Option<String>,
    company: Option<String>,
    job_url: Option<String>,
    date_posted: Option<String>,
    location: Option<String>,
    description: Option<String>,
}

impl BoardSearchAdapter {
    pub fn from_endpoint(
        endpoint: String,
        search_terms: Vec<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            search_terms,
            location: "Remote".to_string(),
            results_per_term: 20,
            cap: 100,
            mode: Mode::Http { endpoint, client },
        }
    }

    /// One canned response body per configured search term.
    pub fn from_fixtures(search_terms: Vec<String>, bodies: Vec<String>) -> Self {
        Self {
            search_terms,
            location: "Remote".to_string(),
            results_per_term: 20,
            cap: 100,
            mode: Mode::Fixture(bodies),
        }
    }

    pub fn with_caps(mut self, cap: usize, results_per_term: usize) -> Self {
        self.cap = cap;
        self.results_per_term = results_per_term;
        self
    }

    async fn body_for_term(&self, term: &str, index: usize) -> Result<String> {
        match &self.mode {
            Mode::Fixture(bodies) => bodies
                .get(index)
                .cloned()
                .with_context(|| format!("no fixture body for term {term:?}")),
            Mode::Http { endpoint, client } => {
                let resp = client
                    .get(endpoint)
                    .query(&[
                        ("search_term", term),
                        ("location", self.location.as_str()),
                        ("results_wanted", &self.results_per_term.to_string()),
                    ])
                    .send()
                    .await
                    .with_context(|| format!("searching boards for {term:?}"))?;
                resp.error_for_status_ref()
                    .with_context(|| format!("board search status for {term:?}"))?;
                resp.text()
                    .await
                    .with_context(|| format!("board search body for {term:?}"))
            }
        }
    }

    fn parse_body(&self, body: &str) -> Result<Vec<CanonicalPosting>> {
        let envelope: SearchEnvelope =
            serde_json::from_str(body).context("decoding board search envelope")?;

        let mut out = Vec::with_capacity(envelope.jobs.len().min(self.results_per_term));
        for raw in envelope.jobs.into_iter().take(self.results_per_term) {
            let job: SearchJob = match serde_json::from_value(raw) {
                Ok(job) => job,
                Err(e) => {
                    tracing::debug!(source = NAME, error = %e, "skipping malformed search hit");
                    continue;
                }
            };
            out.push(CanonicalPosting {
                title: clean_text(job.title.as_deref().unwrap_or_default()),
                company: job
                    .company
                    .map(|c| clean_text(&c))
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| NAME.to_string()),
                url: job.job_url.unwrap_or_default(),
                date_posted: job.date_posted.unwrap_or_default(),
                location: job.location.unwrap_or_else(|| self.location.clone()),
                description: job.description,
                source: NAME.to_string(),
                flags: Vec::new(),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for BoardSearchAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        let mut out = Vec::new();
        let mut first_err: Option<anyhow::Error> = None;

        for (index, term) in self.search_terms.iter().enumerate() {
            let parsed = match self.body_for_term(term, index).await {
                Ok(body) => self.parse_body(&body),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(mut items) => out.append(&mut items),
                Err(e) => {
                    // A term that fails must not cost us the other terms.
                    tracing::warn!(source = NAME, term = %term, error = ?e, "search term failed");
                    first_err.get_or_insert(e);
                }
            }
            if out.len() >= self.cap {
                break;
            }
        }

        if out.is_empty() {
            if let Some(e) = first_err {
                return Err(e);
            }
        }

        out.truncate(self.cap);
        counter!("source_postings_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn transport(&self) -> Transport {
        Transport::JsonApi
    }

    fn result_cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"jobs": [
        {"title": "Junior DevOps", "company": "Acme", "job_url": "https://b.example/1",
         "date_posted": "2025-01-02", "location": "Remote",
         "description": "Entry level role, CI/CD focus."}
    ]}"#;

    #[tokio::test]
    async fn walks_every_search_term() {
        let adapter = BoardSearchAdapter::from_fixtures(
            vec!["Junior DevOps".into(), "Graduate Engineer".into()],
            vec![BODY.to_string(), BODY.to_string()],
        );
        let out = adapter.fetch().await.unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.source == "Board Search"));
        assert!(out[0].description.is_some());
    }

    #[tokio::test]
    async fn one_failing_term_keeps_the_rest() {
        let adapter = BoardSearchAdapter::from_fixtures(
            vec!["a".into(), "b".into()],
            vec!["{broken".to_string(), BODY.to_string()],
        );
        let out = adapter.fetch().await.unwrap();
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn all_terms_failing_is_an_error() {
        let adapter = BoardSearchAdapter::from_fixtures(
            vec!["a".into()],
            vec!["{broken".to_string()],
        );
        assert!(adapter.fetch().await.is_err());
    }
}
