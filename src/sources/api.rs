// src/sources/api.rs
//! JSON-API-based source adapters. Payloads are decoded envelope-first, then
//! entry by entry: a malformed entry is skipped with a debug log while its
//! siblings survive.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::sources::clean_text;
use crate::sources::types::{CanonicalPosting, Flag, SourceAdapter, Transport};

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl Mode {
    async fn body(&self, source: &str) -> Result<String> {
        match self {
            Mode::Fixture(body) => Ok(body.clone()),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{source}: GET {url}"))?;
                resp.error_for_status_ref()
                    .with_context(|| format!("{source}: status for {url}"))?;
                resp.text()
                    .await
                    .with_context(|| format!("{source}: body of {url}"))
            }
        }
    }
}

/// Remote-jobs API in the Jobicy shape: `{"jobs": [{camelCase fields}]}`.
pub struct RemoteApiAdapter {
    name: &'static str,
    cap: usize,
    flag_set: Vec<Flag>,
    mode: Mode,
}

#[derive(Debug, Deserialize)]
struct RemoteApiEnvelope {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteApiJob {
    job_title: Option<String>,
    company_name: Option<String>,
    url: Option<String>,
    pub_date: Option<String>,
    job_geo: Option<String>,
}

impl RemoteApiAdapter {
    pub fn from_url(name: &'static str, url: String, client: reqwest::Client) -> Self {
        Self {
            name,
            cap: 20,
            flag_set: Vec::new(),
            mode: Mode::Http { url, client },
        }
    }

    pub fn from_fixture(name: &'static str, body: &str) -> Self {
        Self {
            name,
            cap: 20,
            flag_set: Vec::new(),
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_flags(mut self, flags: &[Flag]) -> Self {
        self.flag_set = flags.to_vec();
        self
    }
}

#[async_trait]
impl SourceAdapter for RemoteApiAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        let body = self.mode.body(self.name).await?;
        let envelope: RemoteApiEnvelope = serde_json::from_str(&body)
            .with_context(|| format!("{}: decoding jobs envelope", self.name))?;

        let mut out = Vec::with_capacity(envelope.jobs.len().min(self.cap));
        for raw in envelope.jobs.into_iter().take(self.cap) {
            let job: RemoteApiJob = match serde_json::from_value(raw) {
                Ok(job) => job,
                Err(e) => {
                    tracing::debug!(source = self.name, error = %e, "skipping malformed entry");
                    continue;
                }
            };
            out.push(CanonicalPosting {
                title: clean_text(job.job_title.as_deref().unwrap_or_default()),
                company: job
                    .company_name
                    .map(|c| clean_text(&c))
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| self.name.to_string()),
                url: job.url.unwrap_or_default(),
                date_posted: job.pub_date.unwrap_or_default(),
                location: job.job_geo.unwrap_or_else(|| "Remote".to_string()),
                description: None,
                source: self.name.to_string(),
                flags: Vec::new(),
            });
        }

        counter!("source_postings_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn transport(&self) -> Transport {
        Transport::JsonApi
    }

    fn result_cap(&self) -> usize {
        self.cap
    }

    fn flags(&self) -> &[Flag] {
        &self.flag_set
    }
}

/// National job-board API in the Platsbanken (JobTech JobSearch) shape:
/// `{"hits": [{snake_case fields, nested employer/workplace_address}]}`.
pub struct NationalBoardAdapter {
    name: &'static str,
    cap: usize,
    flag_set: Vec<Flag>,
    fallback_location: &'static str,
    mode: Mode,
}

#[derive(Debug, Deserialize)]
struct NationalEnvelope {
    #[serde(default)]
    hits: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct NationalHit {
    headline: Option<String>,
    webpage_url: Option<String>,
    publication_date: Option<String>,
    employer: Option<NationalEmployer>,
    workplace_address: Option<NationalWorkplace>,
    description: Option<NationalDescription>,
}

#[derive(Debug, Deserialize)]
struct NationalEmployer {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NationalWorkplace {
    municipality: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NationalDescription {
    text: Option<String>,
}

impl NationalBoardAdapter {
    pub fn from_url(name: &'static str, url: String, client: reqwest::Client) -> Self {
        Self {
            name,
            cap: 20,
            flag_set: Vec::new(),
            fallback_location: "Sverige",
            mode: Mode::Http { url, client },
        }
    }

    pub fn from_fixture(name: &'static str, body: &str) -> Self {
        Self {
            name,
            cap: 20,
            flag_set: Vec::new(),
            fallback_location: "Sverige",
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_flags(mut self, flags: &[Flag]) -> Self {
        self.flag_set = flags.to_vec();
        self
    }
}

#[async_trait]
impl SourceAdapter for NationalBoardAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        let body = self.mode.body(self.name).await?;
        let envelope: NationalEnvelope = serde_json::from_str(&body)
            .with_context(|| format!("{}: decoding hits envelope", self.name))?;

        let mut out = Vec::with_capacity(envelope.hits.len().min(self.cap));
        for raw in envelope.hits.into_iter().take(self.cap) {
            let hit: NationalHit = match serde_json::from_value(raw) {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::debug!(source = self.name, error = %e, "skipping malformed hit");
                    continue;
                }
            };
            out.push(CanonicalPosting {
                title: clean_text(hit.headline.as_deref().unwrap_or_default()),
                company: hit
                    .employer
                    .and_then(|e| e.name)
                    .map(|n| clean_text(&n))
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| self.name.to_string()),
                url: hit.webpage_url.unwrap_or_default(),
                date_posted: hit.publication_date.unwrap_or_default(),
                location: hit
                    .workplace_address
                    .and_then(|w| w.municipality)
                    .unwrap_or_else(|| self.fallback_location.to_string()),
                description: hit.description.and_then(|d| d.text),
                source: self.name.to_string(),
                flags: Vec::new(),
            });
        }

        counter!("source_postings_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn transport(&self) -> Transport {
        Transport::JsonApi
    }

    fn result_cap(&self) -> usize {
        self.cap
    }

    fn flags(&self) -> &[Flag] {
        &self.flag_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remote_api_skips_malformed_entry() {
        let body = r#"{"jobs": [
            {"jobTitle": "Junior Data Scientist", "companyName": "Acme", "url": "https://j.example/1", "pubDate": "2025-01-03"},
            {"jobTitle": {"nested": "wrong type"}},
            {"jobTitle": "Graduate Engineer", "url": "https://j.example/2"}
        ]}"#;
        let adapter = RemoteApiAdapter::from_fixture("Jobicy", body);
        let out = adapter.fetch().await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].company, "Jobicy");
        assert_eq!(out[1].location, "Remote");
    }

    #[tokio::test]
    async fn national_board_reads_nested_fields() {
        let body = r#"{"hits": [
            {"headline": "Junior utvecklare", "webpage_url": "https://pb.example/1",
             "publication_date": "2025-01-04T08:00:00",
             "employer": {"name": "Firma AB"},
             "workplace_address": {"municipality": "Stockholm"},
             "description": {"text": "Vi söker en junior utvecklare."}}
        ]}"#;
        let adapter = NationalBoardAdapter::from_fixture("Platsbanken", body);
        let out = adapter.fetch().await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company, "Firma AB");
        assert_eq!(out[0].location, "Stockholm");
        assert!(out[0].description.as_deref().unwrap().contains("junior"));
    }

    #[tokio::test]
    async fn garbage_envelope_is_an_error() {
        let adapter = RemoteApiAdapter::from_fixture("Jobicy", "not json");
        assert!(adapter.fetch().await.is_err());
    }
}
