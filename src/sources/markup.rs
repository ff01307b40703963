// src/sources/markup.rs
//! Markup-scraping source adapters, driven by a per-board selector spec.
//! Success is per-record here: a card missing its title or link is skipped,
//! the rest of the page still counts.
//!
//! `scraper::Html` is not `Send`, so all parsing happens in sync helpers
//! after the response body has been awaited.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use scraper::{Html, Selector};

use crate::sources::clean_text;
use crate::sources::types::{CanonicalPosting, Flag, SourceAdapter, Transport};

/// CSS selectors describing one board's listing page.
#[derive(Debug, Clone)]
pub struct SelectorSpec {
    /// Matches one job card.
    pub listing: &'static str,
    /// Title element inside a card.
    pub title: &'static str,
    /// Company element inside a card; boards without one fall back to the
    /// board's display name.
    pub company: Option<&'static str>,
    /// Anchor carrying the posting link inside a card.
    pub link: &'static str,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

pub struct MarkupAdapter {
    name: &'static str,
    base: &'static str,
    spec: SelectorSpec,
    location: &'static str,
    cap: usize,
    flag_set: Vec<Flag>,
    mode: Mode,
}

impl MarkupAdapter {
    pub fn from_url(
        name: &'static str,
        url: String,
        base: &'static str,
        spec: SelectorSpec,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name,
            base,
            spec,
            location: "Remote",
            cap: 20,
            flag_set: Vec::new(),
            mode: Mode::Http { url, client },
        }
    }

    pub fn from_fixture(
        name: &'static str,
        html: &str,
        base: &'static str,
        spec: SelectorSpec,
    ) -> Self {
        Self {
            name,
            base,
            spec,
            location: "Remote",
            cap: 20,
            flag_set: Vec::new(),
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn with_location(mut self, location: &'static str) -> Self {
        self.location = location;
        self
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_flags(mut self, flags: &[Flag]) -> Self {
        self.flag_set = flags.to_vec();
        self
    }

    fn parse_listings(&self, html: &str) -> Result<Vec<CanonicalPosting>> {
        let listing = parse_selector(self.spec.listing)?;
        let title_sel = parse_selector(self.spec.title)?;
        let link_sel = parse_selector(self.spec.link)?;
        let company_sel = self.spec.company.map(parse_selector).transpose()?;

        let document = Html::parse_document(html);
        // Scraped boards rarely expose a machine-readable date; stamp the day
        // we saw the listing, like the stored CSV exports always did.
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

        let mut out = Vec::new();
        for card in document.select(&listing).take(self.cap) {
            let title = card
                .select(&title_sel)
                .next()
                .map(|el| clean_text(&el.text().collect::<String>()))
                .filter(|t| !t.is_empty());
            let href = card
                .select(&link_sel)
                .next()
                .and_then(|el| el.value().attr("href"));

            let (Some(title), Some(href)) = (title, href) else {
                // Incomplete card; keep the rest of the page.
                continue;
            };
            let Some(url) = absolutize(self.base, href) else {
                continue;
            };

            let company = company_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .map(|el| clean_text(&el.text().collect::<String>()))
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| self.name.to_string());

            out.push(CanonicalPosting {
                title,
                company,
                url,
                date_posted: today.clone(),
                location: self.location.to_string(),
                description: None,
                source: self.name.to_string(),
                flags: Vec::new(),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for MarkupAdapter {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>> {
        let body = match &self.mode {
            Mode::Fixture(html) => html.clone(),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{}: GET {url}", self.name))?;
                resp.error_for_status_ref()
                    .with_context(|| format!("{}: status for {url}", self.name))?;
                resp.text()
                    .await
                    .with_context(|| format!("{}: body of {url}", self.name))?
            }
        };

        let out = self.parse_listings(&body)?;
        counter!("source_postings_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn transport(&self) -> Transport {
        Transport::Markup
    }

    fn result_cap(&self) -> usize {
        self.cap
    }

    fn flags(&self) -> &[Flag] {
        &self.flag_set
    }
}

fn parse_selector(s: &'static str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("invalid selector {s:?}: {e}"))
}

fn absolutize(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    url::Url::parse(base).ok()?.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SelectorSpec {
        SelectorSpec {
            listing: "div.job",
            title: "h3",
            company: Some("span.company"),
            link: "a",
        }
    }

    const PAGE: &str = r#"<html><body>
      <div class="job">
        <h3>Junior Rust Developer</h3>
        <span class="company">Acme</span>
        <a href="/jobs/rust-junior">view</a>
      </div>
      <div class="job">
        <h3>Graduate Tester</h3>
        <a href="https://other.example/jobs/2">view</a>
      </div>
      <div class="job"><h3>Broken card, no link</h3></div>
    </body></html>"#;

    #[tokio::test]
    async fn parses_cards_and_absolutizes_links() {
        let adapter =
            MarkupAdapter::from_fixture("TestBoard", PAGE, "https://board.example", spec());
        let out = adapter.fetch().await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://board.example/jobs/rust-junior");
        assert_eq!(out[1].url, "https://other.example/jobs/2");
        // no company selector hit: board name steps in
        assert_eq!(out[1].company, "TestBoard");
    }

    #[tokio::test]
    async fn cap_limits_cards() {
        let adapter = MarkupAdapter::from_fixture("TestBoard", PAGE, "https://board.example", spec())
            .with_cap(1);
        let out = adapter.fetch().await.unwrap();
        assert_eq!(out.len(), 1);
    }
}
