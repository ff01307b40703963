// src/sources/mod.rs
pub mod api;
pub mod board_search;
pub mod catalog;
pub mod feed;
pub mod markup;
pub mod types;

use std::time::Duration;

/// Clean scraped text: decode HTML entities, strip tags, collapse whitespace.
/// Titles and company names pass through here before entering a posting.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // Length cap: 500 chars is plenty for a title or company name.
    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }

    out
}

/// Shared HTTP client for all adapters. Browser-like UA: several of the
/// scraped boards refuse default library user agents.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    let user_agent =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_tags_and_entities() {
        let s = "  <b>Junior&nbsp;Developer</b> &amp; QA  ";
        assert_eq!(clean_text(s), "Junior Developer & QA");
    }

    #[test]
    fn clean_text_collapses_internal_whitespace() {
        assert_eq!(clean_text("DevOps\n\t Engineer"), "DevOps Engineer");
    }
}
