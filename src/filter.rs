// src/filter.rs
//! Eligibility classification. Both checks are lower-cased substring
//! containment over configured keyword lists — deliberately not tokenized.
//! Cheap and high-recall, with known false positives ("US Only" matches
//! anywhere inside a longer string); changing this to word-boundary matching
//! would silently change which postings survive.

use crate::config::AppConfig;
use crate::sources::types::{CanonicalPosting, Flag};

pub struct EligibilityFilter {
    location_exclusions: Vec<String>,
    seniority_exclusions: Vec<String>,
    entry_level_keywords: Vec<String>,
}

impl EligibilityFilter {
    pub fn new(
        location_exclusions: &[String],
        seniority_exclusions: &[String],
        entry_level_keywords: &[String],
    ) -> Self {
        let lower = |list: &[String]| {
            list.iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        };
        Self {
            location_exclusions: lower(location_exclusions),
            seniority_exclusions: lower(seniority_exclusions),
            entry_level_keywords: lower(entry_level_keywords),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            &cfg.location_exclusions,
            &cfg.seniority_exclusions,
            &cfg.entry_level_keywords,
        )
    }

    /// Permissive-by-default: a posting is kept unless its location or
    /// description names an explicit exclusion. Local-market and
    /// pre-verified-remote sources skip the check entirely.
    pub fn location_eligible(&self, posting: &CanonicalPosting) -> bool {
        if posting
            .flags
            .iter()
            .any(|f| matches!(f, Flag::LocalMarket | Flag::PreVerifiedRemote))
        {
            return true;
        }

        let location = posting.location.to_lowercase();
        let description = posting
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        !self
            .location_exclusions
            .iter()
            .any(|kw| location.contains(kw) || description.contains(kw))
    }

    /// Seniority exclusions always win; otherwise an entry-level keyword
    /// includes immediately; otherwise keep the posting, since the upstream
    /// queries were already scoped to entry-level terms.
    pub fn seniority_eligible(&self, posting: &CanonicalPosting) -> bool {
        let title = posting.title.to_lowercase();
        let description = posting
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        if self
            .seniority_exclusions
            .iter()
            .any(|kw| title.contains(kw) || description.contains(kw))
        {
            return false;
        }

        if self
            .entry_level_keywords
            .iter()
            .any(|kw| title.contains(kw) || description.contains(kw))
        {
            return true;
        }

        true
    }

    /// Both classifiers must pass.
    pub fn apply(&self, postings: Vec<CanonicalPosting>) -> Vec<CanonicalPosting> {
        postings
            .into_iter()
            .filter(|p| self.location_eligible(p) && self.seniority_eligible(p))
            .collect()
    }
}
