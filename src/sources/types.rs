// src/sources/types.rs
use anyhow::Result;

/// One normalized job posting, common to all sources. Lives for the duration
/// of a pipeline run; only records surviving the filters reach the store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CanonicalPosting {
    pub title: String,
    pub company: String,
    /// Primary dedup and storage key. Empty means the record is dropped
    /// before deduplication.
    pub url: String,
    /// Source-native format, stored as-is. Consumers treat it as opaque.
    pub date_posted: String,
    pub location: String,
    /// Only the eligibility filter reads this; it is never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The originating adapter's canonical name.
    pub source: String,
    /// Assigned by the aggregator from the adapter's declaration,
    /// never mutated afterwards.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<Flag>,
}

impl CanonicalPosting {
    /// Bare posting with the given source name; remaining fields start empty.
    pub fn for_source(source: &str) -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            url: String::new(),
            date_posted: String::new(),
            location: String::new(),
            description: None,
            source: source.to_string(),
            flags: Vec::new(),
        }
    }
}

/// Per-record hint that alters filter behavior without string-matching on
/// the source name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flag {
    /// Local-market board; the location check does not apply.
    LocalMarket,
    /// The board only lists remote positions; the location check does not apply.
    PreVerifiedRemote,
}

/// Transport kind an adapter declares. Affects what "success" means per call
/// (markup scraping tolerates missing optional fields per-record, feeds and
/// APIs fail per-call on a malformed payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Feed,
    JsonApi,
    Markup,
}

/// One external source. Implementations hold no mutable state; a fetch either
/// yields canonical records or an error the aggregator converts to an empty
/// contribution.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CanonicalPosting>>;
    fn name(&self) -> &'static str;
    fn transport(&self) -> Transport;
    /// Upstream listings are time-ordered; only the most recent entries matter.
    fn result_cap(&self) -> usize;
    /// Flags the aggregator attaches to every record from this adapter.
    fn flags(&self) -> &[Flag] {
        &[]
    }
}
