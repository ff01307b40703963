// src/config.rs
//! Startup configuration. Loaded once: an explicit path via
//! `JOBRADAR_CONFIG_PATH`, else `config/jobradar.toml` if present, else the
//! built-in defaults. Every field may be omitted in the file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const ENV_CONFIG_PATH: &str = "JOBRADAR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/jobradar.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Queries handed to the multi-board search service.
    pub search_terms: Vec<String>,
    /// Location names and exclusionary phrases; any hit in a posting's
    /// location or description excludes it.
    pub location_exclusions: Vec<String>,
    /// Any hit in title or description excludes the posting outright.
    pub seniority_exclusions: Vec<String>,
    /// Positive entry-level indicators.
    pub entry_level_keywords: Vec<String>,
    /// Per-adapter overrides of the result cap, keyed by adapter name.
    pub result_caps: HashMap<String, usize>,
    /// Minimum spacing between calls to the same adapter, seconds.
    pub rate_interval_secs: u64,
    /// Hard bound on a single source fetch, seconds.
    pub fetch_timeout_secs: u64,
    /// Scheduled scrape cadence, seconds.
    pub scrape_interval_secs: u64,
    /// Endpoint of the multi-board search service; the adapter is only
    /// registered when this is set.
    pub board_search_url: Option<String>,
    /// SQLite connection string; `DATABASE_URL` wins over this.
    pub database_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_terms: to_strings(&[
                "Junior Data Scientist",
                "Entry Level Data Scientist",
                "Junior Software Testing Engineer",
                "Entry Level Test Automation Engineer",
                "Junior Back-End Engineer",
                "Entry Level DevOps",
                "Junior DevOps",
                "Entry Level MLOps",
                "Graduate Data Scientist",
                "Graduate Software Engineer",
            ]),
            location_exclusions: to_strings(&[
                "USA",
                "United States",
                "North America",
                "APAC",
                "US Only",
                "Canada",
                "Mexico",
                "US authorization required",
                "Must reside in US",
                "US Citizens only",
                "Green Card",
            ]),
            seniority_exclusions: to_strings(&[
                "senior",
                "lead",
                "principal",
                "staff",
                "architect",
                "director",
                "manager",
                "5+ years",
                "5-7 years",
                "7+ years",
                "10+ years",
                "expert",
                "experienced",
            ]),
            entry_level_keywords: to_strings(&[
                "junior",
                "entry level",
                "entry-level",
                "graduate",
                "internship",
                "intern",
                "0-1 years",
                "0-2 years",
                "no experience",
                "recent graduate",
                "new grad",
                "trainee",
                "associate",
            ]),
            result_caps: HashMap::new(),
            rate_interval_secs: 5,
            fetch_timeout_secs: 10,
            scrape_interval_secs: 12 * 60 * 60,
            board_search_url: None,
            database_url: "sqlite:jobs.db?mode=rwc".to_string(),
        }
    }
}

impl AppConfig {
    /// Load using env var + fallbacks:
    /// 1) $JOBRADAR_CONFIG_PATH (must exist when set)
    /// 2) config/jobradar.toml
    /// 3) built-in defaults
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to a non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing config toml")
    }

    /// Effective result cap for the named adapter.
    pub fn result_cap_for(&self, name: &str, default: usize) -> usize {
        self.result_caps.get(name).copied().unwrap_or(default)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
