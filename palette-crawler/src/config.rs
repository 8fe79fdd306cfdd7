//! Configuration for palette-crawler
//!
//! Reads the `[crawl]` table of the module TOML file and resolves the
//! Flickr API key with ENV → TOML priority.

use crate::error::{CrawlError, Result};
use palette_common::config::TomlConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the Flickr API key
pub const API_KEY_ENV: &str = "PALETTE_FLICKR_API_KEY";

/// `[crawl]` table; every field has a default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// One search term per line
    pub search_terms_file: PathBuf,
    pub per_page: u32,
    pub pages_per_term: u32,
    /// Comma-separated license ids passed to the search
    pub licenses: String,
    pub sort: String,
    /// Minimum pause between page fetches
    pub page_pause_secs: u64,
    pub max_tag_len: usize,
    pub dictionary_path: PathBuf,
    /// File whose presence in the working directory stops the crawl
    pub quit_sentinel: PathBuf,
    /// Records allowed per average-color bucket
    pub bucket_limit: u32,
    /// Flickr size suffix of the downloaded rendition
    pub thumbnail_size: String,
    /// Pixel edge length recorded as width and height
    pub thumbnail_dimension: u32,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            search_terms_file: PathBuf::from("search_terms.txt"),
            per_page: 200,
            pages_per_term: 3,
            licenses: "4,7".to_string(),
            sort: "interestingness-desc".to_string(),
            page_pause_secs: 60,
            max_tag_len: 300,
            dictionary_path: PathBuf::from("/usr/share/dict/words"),
            quit_sentinel: PathBuf::from("__palette_quit__"),
            bucket_limit: 10,
            thumbnail_size: "s".to_string(),
            thumbnail_dimension: 75,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CrawlerToml {
    #[serde(default)]
    crawl: CrawlSettings,
}

/// Load `[crawl]` from a TOML file
///
/// A missing, unreadable or unparsable file yields defaults with a warning.
pub fn load_crawl_settings(path: &Path) -> CrawlSettings {
    if !path.exists() {
        return CrawlSettings::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read config file, using [crawl] defaults");
            return CrawlSettings::default();
        }
    };

    match parse_crawl_settings(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invalid [crawl] settings, using defaults");
            CrawlSettings::default()
        }
    }
}

pub fn parse_crawl_settings(content: &str) -> Result<CrawlSettings> {
    let parsed: CrawlerToml = toml::from_str(content)
        .map_err(|e| CrawlError::Config(format!("Parse TOML failed: {}", e)))?;
    Ok(parsed.crawl)
}

/// Resolve the Flickr API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .flickr_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Flickr API key found in environment and TOML. Using environment (highest priority).");
    }

    match (env_key, toml_key) {
        (Some(key), _) => {
            info!("Flickr API key loaded from environment variable");
            Ok(key)
        }
        (None, Some(key)) => {
            info!("Flickr API key loaded from TOML config");
            Ok(key)
        }
        (None, None) => Err(CrawlError::Authentication(format!(
            "Flickr API key not configured. Please configure using one of:\n\
             1. Environment: {}=your-key-here\n\
             2. TOML config: flickr_api_key = \"your-key\"",
            API_KEY_ENV
        ))),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Read the search terms file
///
/// Lines are trimmed; blank lines and `#` comments are skipped.
pub fn load_search_terms(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CrawlError::Config(format!(
            "Cannot read search terms {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(parse_search_terms(&content))
}

pub fn parse_search_terms(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
