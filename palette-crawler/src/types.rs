//! Core Types and Port Traits for palette-crawler
//!
//! The ingestion pipeline only depends on the traits defined here:
//! - **PhotoSource:** search pages and per-photo detail payloads
//! - **PhotoTransport:** fetch a remote image into a local file
//! - **PhotoStore:** insert records, read startup seeds
//! - **WordList:** dictionary membership for tag filtering
//! - **QuitSignal:** polled once per page by the crawler

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// Candidate Types
// ============================================================================

/// One search result from the upstream API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoDescriptor {
    pub id: String,
    pub secret: String,
    pub server: String,
    pub farm: String,
    /// Every raw attribute of the search result, including the four above
    pub attributes: HashMap<String, String>,
}

impl PhotoDescriptor {
    /// Build a descriptor from raw attributes
    ///
    /// Missing identity fields are left empty; the URL builder copes.
    pub fn from_attributes(attributes: HashMap<String, String>) -> Self {
        let get = |key: &str| attributes.get(key).cloned().unwrap_or_default();
        Self {
            id: get("id"),
            secret: get("secret"),
            server: get("server"),
            farm: get("farm"),
            attributes,
        }
    }
}

/// A named child element of the detail payload (e.g. `owner`, `dates`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailChild {
    pub name: String,
    pub attributes: HashMap<String, String>,
}

/// Detail payload for one photo (the `photos.getInfo` response)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoDetail {
    /// Top-level scalar attributes
    pub attributes: HashMap<String, String>,
    /// Immediate children, in payload order
    pub children: Vec<DetailChild>,
    /// Tag texts, in payload order
    pub tags: Vec<String>,
}

/// Descriptor plus detail; lives for one pipeline pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePhoto {
    pub descriptor: PhotoDescriptor,
    pub detail: PhotoDetail,
}

/// One page of search results
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub page: u32,
    pub pages: u32,
    pub photos: Vec<PhotoDescriptor>,
}

// ============================================================================
// Extracted and Persisted Types
// ============================================================================

/// Required metadata fields pulled from a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFields {
    pub license: i64,
    pub username: String,
    pub realname: String,
    pub date_taken: String,
    pub date_uploaded: String,
}

/// Visual statistics of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStats {
    /// Encoded average color `R*65536 + G*256 + B`
    pub average_color: u32,
    /// Rounded maximum per-channel standard deviation
    pub max_std_dev: u32,
}

/// Persisted entity, one row of the `palette` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub tags: String,
    pub license: i64,
    pub user: String,
    pub user_fullname: String,
    pub date_taken: String,
    pub date_uploaded: String,
    pub width: u32,
    pub height: u32,
    pub remote_url: String,
    pub query_pool: String,
    pub color_mean: u32,
    pub color_stddev: u32,
    /// Local file path relative to the root folder
    pub file_url: String,
}

/// Existing-record data used to seed the dedup index and color histogram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSeed {
    pub remote_url: String,
    pub color_mean: u32,
}

// ============================================================================
// Pipeline Outcome
// ============================================================================

/// Why a candidate did not become a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscardReason {
    /// Remote URL already seen
    Duplicate,
    /// Required metadata missing or not storable
    InvalidMetadata,
    /// Image could not be decoded or was not a JPEG
    Unanalyzable,
    /// Average-color bucket already full
    OverRepresented,
    /// Insert rejected by the store
    PersistenceConflict,
}

/// Terminal state of one pipeline pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Persisted(PhotoRecord),
    Discarded(DiscardReason),
}

impl PipelineOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PipelineOutcome::Persisted(_))
    }
}

// ============================================================================
// Ports
// ============================================================================

/// Upstream search-and-detail source
#[async_trait::async_trait]
pub trait PhotoSource: Send + Sync {
    /// Fetch one page of search results for a term (pages start at 1)
    async fn search(&self, term: &str, page: u32) -> Result<SearchPage>;

    /// Fetch the detail payload of one photo
    async fn photo_info(&self, descriptor: &PhotoDescriptor) -> Result<PhotoDetail>;
}

/// Fetches remote bytes into a local file
#[async_trait::async_trait]
pub trait PhotoTransport: Send + Sync {
    async fn download(&self, url: &str, destination: &Path) -> Result<()>;
}

/// Persistence layer for photo records
#[async_trait::async_trait]
pub trait PhotoStore: Send + Sync {
    /// Insert one record, returning its row id
    async fn insert_photo(&self, record: &PhotoRecord) -> Result<i64>;

    /// Read `(remote_url, color_mean)` of every stored record
    async fn load_seeds(&self) -> Result<Vec<StoreSeed>>;
}

/// Dictionary membership test
pub trait WordList: Send + Sync {
    fn is_word(&self, token: &str) -> bool;
}

/// External stop request, polled between pages
pub trait QuitSignal: Send + Sync {
    fn should_quit(&self) -> bool;
}
