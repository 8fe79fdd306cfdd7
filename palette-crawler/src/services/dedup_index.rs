//! Set of remote URLs already ingested or attempted
//!
//! Seeded from the store at startup and grown by one entry per candidate
//! that passes the duplicate check, so a URL is downloaded at most once
//! per run even if the candidate is later discarded.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    urls: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Add a URL; returns false if it was already present
    pub fn add(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DedupIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}
