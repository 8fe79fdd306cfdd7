//! In-memory stand-ins for the pipeline ports

use super::fixtures::valid_candidate;
use palette_crawler::error::{CrawlError, Result};
use palette_crawler::types::{
    PhotoDescriptor, PhotoDetail, PhotoSource, PhotoTransport, QuitSignal, SearchPage,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Transport that writes fixed bytes, or fails every download
pub struct FakeTransport {
    bytes: Option<Vec<u8>>,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn serving(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            bytes: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PhotoTransport for FakeTransport {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.bytes {
            Some(bytes) => {
                tokio::fs::write(destination, bytes).await?;
                Ok(())
            }
            None => Err(CrawlError::Transport(format!("GET {} refused", url))),
        }
    }
}

/// Search source with `pages` pages of `per_page` distinct photos per term
pub struct FakeSource {
    pages: u32,
    per_page: u32,
    fail_details: bool,
    searches: Mutex<Vec<(String, u32)>>,
}

impl FakeSource {
    pub fn new(pages: u32, per_page: u32) -> Self {
        Self {
            pages,
            per_page,
            fail_details: false,
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Every `photo_info` call fails with a transport error
    pub fn with_failing_details(mut self) -> Self {
        self.fail_details = true;
        self
    }

    /// `(term, page)` of every search call, in order
    pub fn searches(&self) -> Vec<(String, u32)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PhotoSource for FakeSource {
    async fn search(&self, term: &str, page: u32) -> Result<SearchPage> {
        self.searches.lock().unwrap().push((term.to_string(), page));

        let photos = if page <= self.pages {
            (0..self.per_page)
                .map(|i| valid_candidate(&format!("{}-{}-{}", term, page, i)).descriptor)
                .collect()
        } else {
            Vec::new()
        };

        Ok(SearchPage {
            page,
            pages: self.pages,
            photos,
        })
    }

    async fn photo_info(&self, descriptor: &PhotoDescriptor) -> Result<PhotoDetail> {
        if self.fail_details {
            return Err(CrawlError::Transport("detail request timed out".to_string()));
        }
        Ok(valid_candidate(&descriptor.id).detail)
    }
}

/// Quit signal that turns true once it has been polled more than `polls` times
pub struct QuitAfterPolls {
    polls: usize,
    seen: AtomicUsize,
}

impl QuitAfterPolls {
    pub fn new(polls: usize) -> Self {
        Self {
            polls,
            seen: AtomicUsize::new(0),
        }
    }

    pub fn never() -> Self {
        Self::new(usize::MAX)
    }
}

impl QuitSignal for QuitAfterPolls {
    fn should_quit(&self) -> bool {
        self.seen.fetch_add(1, Ordering::SeqCst) >= self.polls
    }
}
