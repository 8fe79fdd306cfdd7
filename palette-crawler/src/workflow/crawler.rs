//! Paging loop
//!
//! For every search term, fetches pages `1..=pages_per_term` and feeds each
//! result through the ingestion pipeline. The quit signal is polled before
//! each page, so a stop request lets the in-flight page finish. Page
//! fetches are spaced by the rate limiter.

use crate::services::rate_limiter::RateLimiter;
use crate::types::{CandidatePhoto, PhotoSource, QuitSignal};
use crate::workflow::pipeline::IngestionPipeline;
use crate::workflow::statistics::CrawlStats;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a search term ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermEnd {
    Exhausted,
    StopRequested,
}

pub struct Crawler {
    source: Arc<dyn PhotoSource>,
    pipeline: IngestionPipeline,
    quit: Arc<dyn QuitSignal>,
    rate_limiter: RateLimiter,
    cancel: CancellationToken,
    pages_per_term: u32,
}

impl Crawler {
    pub fn new(
        source: Arc<dyn PhotoSource>,
        pipeline: IngestionPipeline,
        quit: Arc<dyn QuitSignal>,
        page_pause: Duration,
        pages_per_term: u32,
    ) -> Self {
        Self {
            source,
            pipeline,
            quit,
            rate_limiter: RateLimiter::new(page_pause),
            cancel: CancellationToken::new(),
            pages_per_term,
        }
    }

    /// Cancelling this token interrupts a rate-limit pause
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    /// Crawl every term in order; returns the run totals
    pub async fn run(&mut self, terms: &[String]) -> CrawlStats {
        let mut total = CrawlStats::default();

        for term in terms {
            let (term_stats, end) = self.crawl_term(term).await;
            total.merge(&term_stats);

            info!(
                term = %term,
                pages = term_stats.pages,
                "Search term finished: {}",
                term_stats.display_string()
            );

            if end == TermEnd::StopRequested {
                break;
            }
        }

        info!(pages = total.pages, "Crawl finished: {}", total.display_string());
        total
    }

    async fn crawl_term(&mut self, term: &str) -> (CrawlStats, TermEnd) {
        let mut stats = CrawlStats::default();

        for page in 1..=self.pages_per_term {
            if self.quit.should_quit() {
                info!(term = %term, page, "Stop requested, not fetching page");
                return (stats, TermEnd::StopRequested);
            }

            if !self.rate_limiter.wait_or_cancel(&self.cancel).await {
                info!(term = %term, page, "Stop requested during rate-limit pause");
                return (stats, TermEnd::StopRequested);
            }

            let search_page = match self.source.search(term, page).await {
                Ok(search_page) => search_page,
                Err(e) => {
                    warn!(term = %term, page, error = %e, "Search failed, skipping term");
                    break;
                }
            };
            stats.record_page();

            if search_page.photos.is_empty() || (search_page.pages > 0 && page > search_page.pages)
            {
                debug!(term = %term, page, last_page = search_page.pages, "No more results");
                break;
            }

            let page_size = search_page.photos.len();
            for descriptor in search_page.photos {
                let detail = match self.source.photo_info(&descriptor).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        warn!(photo_id = %descriptor.id, error = %e, "Detail fetch failed");
                        stats.record_transport_failure();
                        continue;
                    }
                };

                let candidate = CandidatePhoto { descriptor, detail };
                match self.pipeline.process(&candidate, term).await {
                    Ok(outcome) => stats.record(&outcome),
                    Err(e) => {
                        warn!(photo_id = %candidate.descriptor.id, error = %e, "Candidate abandoned");
                        stats.record_transport_failure();
                    }
                }
            }

            info!(term = %term, page, photos = page_size, "Page processed");
        }

        (stats, TermEnd::Exhausted)
    }
}
