//! Crawl statistics
//!
//! Counts per search term and for the whole run. Reported at the end of
//! each term and at shutdown.

use crate::types::{DiscardReason, PipelineOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Candidates handed to the pipeline
    pub attempted: usize,
    pub persisted: usize,
    pub duplicates: usize,
    pub invalid_metadata: usize,
    pub unanalyzable: usize,
    pub over_represented: usize,
    pub persistence_conflicts: usize,
    /// Downloads or detail fetches that failed
    pub transport_failures: usize,
    /// Pages fetched from the search source
    pub pages: usize,
}

impl CrawlStats {
    pub fn record(&mut self, outcome: &PipelineOutcome) {
        self.attempted += 1;
        match outcome {
            PipelineOutcome::Persisted(_) => self.persisted += 1,
            PipelineOutcome::Discarded(reason) => match reason {
                DiscardReason::Duplicate => self.duplicates += 1,
                DiscardReason::InvalidMetadata => self.invalid_metadata += 1,
                DiscardReason::Unanalyzable => self.unanalyzable += 1,
                DiscardReason::OverRepresented => self.over_represented += 1,
                DiscardReason::PersistenceConflict => self.persistence_conflicts += 1,
            },
        }
    }

    /// Count a candidate abandoned on a transport error
    pub fn record_transport_failure(&mut self) {
        self.attempted += 1;
        self.transport_failures += 1;
    }

    pub fn record_page(&mut self) {
        self.pages += 1;
    }

    pub fn discarded(&self) -> usize {
        self.duplicates
            + self.invalid_metadata
            + self.unanalyzable
            + self.over_represented
            + self.persistence_conflicts
    }

    pub fn merge(&mut self, other: &CrawlStats) {
        self.attempted += other.attempted;
        self.persisted += other.persisted;
        self.duplicates += other.duplicates;
        self.invalid_metadata += other.invalid_metadata;
        self.unanalyzable += other.unanalyzable;
        self.over_represented += other.over_represented;
        self.persistence_conflicts += other.persistence_conflicts;
        self.transport_failures += other.transport_failures;
        self.pages += other.pages;
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} attempted, {} persisted, {} discarded, {} transport failures",
            self.attempted,
            self.persisted,
            self.discarded(),
            self.transport_failures
        )
    }
}
