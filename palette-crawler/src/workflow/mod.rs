//! Crawl workflow
//!
//! - **pipeline:** per-candidate ingestion state machine
//! - **crawler:** paging loop over search terms, rate limited
//! - **shutdown:** sentinel file and Ctrl-C stop signal
//! - **statistics:** per-term and run counters

pub mod crawler;
pub mod pipeline;
pub mod shutdown;
pub mod statistics;

pub use crawler::Crawler;
pub use pipeline::{IngestionPipeline, PipelineConfig};
pub use shutdown::ShutdownSignal;
pub use statistics::CrawlStats;
