//! Service modules for the photo ingestion pipeline

pub mod admission;
pub mod dedup_index;
pub mod downloader;
pub mod flickr_client;
pub mod image_analyzer;
pub mod image_files;
pub mod metadata_extractor;
pub mod rate_limiter;
pub mod word_list;

pub use admission::AdmissionController;
pub use dedup_index::DedupIndex;
pub use downloader::HttpTransport;
pub use flickr_client::{FlickrClient, SearchOptions};
pub use image_analyzer::{AnalysisError, ImageAnalyzer};
pub use metadata_extractor::{MetadataError, MetadataExtractor};
pub use rate_limiter::RateLimiter;
pub use word_list::DictionaryWordList;
