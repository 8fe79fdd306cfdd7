//! Ingestion Pipeline
//!
//! Drives one candidate photo to a terminal outcome:
//! 1. Build the thumbnail URL; discard if the dedup index already has it
//! 2. Record the URL, extract metadata; discard on rejection
//! 3. Download into a random directory of the image tree
//! 4. Analyze; discard (file removed) if the image is unusable
//! 5. Admission check on the average color; discard (file removed) if the
//!    bucket is full
//! 6. Sanitize and persist, then count the color in the histogram
//!
//! # Error Handling
//! - Every rejection is a `PipelineOutcome::Discarded`, never an error
//! - A failed insert removes the file and is discarded as a conflict
//! - Transport failures surface as `Err(CrawlError::Transport)` for the
//!   caller to count; the candidate is abandoned
//!
//! Candidates are processed strictly one at a time; the pipeline owns the
//! dedup index and histogram exclusively.

use crate::config::CrawlSettings;
use crate::error::{CrawlError, Result};
use crate::services::admission::AdmissionController;
use crate::services::dedup_index::DedupIndex;
use crate::services::flickr_client::photo_url;
use crate::services::image_analyzer::ImageAnalyzer;
use crate::services::image_files::{local_file_name, random_local_dir, remove_if_exists};
use crate::services::metadata_extractor::{escape_quotes, sanitize_fields, MetadataExtractor};
use crate::types::{
    CandidatePhoto, DiscardReason, ImageStats, PhotoRecord, PhotoStore, PhotoTransport,
    PipelineOutcome, WordList,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root folder; downloads land below `<root>/img/`
    pub root_folder: PathBuf,
    /// Flickr size suffix of the downloaded rendition
    pub thumbnail_size: String,
    /// Recorded width and height of every stored photo
    pub thumbnail_dimension: u32,
    pub max_tag_len: usize,
    pub bucket_limit: u32,
}

impl PipelineConfig {
    pub fn from_settings(root_folder: PathBuf, settings: &CrawlSettings) -> Self {
        Self {
            root_folder,
            thumbnail_size: settings.thumbnail_size.clone(),
            thumbnail_dimension: settings.thumbnail_dimension,
            max_tag_len: settings.max_tag_len,
            bucket_limit: settings.bucket_limit,
        }
    }
}

pub struct IngestionPipeline {
    config: PipelineConfig,
    dedup: DedupIndex,
    admission: AdmissionController,
    analyzer: ImageAnalyzer,
    word_list: Arc<dyn WordList>,
    transport: Arc<dyn PhotoTransport>,
    store: Arc<dyn PhotoStore>,
    rng: StdRng,
}

impl IngestionPipeline {
    /// Create a pipeline with empty dedup index and histogram
    pub fn new(
        config: PipelineConfig,
        word_list: Arc<dyn WordList>,
        transport: Arc<dyn PhotoTransport>,
        store: Arc<dyn PhotoStore>,
    ) -> Self {
        let admission = AdmissionController::new(config.bucket_limit);
        Self {
            config,
            dedup: DedupIndex::new(),
            admission,
            analyzer: ImageAnalyzer::new(),
            word_list,
            transport,
            store,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a pipeline seeded from the records already in the store
    pub async fn seeded(
        config: PipelineConfig,
        word_list: Arc<dyn WordList>,
        transport: Arc<dyn PhotoTransport>,
        store: Arc<dyn PhotoStore>,
    ) -> Result<Self> {
        let seeds = store.load_seeds().await?;

        let mut pipeline = Self::new(config, word_list, transport, store);
        pipeline.dedup = seeds.iter().map(|seed| seed.remote_url.clone()).collect();
        pipeline.admission = AdmissionController::seeded(
            pipeline.config.bucket_limit,
            seeds.iter().map(|seed| seed.color_mean),
        );

        info!(
            records = seeds.len(),
            buckets = pipeline.admission.bucket_count(),
            "Pipeline seeded from store"
        );
        Ok(pipeline)
    }

    /// Use a fixed RNG seed for the download directory choice
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn dedup(&self) -> &DedupIndex {
        &self.dedup
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Run one candidate through the pipeline
    pub async fn process(
        &mut self,
        candidate: &CandidatePhoto,
        search_term: &str,
    ) -> Result<PipelineOutcome> {
        let remote_url = photo_url(&candidate.descriptor, &self.config.thumbnail_size);

        if self.dedup.has(&remote_url) {
            debug!(url = %remote_url, "Duplicate URL, skipping");
            return Ok(PipelineOutcome::Discarded(DiscardReason::Duplicate));
        }
        self.dedup.add(remote_url.clone());

        let extractor = MetadataExtractor::new(self.word_list.as_ref(), self.config.max_tag_len);
        let fields = match extractor.extract(&candidate.descriptor, &candidate.detail) {
            Ok(fields) => fields,
            Err(e) => {
                debug!(url = %remote_url, error = %e, "Metadata rejected");
                return Ok(PipelineOutcome::Discarded(DiscardReason::InvalidMetadata));
            }
        };
        let tags = extractor.extract_tags(&candidate.detail);

        let relative_dir = random_local_dir(&mut self.rng);
        let relative_path = relative_dir.join(local_file_name(&remote_url));
        let local_path = self.config.root_folder.join(&relative_path);
        tokio::fs::create_dir_all(self.config.root_folder.join(&relative_dir)).await?;

        if let Err(e) = self.transport.download(&remote_url, &local_path).await {
            remove_if_exists(&local_path);
            return Err(e);
        }

        let stats = match self.analyze(&local_path).await? {
            Some(stats) => stats,
            None => return Ok(PipelineOutcome::Discarded(DiscardReason::Unanalyzable)),
        };

        if !self.admission.should_admit(stats.average_color) {
            debug!(
                url = %remote_url,
                color = stats.average_color,
                count = self.admission.count(stats.average_color),
                "Color bucket full, discarding"
            );
            remove_if_exists(&local_path);
            return Ok(PipelineOutcome::Discarded(DiscardReason::OverRepresented));
        }

        let fields = sanitize_fields(&fields);
        let record = PhotoRecord {
            tags: escape_quotes(&tags),
            license: fields.license,
            user: fields.username,
            user_fullname: fields.realname,
            date_taken: fields.date_taken,
            date_uploaded: fields.date_uploaded,
            width: self.config.thumbnail_dimension,
            height: self.config.thumbnail_dimension,
            remote_url: escape_quotes(&remote_url),
            query_pool: escape_quotes(search_term),
            color_mean: stats.average_color,
            color_stddev: stats.max_std_dev,
            file_url: escape_quotes(&relative_path.to_string_lossy()),
        };

        match self.store.insert_photo(&record).await {
            Ok(id) => {
                self.admission.record_admitted(stats.average_color);
                info!(
                    id,
                    url = %remote_url,
                    color = stats.average_color,
                    std_dev = stats.max_std_dev,
                    "Photo persisted"
                );
                Ok(PipelineOutcome::Persisted(record))
            }
            Err(e) => {
                warn!(url = %remote_url, error = %e, "Insert failed, discarding photo");
                remove_if_exists(&local_path);
                Ok(PipelineOutcome::Discarded(DiscardReason::PersistenceConflict))
            }
        }
    }

    /// Decode off the async runtime; `None` when the analyzer rejects the file
    async fn analyze(&self, path: &Path) -> Result<Option<ImageStats>> {
        let analyzer = self.analyzer;
        let path_buf = path.to_path_buf();

        let result = tokio::task::spawn_blocking(move || analyzer.analyze(&path_buf))
            .await
            .map_err(|e| CrawlError::Internal(format!("Analyzer task failed: {}", e)))?;

        match result {
            Ok(stats) => Ok(Some(stats)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Image unanalyzable");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = CrawlSettings {
            thumbnail_size: "q".to_string(),
            thumbnail_dimension: 150,
            bucket_limit: 3,
            ..Default::default()
        };
        let config = PipelineConfig::from_settings(PathBuf::from("/data"), &settings);

        assert_eq!(config.root_folder, PathBuf::from("/data"));
        assert_eq!(config.thumbnail_size, "q");
        assert_eq!(config.thumbnail_dimension, 150);
        assert_eq!(config.max_tag_len, 300);
        assert_eq!(config.bucket_limit, 3);
    }
}
