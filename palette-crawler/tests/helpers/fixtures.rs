//! Candidate and image fixtures

use image::{codecs::jpeg::JpegEncoder, ImageBuffer, Rgb};
use palette_crawler::services::image_analyzer::compute_stats;
use palette_crawler::services::DictionaryWordList;
use palette_crawler::types::{
    CandidatePhoto, DetailChild, ImageStats, PhotoDescriptor, PhotoDetail, PhotoStore,
    PhotoTransport,
};
use palette_crawler::workflow::{IngestionPipeline, PipelineConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Encode a solid-color JPEG at maximum quality
pub fn jpeg_bytes(rgb: [u8; 3], width: u32, height: u32) -> Vec<u8> {
    let image = ImageBuffer::from_pixel(width, height, Rgb(rgb));
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 100)
        .encode_image(&image)
        .unwrap();
    bytes
}

/// Statistics the analyzer will report for encoded bytes
pub fn expected_stats(bytes: &[u8]) -> ImageStats {
    let decoded = image::load_from_memory(bytes).unwrap().to_rgb8();
    compute_stats(&decoded).unwrap()
}

pub fn test_word_list() -> Arc<DictionaryWordList> {
    Arc::new(DictionaryWordList::from_words(["cat", "blue", "sky"]))
}

/// Candidate with complete metadata; the id also seeds the secret
pub fn valid_candidate(id: &str) -> CandidatePhoto {
    let descriptor = PhotoDescriptor::from_attributes(attrs(&[
        ("id", id),
        ("secret", "s3cr3t"),
        ("server", "42"),
        ("farm", "7"),
        ("owner", "12345@N00"),
        ("title", "fixture"),
    ]));

    let detail = PhotoDetail {
        attributes: attrs(&[("id", id), ("license", "4")]),
        children: vec![
            DetailChild {
                name: "owner".to_string(),
                attributes: attrs(&[
                    ("nsid", "12345@N00"),
                    ("username", "jdoe"),
                    ("realname", "Jane O'Doe"),
                ]),
            },
            DetailChild {
                name: "dates".to_string(),
                attributes: attrs(&[("posted", "1234567890"), ("taken", "2008-05-01 10:00:00")]),
            },
        ],
        tags: vec![
            "Cat".to_string(),
            "cat".to_string(),
            "xyzzy123".to_string(),
            "Blue sky".to_string(),
        ],
    };

    CandidatePhoto { descriptor, detail }
}

/// Pipeline with empty state rooted at `root`
pub fn build_pipeline(
    root: &Path,
    bucket_limit: u32,
    transport: Arc<dyn PhotoTransport>,
    store: Arc<dyn PhotoStore>,
) -> IngestionPipeline {
    let config = PipelineConfig {
        root_folder: root.to_path_buf(),
        thumbnail_size: "s".to_string(),
        thumbnail_dimension: 75,
        max_tag_len: 300,
        bucket_limit,
    };
    IngestionPipeline::new(config, test_word_list(), transport, store).with_rng_seed(11)
}
