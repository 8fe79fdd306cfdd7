//! Image analyzer
//!
//! Computes the two statistics stored with every photo:
//! - the encoded average color `R*65536 + G*256 + B`, each channel mean
//!   taken over the channel's 256-bucket value histogram and rounded
//!   independently
//! - the largest per-channel standard deviation, measured against the
//!   unrounded channel means, rounded to an integer
//!
//! Only JPEG input is accepted. On any rejection the file is removed so
//! unanalyzable downloads never accumulate on disk.

use crate::services::image_files::remove_if_exists;
use crate::types::ImageStats;
use image::{ImageFormat, ImageReader, RgbImage};
use std::path::Path;
use thiserror::Error;

/// Reasons an image is rejected by the analyzer
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Cannot open image: {0}")]
    Io(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Cannot decode image: {0}")]
    Decode(String),

    #[error("Image has no pixels")]
    Empty,
}

/// Pack three channel values into one integer
pub fn encode_color(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) * 256 * 256 + (g as u32) * 256 + b as u32
}

/// Split an encoded color back into its channels
pub fn decode_color(color: u32) -> (u8, u8, u8) {
    (
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageAnalyzer;

impl ImageAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze the image at `path`
    ///
    /// Deletes the file if it exists and the image is rejected.
    pub fn analyze(&self, path: &Path) -> Result<ImageStats, AnalysisError> {
        let result = self.decode_jpeg(path).and_then(|image| compute_stats(&image));

        if let Err(e) = &result {
            tracing::debug!(path = %path.display(), error = %e, "Image rejected by analyzer");
            remove_if_exists(path);
        }

        result
    }

    fn decode_jpeg(&self, path: &Path) -> Result<RgbImage, AnalysisError> {
        let reader = ImageReader::open(path)
            .map_err(|e| AnalysisError::Io(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| AnalysisError::Io(e.to_string()))?;

        match reader.format() {
            Some(ImageFormat::Jpeg) => {}
            Some(other) => return Err(AnalysisError::UnsupportedFormat(format!("{:?}", other))),
            None => return Err(AnalysisError::UnsupportedFormat("unknown".to_string())),
        }

        let image = reader
            .decode()
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        Ok(image.to_rgb8())
    }
}

/// Compute average color and max channel standard deviation
pub fn compute_stats(image: &RgbImage) -> Result<ImageStats, AnalysisError> {
    let pixel_count = image.width() as u64 * image.height() as u64;
    if pixel_count == 0 {
        return Err(AnalysisError::Empty);
    }
    let n = pixel_count as f64;

    let mut histogram = [[0u64; 256]; 3];
    for pixel in image.pixels() {
        for (channel, bins) in histogram.iter_mut().enumerate() {
            bins[pixel[channel] as usize] += 1;
        }
    }

    // Mean accumulated bucket by bucket, each term divided by n
    let mut means = [0.0f64; 3];
    for (channel, bins) in histogram.iter().enumerate() {
        for (value, &count) in bins.iter().enumerate() {
            means[channel] += (count * value as u64) as f64 / n;
        }
    }

    let mut max_std_dev = 0.0f64;
    for (channel, bins) in histogram.iter().enumerate() {
        let mut variance = 0.0f64;
        for (value, &count) in bins.iter().enumerate() {
            if count > 0 {
                let diff = value as f64 - means[channel];
                variance += count as f64 * diff * diff;
            }
        }
        max_std_dev = max_std_dev.max((variance / n).sqrt());
    }

    let channel = |mean: f64| mean.round().clamp(0.0, 255.0) as u8;
    Ok(ImageStats {
        average_color: encode_color(channel(means[0]), channel(means[1]), channel(means[2])),
        max_std_dev: max_std_dev.round() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{codecs::jpeg::JpegEncoder, ImageBuffer, Rgb};
    use std::fs;
    use tempfile::TempDir;

    fn write_jpeg(path: &Path, image: &RgbImage) {
        let file = fs::File::create(path).unwrap();
        let mut encoder = JpegEncoder::new_with_quality(file, 100);
        encoder.encode_image(image).unwrap();
    }

    #[test]
    fn test_encode_and_decode_color() {
        assert_eq!(encode_color(255, 0, 0), 255 * 256 * 256);
        assert_eq!(encode_color(0, 0, 255), 255);
        assert_eq!(encode_color(1, 2, 3), 65536 + 512 + 3);
        assert_eq!(decode_color(encode_color(12, 200, 7)), (12, 200, 7));
    }

    #[test]
    fn test_uniform_image_stats() {
        let image = ImageBuffer::from_pixel(100, 100, Rgb([255u8, 0, 0]));
        let stats = compute_stats(&image).unwrap();
        assert_eq!(stats.average_color, 255 * 256 * 256);
        assert_eq!(stats.max_std_dev, 0);
    }

    #[test]
    fn test_two_tone_image_stats() {
        // Blue channel split 0 / 200 between halves
        let image = ImageBuffer::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([10u8, 20, 0])
            } else {
                Rgb([10u8, 20, 200])
            }
        });
        let stats = compute_stats(&image).unwrap();

        // Blue mean 100, deviation 100; red/green constant
        assert_eq!(stats.average_color, encode_color(10, 20, 100));
        assert_eq!(stats.max_std_dev, 100);
    }

    #[test]
    fn test_channel_means_rounded_independently() {
        // Red mean 0.5 rounds up, green mean 0.25 rounds down
        let image = ImageBuffer::from_fn(4, 1, |x, _| match x {
            0 => Rgb([1u8, 1, 0]),
            1 => Rgb([1u8, 0, 0]),
            _ => Rgb([0u8, 0, 0]),
        });
        let stats = compute_stats(&image).unwrap();
        assert_eq!(decode_color(stats.average_color), (1, 0, 0));
    }

    #[test]
    fn test_std_dev_uses_unrounded_mean() {
        // Red values 0,0,1 -> mean 1/3, std sqrt(2/9) ~ 0.47 -> 0
        // With the rounded mean (0) the deviation would be sqrt(1/3) ~ 0.58 -> 1
        let image = ImageBuffer::from_fn(3, 1, |x, _| {
            if x == 2 {
                Rgb([1u8, 0, 0])
            } else {
                Rgb([0u8, 0, 0])
            }
        });
        let stats = compute_stats(&image).unwrap();
        assert_eq!(stats.max_std_dev, 0);
    }

    #[test]
    fn test_empty_image_rejected() {
        let image = RgbImage::new(0, 0);
        assert!(matches!(compute_stats(&image), Err(AnalysisError::Empty)));
    }

    #[test]
    fn test_analyze_gray_jpeg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gray.jpg");
        write_jpeg(&path, &ImageBuffer::from_pixel(64, 48, Rgb([128u8, 128, 128])));

        let stats = ImageAnalyzer::new().analyze(&path).unwrap();
        assert_eq!(stats.average_color, encode_color(128, 128, 128));
        assert_eq!(stats.max_std_dev, 0);
        assert!(path.exists(), "Accepted image must be kept");
    }

    #[test]
    fn test_analyze_garbage_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not an image").unwrap();

        let result = ImageAnalyzer::new().analyze(&path);
        assert!(result.is_err());
        assert!(!path.exists(), "Rejected file must be deleted");
    }

    #[test]
    fn test_analyze_truncated_jpeg_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("truncated.jpg");
        write_jpeg(&path, &ImageBuffer::from_pixel(32, 32, Rgb([1u8, 2, 3])));
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 3]).unwrap();

        let result = ImageAnalyzer::new().analyze(&path);
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_analyze_png_rejected_as_wrong_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image.jpg");
        ImageBuffer::from_pixel(8, 8, Rgb([9u8, 9, 9]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let result = ImageAnalyzer::new().analyze(&path);
        assert!(matches!(result, Err(AnalysisError::UnsupportedFormat(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_analyze_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.jpg");

        let result = ImageAnalyzer::new().analyze(&path);
        assert!(matches!(result, Err(AnalysisError::Io(_))));
        assert!(!path.exists());
    }
}
