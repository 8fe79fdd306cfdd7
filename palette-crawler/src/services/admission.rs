//! Color-histogram admission controller
//!
//! Caps how many photos may share one exact encoded average color.
//! Buckets are exact integer matches; colors one step apart in any
//! channel are unrelated buckets.
//!
//! The histogram is run-scoped: seeded once from the store, incremented on
//! every persisted record, never decremented.

use std::collections::HashMap;

/// Default bucket limit: reject once a bucket holds more than this many
pub const DEFAULT_BUCKET_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct AdmissionController {
    histogram: HashMap<u32, u32>,
    limit: u32,
}

impl AdmissionController {
    pub fn new(limit: u32) -> Self {
        Self {
            histogram: HashMap::new(),
            limit,
        }
    }

    /// Seed from the average colors of already-persisted records
    pub fn seeded<I>(limit: u32, colors: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut controller = Self::new(limit);
        for color in colors {
            controller.record_admitted(color);
        }
        controller
    }

    /// True unless the bucket already holds more than `limit` records
    pub fn should_admit(&self, average_color: u32) -> bool {
        self.count(average_color) <= self.limit
    }

    /// Count one persisted record in its bucket
    pub fn record_admitted(&mut self, average_color: u32) {
        *self.histogram.entry(average_color).or_insert(0) += 1;
    }

    pub fn count(&self, average_color: u32) -> u32 {
        self.histogram.get(&average_color).copied().unwrap_or(0)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of distinct buckets
    pub fn bucket_count(&self) -> usize {
        self.histogram.len()
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_LIMIT)
    }
}
