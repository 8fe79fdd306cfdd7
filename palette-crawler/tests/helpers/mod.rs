//! Test Helper Utilities
//!
//! Shared utilities for testing palette-crawler

#![allow(dead_code, unused_imports)]

pub mod db_utils;
pub mod fakes;
pub mod fixtures;

pub use db_utils::{count_files, create_test_store, get_table_columns};
pub use fakes::{FakeSource, FakeTransport, QuitAfterPolls};
pub use fixtures::{build_pipeline, expected_stats, jpeg_bytes, test_word_list, valid_candidate};
