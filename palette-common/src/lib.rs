//! # Palette Common Library
//!
//! Shared code for the palette crawler including:
//! - Error types
//! - Root folder and TOML configuration resolution
//! - Database initialization for the `palette` table
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
