//! palette-crawler library interface
//!
//! Crawls photo search results into a color-balanced SQLite store.
//! Exposes the pipeline and its ports for the binary and for integration
//! testing.

pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod types;
pub mod workflow;

pub use crate::error::{CrawlError, Result};

/// Version, git hash, build timestamp and profile captured by `build.rs`
pub fn build_ident() -> String {
    format!(
        "palette-crawler {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ident_fields() {
        let ident = build_ident();
        assert!(ident.starts_with(concat!("palette-crawler ", env!("CARGO_PKG_VERSION"))));
        assert!(!env!("GIT_HASH").is_empty());
        assert!(env!("BUILD_TIMESTAMP").ends_with('Z'));
        assert!(ident.contains(env!("BUILD_PROFILE")));
    }
}
