//! Graceful shutdown signal
//!
//! The crawl stops before the next page when either the sentinel file
//! exists or the cancellation token (tripped by Ctrl-C) is cancelled.

use crate::types::QuitSignal;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sentinel: PathBuf,
    token: CancellationToken,
}

impl ShutdownSignal {
    pub fn new(sentinel: impl Into<PathBuf>, token: CancellationToken) -> Self {
        Self {
            sentinel: sentinel.into(),
            token,
        }
    }

    pub fn sentinel(&self) -> &Path {
        &self.sentinel
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl QuitSignal for ShutdownSignal {
    fn should_quit(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        if self.sentinel.exists() {
            tracing::info!(sentinel = %self.sentinel.display(), "Quit sentinel found");
            return true;
        }
        false
    }
}
