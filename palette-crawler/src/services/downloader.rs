//! HTTP image transport
//!
//! `PhotoTransport` over `reqwest`. The body is written with `tokio::fs`;
//! a partially written file is removed when the transfer fails.

use crate::error::{CrawlError, Result};
use crate::services::image_files::remove_if_exists;
use crate::types::PhotoTransport;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("palette-crawler/", env!("CARGO_PKG_VERSION"));

pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::Transport(e.to_string()))?;

        Ok(Self { http_client })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Transport(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl PhotoTransport for HttpTransport {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        tracing::debug!(url = %url, path = %destination.display(), "Downloading image");

        let bytes = self.fetch(url).await?;

        if let Err(e) = tokio::fs::write(destination, &bytes).await {
            remove_if_exists(destination);
            return Err(CrawlError::Transport(format!(
                "Cannot write {}: {}",
                destination.display(),
                e
            )));
        }

        tracing::debug!(url = %url, bytes = bytes.len(), "Image downloaded");
        Ok(())
    }
}
