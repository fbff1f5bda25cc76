//! Release asset downloads.

use async_trait::async_trait;
use nsv_action_core::AcquisitionError;
use reqwest::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Downloads a URL to a local file.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Stream `url` into `dest`, creating or truncating it.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), AcquisitionError>;
}

/// [`ArtifactFetcher`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpArtifactFetcher {
    client: Client,
}

impl HttpArtifactFetcher {
    /// Create a fetcher using `client` for requests.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), AcquisitionError> {
        debug!(%url, ?dest, "Downloading release asset");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquisitionError::network(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(AcquisitionError::network(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| AcquisitionError::cache_write(dest, e))?;

        let mut written = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AcquisitionError::network(url, e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| AcquisitionError::cache_write(dest, e))?;
            written += chunk.len();
        }
        file.flush()
            .await
            .map_err(|e| AcquisitionError::cache_write(dest, e))?;

        debug!(bytes = written, "Downloaded release asset");
        Ok(())
    }
}
