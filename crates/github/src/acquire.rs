//! Download, extract and cache release archives.

use crate::cache::ToolCache;
use crate::extract::extract_archive;
use crate::fetch::ArtifactFetcher;
use crate::release::{ReleaseQuery, ReleaseResolver, ReleaseSource, VersionSelector};
use nsv_action_core::{Download, Platform, Result, Tool, select_artifact};
use std::path::PathBuf;
use tracing::{debug, info};

/// Turns (repo, tag, archive) into a local directory of extracted files.
///
/// Each key is downloaded at most once; later calls are served from the
/// [`ToolCache`], including calls from later runs sharing the cache root.
#[derive(Debug, Clone)]
pub struct Acquirer<F> {
    fetcher: F,
    cache: ToolCache,
    server_url: String,
    owner: String,
}

impl<F: ArtifactFetcher> Acquirer<F> {
    /// Create an acquirer downloading from `{server_url}/{owner}/...`.
    #[must_use]
    pub fn new(
        fetcher: F,
        cache: ToolCache,
        server_url: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            server_url: server_url.into(),
            owner: owner.into(),
        }
    }

    /// The cache entries are stored in.
    #[must_use]
    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    /// Release asset URL for an archive.
    #[must_use]
    pub fn download_url(&self, repo: &str, tag: &str, archive_filename: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}",
            self.server_url, self.owner, repo, tag, archive_filename
        )
    }

    /// Ensure the archive is extracted in the cache and return its directory.
    ///
    /// # Errors
    ///
    /// Returns an acquisition error if the download, extraction or cache
    /// write fails. Nothing is retried.
    pub async fn acquire(&self, repo: &str, tag: &str, archive_filename: &str) -> Result<PathBuf> {
        if let Some(dir) = self.cache.find(repo, tag) {
            debug!(repo, tag, ?dir, "Using cached download");
            return Ok(dir);
        }

        let url = self.download_url(repo, tag, archive_filename);
        debug!(repo, %url, "Downloading");

        let staging = self.cache.staging_dir()?;
        let archive = staging.path().join(archive_filename);
        self.fetcher.fetch(&url, &archive).await?;

        let extracted = staging.path().join("extracted");
        debug!(?archive, "Extracting download");
        extract_archive(&archive, archive_filename, &extracted)?;

        let dir = self.cache.store(&extracted, repo, tag)?;
        debug!(?dir, "Cached download");
        Ok(dir)
    }
}

/// Resolves, selects and acquires a tool in one call.
#[derive(Debug, Clone)]
pub struct ToolInstaller<S, F> {
    resolver: ReleaseResolver<S>,
    acquirer: Acquirer<F>,
    platform: Platform,
}

impl<S: ReleaseSource, F: ArtifactFetcher> ToolInstaller<S, F> {
    /// Create an installer for `platform`.
    #[must_use]
    pub const fn new(resolver: ReleaseResolver<S>, acquirer: Acquirer<F>, platform: Platform) -> Self {
        Self {
            resolver,
            acquirer,
            platform,
        }
    }

    /// Install `tool` at `selector` and return the executable path.
    ///
    /// # Errors
    ///
    /// Returns the first resolution or acquisition error encountered.
    pub async fn install(&self, tool: Tool, selector: &VersionSelector) -> Result<Download> {
        let query = ReleaseQuery::new(tool.id(), selector.clone());
        let release = self.resolver.resolve(&query).await?;

        let artifact = select_artifact(tool, &release.tag_name, self.platform);
        info!(
            %tool,
            tag = %release.tag_name,
            platform = %self.platform,
            archive = %artifact.archive_filename,
            "Selected release artifact"
        );

        let dir = self
            .acquirer
            .acquire(tool.id(), &release.tag_name, &artifact.archive_filename)
            .await?;

        Ok(Download::new(&dir, &artifact.binary_name, release.tag_name))
    }
}
