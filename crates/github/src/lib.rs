//! GitHub Releases support for nsv-action.
//!
//! This crate provides:
//! - [`ReleaseResolver`] to map `latest` or a tag to a concrete release
//! - [`Acquirer`] to download, extract and cache a release archive once
//! - [`ToolInstaller`] combining both with artifact selection
//!
//! # Example
//!
//! ```ignore
//! use nsv_action_core::{Platform, Tool};
//! use nsv_action_github::*;
//!
//! let client = http_client()?;
//! let config = GitHubConfig::default().with_token(token);
//! let installer = ToolInstaller::new(
//!     ReleaseResolver::new(GitHubReleaseSource::new(client.clone(), config.clone())),
//!     Acquirer::new(HttpArtifactFetcher::new(client), ToolCache::default(), config.server_url, config.owner),
//!     Platform::current(),
//! );
//! let nsv = installer.install(Tool::Nsv, &VersionSelector::Latest).await?;
//! ```

pub mod acquire;
pub mod cache;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod release;

pub use acquire::{Acquirer, ToolInstaller};
pub use cache::{ToolCache, default_cache_root};
pub use config::{GitHubConfig, http_client};
pub use fetch::{ArtifactFetcher, HttpArtifactFetcher};
pub use release::{
    GitHubReleaseSource, ReleaseMetadata, ReleaseQuery, ReleaseResolver, ReleaseSource,
    VersionSelector,
};
