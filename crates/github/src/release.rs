//! Release resolution against the GitHub REST API.
//!
//! A [`ReleaseResolver`] maps a [`VersionSelector`] to the concrete tag of a
//! published release. The two queries it needs sit behind [`ReleaseSource`];
//! [`GitHubReleaseSource`] implements them over HTTP.

use crate::config::GitHubConfig;
use async_trait::async_trait;
use nsv_action_core::ResolutionError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

/// Which release to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// Most recently published release.
    Latest,
    /// Release whose tag equals the string exactly.
    Tag(String),
}

impl VersionSelector {
    /// Parse a selector; the literal `latest` selects the newest release.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "latest" {
            Self::Latest
        } else {
            Self::Tag(s.to_string())
        }
    }
}

impl std::fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// A release lookup for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseQuery {
    /// Repository name under the configured owner
    pub repo: String,
    /// Release to resolve
    pub selector: VersionSelector,
}

impl ReleaseQuery {
    /// Create a new query.
    #[must_use]
    pub fn new(repo: impl Into<String>, selector: VersionSelector) -> Self {
        Self {
            repo: repo.into(),
            selector,
        }
    }
}

/// Release data taken from the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseMetadata {
    /// Git tag of the release
    pub tag_name: String,
}

/// The two release queries a resolver needs.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the most recent published release.
    async fn latest_release(&self, repo: &str) -> Result<ReleaseMetadata, ResolutionError>;

    /// Fetch the release tagged exactly `tag`.
    async fn release_by_tag(
        &self,
        repo: &str,
        tag: &str,
    ) -> Result<ReleaseMetadata, ResolutionError>;
}

/// Resolves version selectors to concrete releases.
#[derive(Debug, Clone)]
pub struct ReleaseResolver<S> {
    source: S,
}

impl<S: ReleaseSource> ReleaseResolver<S> {
    /// Create a resolver over a release source.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Resolve a query with a single request; errors are never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::NotFound`] when no release matches or the
    /// service returns an empty tag, [`ResolutionError::Auth`] when the token
    /// is rejected, and [`ResolutionError::Request`] for anything else.
    pub async fn resolve(&self, query: &ReleaseQuery) -> Result<ReleaseMetadata, ResolutionError> {
        let release = match &query.selector {
            VersionSelector::Latest => self.source.latest_release(&query.repo).await?,
            VersionSelector::Tag(tag) => self.source.release_by_tag(&query.repo, tag).await?,
        };

        if release.tag_name.is_empty() {
            return Err(ResolutionError::not_found(
                &query.repo,
                query.selector.to_string(),
            ));
        }

        info!(repo = %query.repo, selector = %query.selector, tag = %release.tag_name, "Resolved release");
        Ok(release)
    }
}

/// [`ReleaseSource`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubReleaseSource {
    client: Client,
    config: GitHubConfig,
}

impl GitHubReleaseSource {
    /// Create a source using `client` for requests.
    #[must_use]
    pub const fn new(client: Client, config: GitHubConfig) -> Self {
        Self { client, config }
    }

    async fn get_release(
        &self,
        repo: &str,
        path: &str,
        selector: &str,
    ) -> Result<ReleaseMetadata, ResolutionError> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}",
            self.config.api_url, self.config.owner, repo, path
        );
        debug!(%url, "Fetching GitHub release");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ResolutionError::request(repo, e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ResolutionError::not_found(repo, selector)),
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                return Err(ResolutionError::auth(repo, status.as_u16()));
            }
            status if !status.is_success() => {
                return Err(ResolutionError::request(repo, format!("HTTP {status}")));
            }
            _ => {}
        }

        response
            .json()
            .await
            .map_err(|e| ResolutionError::request(repo, format!("invalid release payload: {e}")))
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn latest_release(&self, repo: &str) -> Result<ReleaseMetadata, ResolutionError> {
        self.get_release(repo, "latest", "latest").await
    }

    async fn release_by_tag(
        &self,
        repo: &str,
        tag: &str,
    ) -> Result<ReleaseMetadata, ResolutionError> {
        self.get_release(repo, &format!("tags/{tag}"), tag).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSource {
        calls: Mutex<Vec<String>>,
        tag: String,
    }

    impl RecordingSource {
        fn returning(tag: &str) -> Self {
            Self {
                calls: Mutex::default(),
                tag: tag.to_string(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<'a> ReleaseSource for &'a RecordingSource {
        async fn latest_release(&self, repo: &str) -> Result<ReleaseMetadata, ResolutionError> {
            self.calls.lock().unwrap().push(format!("latest:{repo}"));
            Ok(ReleaseMetadata {
                tag_name: format!("{}-latest", self.tag),
            })
        }

        async fn release_by_tag(
            &self,
            repo: &str,
            tag: &str,
        ) -> Result<ReleaseMetadata, ResolutionError> {
            self.calls.lock().unwrap().push(format!("tag:{repo}:{tag}"));
            Ok(ReleaseMetadata {
                tag_name: self.tag.clone(),
            })
        }
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(VersionSelector::parse("latest"), VersionSelector::Latest);
        assert_eq!(
            VersionSelector::parse("v1.2.3"),
            VersionSelector::Tag("v1.2.3".to_string())
        );
        // Only the exact literal selects latest
        assert_eq!(
            VersionSelector::parse("Latest"),
            VersionSelector::Tag("Latest".to_string())
        );
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(VersionSelector::Latest.to_string(), "latest");
        assert_eq!(VersionSelector::Tag("v0.1.0".into()).to_string(), "v0.1.0");
    }

    #[tokio::test]
    async fn test_latest_uses_latest_query() {
        let source = RecordingSource::returning("v9.0.0");
        let resolver = ReleaseResolver::new(&source);

        let release = resolver
            .resolve(&ReleaseQuery::new("nsv", VersionSelector::Latest))
            .await
            .unwrap();

        assert_eq!(release.tag_name, "v9.0.0-latest");
        assert_eq!(source.calls(), vec!["latest:nsv"]);
    }

    #[tokio::test]
    async fn test_explicit_tag_uses_tag_query() {
        let source = RecordingSource::returning("v1.2.3");
        let resolver = ReleaseResolver::new(&source);

        let release = resolver
            .resolve(&ReleaseQuery::new("nsv", VersionSelector::parse("v1.2.3")))
            .await
            .unwrap();

        assert_eq!(release.tag_name, "v1.2.3");
        assert_eq!(source.calls(), vec!["tag:nsv:v1.2.3"]);
    }

    #[tokio::test]
    async fn test_empty_tag_is_not_found() {
        let source = RecordingSource::returning("");
        let resolver = ReleaseResolver::new(&source);

        let err = resolver
            .resolve(&ReleaseQuery::new("nsv", VersionSelector::parse("v0.0.1")))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }
}
