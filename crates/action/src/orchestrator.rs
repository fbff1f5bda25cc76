//! The run pipeline: optional key import, install nsv, run nsv.

use crate::workflow;
use async_trait::async_trait;
use nsv_action_core::{Download, ExecMode, Platform, ProcessRunner, Result, Tool};
use nsv_action_github::{
    Acquirer, GitHubConfig, GitHubReleaseSource, HttpArtifactFetcher, ReleaseResolver, ToolCache,
    ToolInstaller, VersionSelector, http_client,
};
use tracing::info;

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    /// nsv release to install
    pub version: VersionSelector,
    /// Run `nsv next` instead of `nsv tag`
    pub next_only: bool,
    /// Install and run gpg-import before nsv
    pub import_gpg_key: bool,
}

/// Installs and executes tools on behalf of [`run`].
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Install `tool` at `selector` and return where its binary lives.
    async fn install(&self, tool: Tool, selector: &VersionSelector) -> Result<Download>;

    /// Execute an installed tool.
    async fn execute(&self, download: &Download, args: &[&str], mode: ExecMode) -> Result<String>;
}

/// Toolchain backed by GitHub releases and local processes.
pub struct ReleaseToolchain {
    installer: ToolInstaller<GitHubReleaseSource, HttpArtifactFetcher>,
    runner: ProcessRunner,
}

impl ReleaseToolchain {
    /// Build a toolchain for `platform` caching into `cache`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: GitHubConfig, cache: ToolCache, platform: Platform) -> Result<Self> {
        let client = http_client()?;
        let acquirer = Acquirer::new(
            HttpArtifactFetcher::new(client.clone()),
            cache,
            config.server_url.clone(),
            config.owner.clone(),
        );
        let resolver = ReleaseResolver::new(GitHubReleaseSource::new(client, config));

        Ok(Self {
            installer: ToolInstaller::new(resolver, acquirer, platform),
            runner: ProcessRunner::new(),
        })
    }
}

#[async_trait]
impl Toolchain for ReleaseToolchain {
    async fn install(&self, tool: Tool, selector: &VersionSelector) -> Result<Download> {
        self.installer.install(tool, selector).await
    }

    async fn execute(&self, download: &Download, args: &[&str], mode: ExecMode) -> Result<String> {
        Ok(self.runner.run(&download.path, args, mode).await?)
    }
}

/// Run the pipeline and return the nsv output.
///
/// # Errors
///
/// Returns the first error raised by any step; nothing after it runs.
pub async fn run<T: Toolchain + ?Sized>(config: &ActionConfig, toolchain: &T) -> Result<String> {
    if config.import_gpg_key {
        workflow::group("Importing GPG Key", import_gpg_key(toolchain)).await?;
    }

    let nsv = workflow::group("Downloading NSV", async {
        let nsv = toolchain.install(Tool::Nsv, &config.version).await?;
        workflow::info(&format!("nsv: {}", nsv.version));
        Ok::<_, nsv_action_core::Error>(nsv)
    })
    .await?;

    let command = if config.next_only { "next" } else { "tag" };
    let output = workflow::group("Running NSV", async {
        let output = toolchain.execute(&nsv, &[command], ExecMode::STRICT).await?;
        workflow::info(&output);
        Ok::<_, nsv_action_core::Error>(output)
    })
    .await?;

    info!(command, version = %nsv.version, "nsv completed");
    Ok(output)
}

async fn import_gpg_key<T: Toolchain + ?Sized>(toolchain: &T) -> Result<()> {
    let gpg_import = toolchain
        .install(Tool::GpgImport, &VersionSelector::Latest)
        .await?;
    workflow::info(&format!("Downloaded gpg-import: {}", gpg_import.version));

    toolchain
        .execute(&gpg_import, &[], ExecMode::STREAMING)
        .await?;
    Ok(())
}
