//! Persistent tool cache.
//!
//! Uses the directory shape of the hosted runner tool cache, so it can live
//! under `RUNNER_TOOL_CACHE`. Versions are keyed by the raw release tag,
//! which `@actions/tool-cache` would semver-clean, so entries are not
//! shared with other actions:
//!
//! ```text
//! <root>/
//! └── nsv/
//!     └── v1.2.3/
//!         ├── x64/          # extracted archive contents
//!         └── x64.complete  # written once the directory is fully populated
//! ```
//!
//! An entry without its marker is treated as missing and replaced on the
//! next store.

use nsv_action_core::AcquisitionError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, trace};

/// Architecture directory name used for every entry.
const CACHE_ARCH: &str = "x64";

/// Tool cache keyed by (tool, version).
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl Default for ToolCache {
    fn default() -> Self {
        Self::new(default_cache_root())
    }
}

/// Get the default cache root, `~/.cache/nsv-action/tools`.
#[must_use]
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("nsv-action")
        .join("tools")
}

impl ToolCache {
    /// Create a cache at the specified root directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the extracted contents for a key.
    #[must_use]
    pub fn tool_dir(&self, tool: &str, version: &str) -> PathBuf {
        self.root.join(tool).join(version).join(CACHE_ARCH)
    }

    fn marker(&self, tool: &str, version: &str) -> PathBuf {
        self.root
            .join(tool)
            .join(version)
            .join(format!("{CACHE_ARCH}.complete"))
    }

    /// Get a cached entry if it is complete.
    #[must_use]
    pub fn find(&self, tool: &str, version: &str) -> Option<PathBuf> {
        let dir = self.tool_dir(tool, version);
        if dir.is_dir() && self.marker(tool, version).is_file() {
            trace!(tool, version, ?dir, "Cache hit");
            Some(dir)
        } else {
            trace!(tool, version, "Cache miss");
            None
        }
    }

    /// Create a scratch directory inside the cache root.
    ///
    /// Staging under the root keeps the final move a same-filesystem rename.
    /// The directory is removed when the guard drops.
    pub fn staging_dir(&self) -> Result<TempDir, AcquisitionError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| AcquisitionError::cache_write(&self.root, e))?;
        tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.root)
            .map_err(|e| AcquisitionError::cache_write(&self.root, e))
    }

    /// Move `source` into the cache under (tool, version) and mark it
    /// complete.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::CacheWrite`] if any filesystem step fails.
    pub fn store(&self, source: &Path, tool: &str, version: &str) -> Result<PathBuf, AcquisitionError> {
        let dest = self.tool_dir(tool, version);
        let marker = self.marker(tool, version);

        // Drop any incomplete entry left by an interrupted run
        if marker.exists() {
            std::fs::remove_file(&marker).map_err(|e| AcquisitionError::cache_write(&marker, e))?;
        }
        if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(|e| AcquisitionError::cache_write(&dest, e))?;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AcquisitionError::cache_write(parent, e))?;
        }

        std::fs::rename(source, &dest).map_err(|e| AcquisitionError::cache_write(&dest, e))?;
        std::fs::write(&marker, b"").map_err(|e| AcquisitionError::cache_write(&marker, e))?;

        debug!(tool, version, ?dest, "Stored tool in cache");
        Ok(dest)
    }
}
