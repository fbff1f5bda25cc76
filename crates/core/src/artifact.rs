//! Artifact naming for the tools this action installs.
//!
//! Each tool publishes its release archives under a fixed naming convention.
//! The conventions live in [`TOOLS`], one row per tool, so the full set of
//! supported tools is visible in one place.

use crate::platform::{ARCH, Platform};
use std::path::{Path, PathBuf};

/// A tool published as GitHub release archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Next semantic version calculator.
    Nsv,
    /// GPG key importer.
    GpgImport,
}

impl Tool {
    /// Repository name, also used as the binary name.
    #[must_use]
    pub fn id(self) -> &'static str {
        self.naming().id
    }

    /// The naming convention row for this tool.
    #[must_use]
    pub fn naming(self) -> &'static ToolNaming {
        match self {
            Self::Nsv => &TOOLS[0],
            Self::GpgImport => &TOOLS[1],
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Naming convention of one tool's release archives.
#[derive(Debug)]
pub struct ToolNaming {
    /// Tool this row describes.
    pub tool: Tool,
    /// Repository name and binary stem.
    pub id: &'static str,
    /// Builds the archive filename from the raw release tag.
    pub archive: fn(tag: &str, platform: Platform) -> String,
}

/// Every supported tool. Indexed by [`Tool::naming`].
pub static TOOLS: [ToolNaming; 2] = [
    ToolNaming {
        tool: Tool::Nsv,
        id: "nsv",
        archive: nsv_archive,
    },
    ToolNaming {
        tool: Tool::GpgImport,
        id: "gpg-import",
        archive: gpg_import_archive,
    },
];

// nsv archives carry the version without its `v` prefix
fn nsv_archive(tag: &str, platform: Platform) -> String {
    let version = tag.strip_prefix('v').unwrap_or(tag);
    match platform {
        Platform::Linux => format!("nsv_{version}_linux_{ARCH}.tar.gz"),
        Platform::Darwin => format!("nsv_{version}_darwin_{ARCH}.tar.gz"),
        Platform::Windows => format!("nsv_{version}_windows_{ARCH}.zip"),
    }
}

// gpg-import archives use the raw tag and rust target triples
fn gpg_import_archive(tag: &str, platform: Platform) -> String {
    match platform {
        Platform::Linux => format!("gpg-import-{tag}-{ARCH}-unknown-linux-musl.tar.gz"),
        Platform::Darwin => format!("gpg-import-{tag}-{ARCH}-apple-darwin.tar.gz"),
        Platform::Windows => format!("gpg-import-{tag}-{ARCH}-pc-windows-msvc.zip"),
    }
}

/// The archive to download and the binary expected inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Release asset filename.
    pub archive_filename: String,
    /// Executable name after extraction.
    pub binary_name: String,
}

/// Compute the artifact for a tool release on a platform.
#[must_use]
pub fn select_artifact(tool: Tool, tag: &str, platform: Platform) -> ArtifactDescriptor {
    let naming = tool.naming();
    ArtifactDescriptor {
        archive_filename: (naming.archive)(tag, platform),
        binary_name: format!("{}{}", naming.id, platform.exe_suffix()),
    }
}

/// Archive encodings understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// gzip-compressed tarball
    TarGz,
    /// zip archive
    Zip,
}

impl ArchiveFormat {
    /// Infer the encoding from an archive filename.
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// A tool installed in the cache, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Absolute path of the executable.
    pub path: PathBuf,
    /// Release tag that was installed.
    pub version: String,
}

impl Download {
    /// Locate `binary_name` inside an acquired directory.
    #[must_use]
    pub fn new(dir: &Path, binary_name: &str, version: impl Into<String>) -> Self {
        Self {
            path: dir.join(binary_name),
            version: version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_table() {
        let cases = [
            (Tool::Nsv, Platform::Linux, "nsv_1.2.3_linux_x86_64.tar.gz", "nsv"),
            (Tool::Nsv, Platform::Darwin, "nsv_1.2.3_darwin_x86_64.tar.gz", "nsv"),
            (Tool::Nsv, Platform::Windows, "nsv_1.2.3_windows_x86_64.zip", "nsv.exe"),
            (
                Tool::GpgImport,
                Platform::Linux,
                "gpg-import-v1.2.3-x86_64-unknown-linux-musl.tar.gz",
                "gpg-import",
            ),
            (
                Tool::GpgImport,
                Platform::Darwin,
                "gpg-import-v1.2.3-x86_64-apple-darwin.tar.gz",
                "gpg-import",
            ),
            (
                Tool::GpgImport,
                Platform::Windows,
                "gpg-import-v1.2.3-x86_64-pc-windows-msvc.zip",
                "gpg-import.exe",
            ),
        ];

        for (tool, platform, archive, binary) in cases {
            let artifact = select_artifact(tool, "v1.2.3", platform);
            assert_eq!(artifact.archive_filename, archive, "{tool} on {platform}");
            assert_eq!(artifact.binary_name, binary, "{tool} on {platform}");
            assert_eq!(
                artifact.binary_name.ends_with(".exe"),
                platform == Platform::Windows
            );
        }
    }

    #[test]
    fn test_nsv_tag_without_prefix_is_unchanged() {
        let artifact = select_artifact(Tool::Nsv, "0.9.0", Platform::Linux);
        assert_eq!(artifact.archive_filename, "nsv_0.9.0_linux_x86_64.tar.gz");
    }

    #[test]
    fn test_nsv_strips_only_one_prefix() {
        let artifact = select_artifact(Tool::Nsv, "vv1.0.0", Platform::Linux);
        assert_eq!(artifact.archive_filename, "nsv_v1.0.0_linux_x86_64.tar.gz");
    }

    #[test]
    fn test_table_rows_match_tools() {
        for naming in &TOOLS {
            assert_eq!(naming.tool.naming().id, naming.id);
            assert_eq!(naming.tool.id(), naming.id);
        }
    }

    #[test]
    fn test_archive_format() {
        assert_eq!(
            ArchiveFormat::from_filename("nsv_1.0.0_linux_x86_64.tar.gz"),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(ArchiveFormat::from_filename("a.tgz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_filename("a.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_filename("a.tar.xz"), None);
    }

    #[test]
    fn test_download_path_joins_binary() {
        let download = Download::new(Path::new("/cache/nsv/v1.2.3/x64"), "nsv", "v1.2.3");
        assert_eq!(download.path, PathBuf::from("/cache/nsv/v1.2.3/x64/nsv"));
        assert_eq!(download.version, "v1.2.3");
    }
}
