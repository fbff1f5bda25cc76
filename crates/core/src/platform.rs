//! Host platform identification.

/// Operating system bucket used for artifact naming.
///
/// The mapping is exhaustive: linux and macOS get their own bucket and every
/// other OS is treated as windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux, any distribution
    Linux,
    /// macOS
    Darwin,
    /// Windows and every unrecognised OS
    Windows,
}

/// Architecture baked into every artifact name.
///
/// The CPU is never probed; only 64-bit x86 artifacts are selected, even on
/// arm64 runners.
pub const ARCH: &str = "x86_64";

impl Platform {
    /// Get the platform of the running binary.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Bucket an OS name as reported by `std::env::consts::OS`.
    #[must_use]
    pub fn from_os_name(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::Darwin,
            _ => Self::Windows,
        }
    }

    /// Suffix appended to executables on this platform.
    #[must_use]
    pub const fn exe_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Linux | Self::Darwin => "",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Darwin => write!(f, "darwin"),
            Self::Windows => write!(f, "windows"),
        }
    }
}
