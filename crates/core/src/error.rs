//! Error types for nsv-action.
//!
//! Every category is fatal. The top-level [`Error`] is transparent so the
//! message reported to the pipeline is exactly the underlying error's text.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for nsv-action operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type, one variant per pipeline stage.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Release lookup against the hosting service failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolutionError),

    /// No artifact naming exists for the platform.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Selection(#[from] SelectionError),

    /// Download, extraction or cache storage failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// The downloaded tool failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),

    /// Invalid run configuration.
    #[error("{0}")]
    #[diagnostic(code(nsv_action::config::invalid))]
    Configuration(String),
}

impl Error {
    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Errors raised while resolving a release.
#[derive(Error, Debug, Diagnostic)]
pub enum ResolutionError {
    /// The hosting service returned no release.
    #[error("release {selector} of {repo} not found")]
    #[diagnostic(
        code(nsv_action::resolution::not_found),
        help("check the release exists and the version is spelled exactly as tagged")
    )]
    NotFound {
        /// Repository the release was requested from
        repo: String,
        /// `latest` or the explicit tag
        selector: String,
    },

    /// The access token was rejected.
    #[error("access token rejected while querying releases of {repo} (HTTP {status})")]
    #[diagnostic(code(nsv_action::resolution::auth))]
    Auth {
        /// Repository the release was requested from
        repo: String,
        /// HTTP status returned by the service
        status: u16,
    },

    /// Any other failure talking to the service.
    #[error("failed to query releases of {repo}: {message}")]
    #[diagnostic(code(nsv_action::resolution::request))]
    Request {
        /// Repository the release was requested from
        repo: String,
        /// Description of the failure
        message: String,
    },
}

impl ResolutionError {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(repo: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::NotFound {
            repo: repo.into(),
            selector: selector.into(),
        }
    }

    /// Create an authentication error.
    #[must_use]
    pub fn auth(repo: impl Into<String>, status: u16) -> Self {
        Self::Auth {
            repo: repo.into(),
            status,
        }
    }

    /// Create a request error.
    #[must_use]
    pub fn request(repo: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            repo: repo.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while selecting an artifact.
///
/// The platform mapping is exhaustive today, so nothing constructs this yet.
#[derive(Error, Debug, Diagnostic)]
pub enum SelectionError {
    /// No artifact is published for the platform.
    #[error("{tool} is not published for {platform}")]
    #[diagnostic(code(nsv_action::selection::unsupported_platform))]
    UnsupportedPlatform {
        /// Tool identifier
        tool: String,
        /// Platform description
        platform: String,
    },
}

/// Errors raised while downloading, extracting or caching an artifact.
#[derive(Error, Debug, Diagnostic)]
pub enum AcquisitionError {
    /// The artifact could not be downloaded.
    #[error("failed to download {url}: {message}")]
    #[diagnostic(code(nsv_action::acquisition::network))]
    Network {
        /// Source URL
        url: String,
        /// Description of the failure
        message: String,
    },

    /// The archive is corrupt or of an unexpected format.
    #[error("failed to extract {archive}: {message}")]
    #[diagnostic(code(nsv_action::acquisition::extraction))]
    Extraction {
        /// Archive filename
        archive: String,
        /// Description of the failure
        message: String,
    },

    /// Local storage was unavailable.
    #[error("failed to write tool cache at {}: {source}", path.display())]
    #[diagnostic(code(nsv_action::acquisition::cache_write))]
    CacheWrite {
        /// Path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl AcquisitionError {
    /// Create a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extraction(archive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            archive: archive.into(),
            message: message.into(),
        }
    }

    /// Create a cache write error.
    #[must_use]
    pub fn cache_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWrite {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the process runner.
#[derive(Error, Debug, Diagnostic)]
pub enum ExecutionError {
    /// The process could not be started or awaited.
    #[error("failed to execute '{}': {source}", path.display())]
    #[diagnostic(code(nsv_action::execution::spawn))]
    Spawn {
        /// Executable path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Strict mode failure; the message is the tool's stderr verbatim.
    #[error("{stderr}")]
    #[diagnostic(code(nsv_action::execution::command_failed))]
    CommandFailed {
        /// Exit code of the process
        exit_code: i32,
        /// Captured stderr
        stderr: String,
    },

    /// Output could not be read from the child or echoed while it ran.
    #[error("failed to stream output of '{}': {source}", path.display())]
    #[diagnostic(code(nsv_action::execution::output))]
    Output {
        /// Executable path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Streaming mode failure on any non-zero exit.
    #[error("The process '{}' failed with exit code {exit_code}", path.display())]
    #[diagnostic(code(nsv_action::execution::exit_status))]
    ExitStatus {
        /// Executable path
        path: PathBuf,
        /// Exit code of the process
        exit_code: i32,
    },
}
