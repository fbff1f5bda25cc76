//! Core types for nsv-action.
//!
//! - [`artifact`] - per-tool release archive naming
//! - [`platform`] - host platform bucket
//! - [`exec`] - process runner with strict and streaming modes
//! - [`error`] - the error taxonomy shared by every crate

pub mod artifact;
pub mod error;
pub mod exec;
pub mod platform;

pub use artifact::{ArchiveFormat, ArtifactDescriptor, Download, TOOLS, Tool, select_artifact};
pub use error::{
    AcquisitionError, Error, ExecutionError, ResolutionError, Result, SelectionError,
};
pub use exec::{ExecMode, ExecutionResult, OutputCapture, ProcessRunner, SuccessPolicy};
pub use platform::{ARCH, Platform};
