//! nsv-action: install nsv from its GitHub releases and run it inside a
//! workflow step.
//!
//! - [`cli`] - inputs from flags or the runner's `INPUT_*` variables
//! - [`orchestrator`] - the key import, install and run pipeline
//! - [`workflow`] - workflow commands written to stdout
//! - [`tracing`] - diagnostics on stderr

pub mod cli;
pub mod orchestrator;
pub mod tracing;
pub mod workflow;

pub use orchestrator::{ActionConfig, ReleaseToolchain, Toolchain, run};
