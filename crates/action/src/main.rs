//! nsv-action binary.
//!
//! Reads the step inputs, runs the pipeline and publishes the `nsv` output.
//! Any failure is reported as an `::error::` annotation and exit code 1.

// Panic output bypasses tracing
#![allow(clippy::print_stderr)]

use nsv_action::cli::{self, Cli};
use nsv_action::orchestrator::{self, ReleaseToolchain};
use nsv_action::tracing::init_tracing;
use nsv_action::workflow;
use nsv_action_core::{Error, Platform, Result};

/// Output name the nsv result is published under
const OUTPUT_NAME: &str = "nsv";

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("{e}");
    }

    let code = match execute(&cli) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            tracing::error!(error = ?e, "Run failed");
            workflow::error(&e.to_string());
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

fn execute(cli: &Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::configuration(format!("failed to start async runtime: {e}")))?;

    let config = cli.action_config(cli::key_import_requested());
    let toolchain =
        ReleaseToolchain::new(cli.github_config(), cli.tool_cache(), Platform::current())?;

    let output = runtime.block_on(orchestrator::run(&config, &toolchain))?;

    workflow::set_output(OUTPUT_NAME, &output)
        .map_err(|e| Error::configuration(format!("failed to set output {OUTPUT_NAME}: {e}")))
}
