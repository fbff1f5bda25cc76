//! GitHub Actions workflow commands.
//!
//! Workflow commands are lines on stdout that the runner interprets, so this
//! is the one module allowed to print.

#![allow(clippy::print_stdout)]

use std::fmt::Write as _;
use std::future::Future;
use std::io::Write as _;
use std::path::Path;
use uuid::Uuid;

/// Environment variable naming the step output file.
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// Escape a message for use as workflow command data.
#[must_use]
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Write a plain log line.
pub fn info(message: &str) {
    println!("{message}");
}

/// Open a collapsible log group.
pub fn group_start(name: &str) {
    println!("::group::{}", escape_data(name));
}

/// Close the innermost log group.
pub fn group_end() {
    println!("::endgroup::");
}

/// Run `fut` inside a named log group.
///
/// The group is closed whether the future succeeds or fails.
pub async fn group<F, T>(name: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    group_start(name);
    let out = fut.await;
    group_end();
    out
}

/// Report an error annotation for the run.
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Format a heredoc block for the output file.
///
/// Returns `None` when the delimiter occurs in the name or value, since the
/// runner could not tell where the block ends.
fn output_block(name: &str, value: &str, delimiter: &str) -> Option<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return None;
    }
    let mut block = String::new();
    let _ = writeln!(block, "{name}<<{delimiter}");
    let _ = writeln!(block, "{value}");
    let _ = writeln!(block, "{delimiter}");
    Some(block)
}

/// Append an output to the file at `path`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written or the value contains
/// the generated delimiter.
pub fn set_output_to(path: &Path, name: &str, value: &str) -> std::io::Result<()> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    let block = output_block(name, value, &delimiter).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output {name} contains the delimiter {delimiter}"),
        )
    })?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(block.as_bytes())
}

/// Publish a step output.
///
/// Uses the file named by `GITHUB_OUTPUT` and falls back to the legacy
/// `::set-output` command on runners that do not provide one.
///
/// # Errors
///
/// Returns an I/O error if the output file cannot be written.
pub fn set_output(name: &str, value: &str) -> std::io::Result<()> {
    match std::env::var_os(OUTPUT_FILE_ENV).filter(|p| !p.is_empty()) {
        Some(path) => set_output_to(Path::new(&path), name, value),
        None => {
            println!("::set-output name={name}::{}", escape_data(value));
            Ok(())
        }
    }
}
