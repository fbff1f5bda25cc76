//! Process runner for downloaded tools.
//!
//! A single primitive, [`ProcessRunner::run`], executes a binary. How output
//! is captured and how the result is classified are chosen by an
//! [`ExecMode`]:
//!
//! - [`ExecMode::STRICT`] captures stdout and stderr separately and only fails
//!   when the exit code is non-zero *and* stderr is non-empty. Some tools
//!   write informational text to stderr, or exit non-zero without saying why,
//!   and the caller should not fail on those. This boundary is fuzzy on
//!   purpose and is not a general pattern.
//! - [`ExecMode::STREAMING`] accumulates stdout chunk by chunk as it is
//!   written and fails on any non-zero exit code.

use crate::error::ExecutionError;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How the child's output streams are captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCapture {
    /// Buffer stdout and stderr separately; stdout is returned trimmed.
    Separate,
    /// Read stdout incrementally into one buffer, echoing each chunk as it
    /// arrives; stderr passes through. The buffer is returned verbatim.
    Stream,
}

/// When an execution counts as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessPolicy {
    /// Fail on any non-zero exit code.
    ExitCode,
    /// Fail only on a non-zero exit code with non-empty stderr.
    ExitCodeAndStderr,
}

/// Capture policy paired with a success policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecMode {
    /// Output capture policy
    pub capture: OutputCapture,
    /// Success classification
    pub success: SuccessPolicy,
}

impl ExecMode {
    /// Separate capture, exit-code-plus-stderr classification.
    pub const STRICT: Self = Self {
        capture: OutputCapture::Separate,
        success: SuccessPolicy::ExitCodeAndStderr,
    };

    /// Streamed stdout, exit-code classification.
    pub const STREAMING: Self = Self {
        capture: OutputCapture::Stream,
        success: SuccessPolicy::ExitCode,
    };

    /// Classify a finished execution and shape its primary output.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::CommandFailed`] carrying stderr verbatim, or
    /// [`ExecutionError::ExitStatus`], depending on the success policy.
    pub fn finish(self, path: &Path, result: ExecutionResult) -> Result<String, ExecutionError> {
        match self.success {
            SuccessPolicy::ExitCode if result.exit_code != 0 => {
                return Err(ExecutionError::ExitStatus {
                    path: path.to_path_buf(),
                    exit_code: result.exit_code,
                });
            }
            SuccessPolicy::ExitCodeAndStderr
                if result.exit_code != 0 && !result.stderr.is_empty() =>
            {
                return Err(ExecutionError::CommandFailed {
                    exit_code: result.exit_code,
                    stderr: result.stderr,
                });
            }
            _ => {}
        }

        Ok(match self.capture {
            OutputCapture::Separate => result.stdout.trim().to_string(),
            OutputCapture::Stream => result.stdout,
        })
    }
}

/// Raw outcome of one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code, `-1` when terminated by a signal
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr (empty in streaming mode)
    pub stderr: String,
}

/// Executes binaries and classifies their results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new runner
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run `path` with `args` and return its primary output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or the mode
    /// classifies the result as a failure.
    #[tracing::instrument(name = "exec", skip(self, path, args), fields(binary = %path.display()))]
    pub async fn run(
        &self,
        path: &Path,
        args: &[&str],
        mode: ExecMode,
    ) -> Result<String, ExecutionError> {
        let mut cmd = Command::new(path);
        cmd.args(args).stdin(Stdio::null());

        debug!(?args, ?mode, "Starting process");
        let result = match mode.capture {
            OutputCapture::Separate => {
                capture_separate(cmd)
                    .await
                    .map_err(|source| ExecutionError::Spawn {
                        path: path.to_path_buf(),
                        source,
                    })?
            }
            OutputCapture::Stream => capture_stream(cmd, path).await?,
        };

        info!(exit_code = result.exit_code, "Process completed");
        mode.finish(path, result)
    }
}

async fn capture_separate(mut cmd: Command) -> std::io::Result<ExecutionResult> {
    let output = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    Ok(ExecutionResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

async fn capture_stream(mut cmd: Command, path: &Path) -> Result<ExecutionResult, ExecutionError> {
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| ExecutionError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;

    let mut buffer = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        if let Err(source) = pump(stdout, tokio::io::stdout(), &mut buffer).await {
            // Kill and reap the child
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill process after output error");
            }
            return Err(ExecutionError::Output {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    let status = child.wait().await.map_err(|source| ExecutionError::Spawn {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ExecutionResult {
        exit_code: status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&buffer).to_string(),
        stderr: String::new(),
    })
}

/// Copy `reader` into `buffer` chunk by chunk, echoing each chunk to `echo`.
async fn pump<R, W>(mut reader: R, mut echo: W, buffer: &mut Vec<u8>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        echo.write_all(&chunk[..n]).await?;
    }
    echo.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_strict_success_ignores_stderr_on_zero_exit() {
        let out = ExecMode::STRICT
            .finish(Path::new("nsv"), result(0, "  0.2.0\n", "warning: shallow clone"))
            .unwrap();
        assert_eq!(out, "0.2.0");
    }

    #[test]
    fn test_strict_failure_carries_stderr_verbatim() {
        let err = ExecMode::STRICT
            .finish(Path::new("nsv"), result(1, "", "boom"))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(matches!(
            err,
            ExecutionError::CommandFailed { exit_code: 1, .. }
        ));
    }

    #[test]
    fn test_strict_non_zero_exit_with_empty_stderr_succeeds() {
        let out = ExecMode::STRICT
            .finish(Path::new("nsv"), result(1, " v1.0.0 \n", ""))
            .unwrap();
        assert_eq!(out, "v1.0.0");
    }

    #[test]
    fn test_streaming_returns_buffer_untrimmed() {
        let out = ExecMode::STREAMING
            .finish(Path::new("gpg-import"), result(0, " imported\n", ""))
            .unwrap();
        assert_eq!(out, " imported\n");
    }

    #[test]
    fn test_streaming_fails_on_any_non_zero_exit() {
        let err = ExecMode::STREAMING
            .finish(Path::new("gpg-import"), result(3, "partial", ""))
            .unwrap_err();
        assert!(matches!(err, ExecutionError::ExitStatus { exit_code: 3, .. }));
    }

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_pump_echoes_and_accumulates() {
        let mut buffer = Vec::new();
        let mut echo = Vec::new();
        pump(&b"imported key"[..], &mut echo, &mut buffer).await.unwrap();
        assert_eq!(buffer, b"imported key");
        assert_eq!(echo, b"imported key");
    }

    #[tokio::test]
    async fn test_pump_surfaces_echo_failure() {
        let mut buffer = Vec::new();
        let err = pump(&b"data"[..], BrokenPipe, &mut buffer).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_output_error_is_not_a_spawn_error() {
        let err = ExecutionError::Output {
            path: "gpg-import".into(),
            source: std::io::ErrorKind::BrokenPipe.into(),
        };
        assert!(err.to_string().starts_with("failed to stream output of 'gpg-import'"));
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;

        const SH: &str = "/bin/sh";

        #[tokio::test]
        async fn test_strict_trims_stdout() {
            let out = ProcessRunner::new()
                .run(Path::new(SH), &["-c", "echo '  v0.3.0  '; echo note >&2"], ExecMode::STRICT)
                .await
                .unwrap();
            assert_eq!(out, "v0.3.0");
        }

        #[tokio::test]
        async fn test_strict_exit_one_with_stderr_fails() {
            let err = ProcessRunner::new()
                .run(Path::new(SH), &["-c", "printf boom >&2; exit 1"], ExecMode::STRICT)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "boom");
        }

        #[tokio::test]
        async fn test_strict_exit_one_without_stderr_succeeds() {
            let out = ProcessRunner::new()
                .run(Path::new(SH), &["-c", "echo done; exit 1"], ExecMode::STRICT)
                .await
                .unwrap();
            assert_eq!(out, "done");
        }

        #[tokio::test]
        async fn test_streaming_accumulates_chunks_in_order() {
            let out = ProcessRunner::new()
                .run(
                    Path::new(SH),
                    &["-c", "printf a; printf b; printf c"],
                    ExecMode::STREAMING,
                )
                .await
                .unwrap();
            assert_eq!(out, "abc");
        }

        #[tokio::test]
        async fn test_streaming_non_zero_exit_fails() {
            let err = ProcessRunner::new()
                .run(Path::new(SH), &["-c", "printf out; exit 4"], ExecMode::STREAMING)
                .await
                .unwrap_err();
            assert!(matches!(err, ExecutionError::ExitStatus { exit_code: 4, .. }));
        }

        #[tokio::test]
        async fn test_missing_binary_is_spawn_error() {
            let err = ProcessRunner::new()
                .run(Path::new("/nonexistent/nsv"), &["tag"], ExecMode::STRICT)
                .await
                .unwrap_err();
            assert!(matches!(err, ExecutionError::Spawn { .. }));
        }
    }
}
