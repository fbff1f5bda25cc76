//! Command line and Actions input parsing.
//!
//! Every flag can also be supplied through the environment variable the
//! Actions runner sets for the matching `with:` input.

use crate::orchestrator::ActionConfig;
use crate::tracing::{Level, LogLevel, TracingConfig, TracingFormat};
use clap::{ArgAction, Parser};
use nsv_action_github::{GitHubConfig, ToolCache, VersionSelector};
use std::path::PathBuf;

/// Variable whose non-empty value requests a GPG key import.
pub const GPG_PRIVATE_KEY_ENV: &str = "GPG_PRIVATE_KEY";

/// Set by the runner when step debug logging is enabled.
pub const RUNNER_DEBUG_ENV: &str = "RUNNER_DEBUG";

/// Install nsv from its GitHub releases and calculate the next semantic
/// version.
#[derive(Parser, Debug)]
#[command(name = "nsv-action")]
#[command(about = "Install and run nsv to calculate the next semantic version")]
#[command(long_about = None)]
pub struct Cli {
    /// Token used to query the releases API.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// nsv release to install, `latest` or an exact tag.
    #[arg(long, env = "INPUT_VERSION", default_value = "latest")]
    pub version: String,

    /// Only print the next version without tagging.
    #[arg(
        long = "next-only",
        env = "INPUT_NEXT-ONLY",
        default_value = "false",
        value_parser = parse_input_bool,
        action = ArgAction::Set
    )]
    pub next_only: bool,

    /// Owner of the nsv and gpg-import repositories.
    #[arg(long, default_value = nsv_action_github::config::DEFAULT_OWNER)]
    pub owner: String,

    /// Base URL of the REST API.
    #[arg(long, env = "GITHUB_API_URL", default_value = nsv_action_github::config::DEFAULT_API_URL)]
    pub api_url: String,

    /// Host serving release downloads.
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = nsv_action_github::config::DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Root of the tool cache.
    #[arg(long, env = "RUNNER_TOOL_CACHE")]
    pub cache_dir: Option<PathBuf>,

    /// Log output format.
    #[arg(long, default_value = "compact", value_enum)]
    pub log_format: TracingFormat,

    /// Logging verbosity level, `warn` unless runner debugging is on.
    #[arg(short = 'L', long, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Parse an Actions boolean input.
///
/// Accepts the YAML 1.2 core schema spellings only.
fn parse_input_bool(value: &str) -> Result<bool, String> {
    match value {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(format!(
            "Input is not a YAML 1.2 core schema boolean: {other}\n\
             Supported values: `true | True | TRUE | false | False | FALSE`"
        )),
    }
}

impl Cli {
    /// Version selector, treating an empty input as `latest`.
    #[must_use]
    pub fn selector(&self) -> VersionSelector {
        let version = self.version.trim();
        if version.is_empty() {
            VersionSelector::Latest
        } else {
            VersionSelector::parse(version)
        }
    }

    /// Endpoints and credentials for the release API.
    #[must_use]
    pub fn github_config(&self) -> GitHubConfig {
        GitHubConfig::default()
            .with_api_url(&self.api_url)
            .with_server_url(&self.server_url)
            .with_owner(&self.owner)
            .with_token(&self.token)
    }

    /// Tool cache rooted at `--cache-dir` or the platform cache directory.
    #[must_use]
    pub fn tool_cache(&self) -> ToolCache {
        match &self.cache_dir {
            Some(dir) if !dir.as_os_str().is_empty() => ToolCache::new(dir),
            _ => ToolCache::default(),
        }
    }

    /// Tracing settings, raised to debug when the runner asks for it.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let level = match self.log_level {
            Some(level) => level.into(),
            None if runner_debug() => Level::DEBUG,
            None => Level::WARN,
        };
        TracingConfig {
            format: self.log_format,
            level,
            filter: None,
        }
    }

    /// Run settings for the orchestrator.
    #[must_use]
    pub fn action_config(&self, import_gpg_key: bool) -> ActionConfig {
        ActionConfig {
            version: self.selector(),
            next_only: self.next_only,
            import_gpg_key,
        }
    }
}

fn runner_debug() -> bool {
    std::env::var(RUNNER_DEBUG_ENV).is_ok_and(|v| v == "1")
}

/// Whether a GPG private key was provided to the step.
#[must_use]
pub fn key_import_requested() -> bool {
    std::env::var(GPG_PRIVATE_KEY_ENV).is_ok_and(|v| !v.is_empty())
}

/// Parse the process arguments.
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT_VARS: [&str; 7] = [
        "INPUT_TOKEN",
        "INPUT_VERSION",
        "INPUT_NEXT-ONLY",
        "GITHUB_API_URL",
        "GITHUB_SERVER_URL",
        "RUNNER_TOOL_CACHE",
        RUNNER_DEBUG_ENV,
    ];

    fn parse_clean(args: &[&str]) -> Result<Cli, clap::Error> {
        temp_env::with_vars_unset(INPUT_VARS, || {
            Cli::try_parse_from(std::iter::once("nsv-action").chain(args.iter().copied()))
        })
    }

    #[test]
    fn test_defaults() {
        let cli = parse_clean(&[]).unwrap();
        assert_eq!(cli.selector(), VersionSelector::Latest);
        assert!(!cli.next_only);
        assert_eq!(cli.owner, "purpleclay");
        assert!(cli.github_config().token.is_none());
        assert_eq!(cli.github_config().api_url, "https://api.github.com");
    }

    #[test]
    fn test_flags() {
        let cli = parse_clean(&[
            "--token",
            "ghp_abc",
            "--version",
            "v1.2.3",
            "--next-only",
            "true",
            "--api-url",
            "http://127.0.0.1:9000/",
        ])
        .unwrap();

        assert_eq!(cli.selector(), VersionSelector::Tag("v1.2.3".to_string()));
        assert!(cli.next_only);
        let config = cli.github_config();
        assert_eq!(config.token.as_deref(), Some("ghp_abc"));
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_inputs_from_environment() {
        let cli = temp_env::with_vars(
            [
                ("INPUT_TOKEN", Some("ghp_env")),
                ("INPUT_VERSION", Some("v0.5.0")),
                ("INPUT_NEXT-ONLY", Some("TRUE")),
                ("RUNNER_TOOL_CACHE", Some("/opt/hostedtoolcache")),
            ],
            || Cli::try_parse_from(["nsv-action"]),
        )
        .unwrap();

        assert_eq!(cli.selector(), VersionSelector::Tag("v0.5.0".to_string()));
        assert!(cli.next_only);
        assert_eq!(cli.github_config().token.as_deref(), Some("ghp_env"));
        assert_eq!(
            cli.tool_cache().root(),
            std::path::Path::new("/opt/hostedtoolcache")
        );
    }

    #[test]
    fn test_input_bool_spellings() {
        for value in ["true", "True", "TRUE"] {
            assert_eq!(parse_input_bool(value), Ok(true));
        }
        for value in ["false", "False", "FALSE"] {
            assert_eq!(parse_input_bool(value), Ok(false));
        }
        assert!(parse_input_bool("yes").is_err());
        assert!(parse_input_bool("tRuE").is_err());
    }

    #[test]
    fn test_invalid_next_only_is_rejected() {
        assert!(parse_clean(&["--next-only", "1"]).is_err());
    }

    #[test]
    fn test_empty_version_is_latest() {
        let cli = parse_clean(&["--version", ""]).unwrap();
        assert_eq!(cli.selector(), VersionSelector::Latest);
    }

    #[test]
    fn test_action_config() {
        let cli = parse_clean(&["--version", "v2.0.0", "--next-only", "false"]).unwrap();
        let config = cli.action_config(true);
        assert_eq!(config.version, VersionSelector::parse("v2.0.0"));
        assert!(!config.next_only);
        assert!(config.import_gpg_key);
    }

    #[test]
    fn test_runner_debug_raises_level() {
        let cli = parse_clean(&[]).unwrap();
        let level = temp_env::with_var(RUNNER_DEBUG_ENV, Some("1"), || cli.tracing_config().level);
        assert_eq!(level, Level::DEBUG);

        let level = temp_env::with_var_unset(RUNNER_DEBUG_ENV, || cli.tracing_config().level);
        assert_eq!(level, Level::WARN);
    }

    #[test]
    fn test_explicit_level_wins() {
        let cli = parse_clean(&["--log-level", "error"]).unwrap();
        let level = temp_env::with_var(RUNNER_DEBUG_ENV, Some("1"), || cli.tracing_config().level);
        assert_eq!(level, Level::ERROR);
    }

    #[test]
    fn test_key_import_requested() {
        assert!(temp_env::with_var(GPG_PRIVATE_KEY_ENV, Some("-----BEGIN"), key_import_requested));
        assert!(!temp_env::with_var(GPG_PRIVATE_KEY_ENV, Some(""), key_import_requested));
        assert!(!temp_env::with_var_unset(GPG_PRIVATE_KEY_ENV, key_import_requested));
    }
}
