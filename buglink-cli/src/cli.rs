use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Clone, Debug)]
pub enum CheckFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FallbackMode {
    /// Link matches without a parseable bug ID verbatim
    LinkRaw,
    /// Leave matches without a parseable bug ID unannotated
    Skip,
}

impl From<FallbackMode> for buglink::FallbackPolicy {
    fn from(mode: FallbackMode) -> Self {
        match mode {
            FallbackMode::LinkRaw => buglink::FallbackPolicy::LinkRaw,
            FallbackMode::Skip => buglink::FallbackPolicy::Skip,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "buglink")]
#[command(version)]
#[command(about = "Annotate changelog text with Bugzilla links")]
#[command(long_about = "
buglink rewrites bug-ID references in changelog text into hyperlinks,
optionally annotated with the bug's one-line summary as a tooltip,
fetched from the tracker's XML-RPC endpoint in a single batched call.

Example usage:
  buglink annotate 'Fixes 123'                  # Link bug references
  git log --format=%s | buglink annotate       # Annotate from stdin
  buglink check url https://bugs.example.com   # Validate tracker settings
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a buglink YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite bug-ID references in text as tracker hyperlinks
    #[command(long_about = "
Annotates one changelog entry. Text comes from the argument or, when
absent, from stdin. Bug IDs are located with the configured pattern;
with --tooltips each distinct ID is resolved to its summary in one
batched tracker call. Lookup failures degrade to plain links.

Examples:
  buglink annotate 'Fixes 123 and 456'
  buglink annotate --base-url https://bugs.example.com 'Fixes 123'
  git log -1 --format=%B | buglink annotate --tooltips
")]
    Annotate {
        /// Changelog text; read from stdin when omitted
        text: Option<String>,

        /// Tracker base URL (overrides configuration)
        #[arg(long)]
        base_url: Option<String>,

        /// Bug-ID pattern (overrides configuration)
        #[arg(long)]
        pattern: Option<String>,

        /// Fetch bug summaries and render them as tooltips
        #[arg(long)]
        tooltips: bool,

        /// Policy for matches without a parseable bug ID
        #[arg(long, value_enum)]
        fallback: Option<FallbackMode>,
    },
    /// Validate tracker settings
    #[command(long_about = "
Validates one administrator-supplied setting and reports a precise
message on failure.

Exit codes:
  0 - Check passed
  2 - Check failed

Examples:
  buglink check pattern '\\b[0-9]+\\b'
  buglink check url https://bugs.example.com
  buglink check login https://bugs.example.com qa@example.com secret
")]
    Check {
        #[command(subcommand)]
        subcommand: CheckSubcommand,

        /// Output format
        #[arg(long, value_enum, default_value = "text", global = true)]
        format: CheckFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum CheckSubcommand {
    /// Check that a bug-ID pattern compiles and cannot match empty text
    Pattern {
        /// The pattern to check
        value: String,
    },
    /// Check that a base URL points at a live tracker endpoint
    Url {
        /// The base URL to check
        value: String,
    },
    /// Check that credentials authenticate against the tracker
    Login {
        /// Tracker base URL
        url: String,
        /// Login name
        username: String,
        /// Password
        password: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_annotate() {
        let cli = Cli::try_parse_from(["buglink", "annotate", "Fixes 123", "--tooltips"]).unwrap();
        match cli.command {
            Some(Commands::Annotate { text, tooltips, .. }) => {
                assert_eq!(text.as_deref(), Some("Fixes 123"));
                assert!(tooltips);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_check_login() {
        let cli =
            Cli::try_parse_from(["buglink", "check", "login", "http://bt", "qa", "pw"]).unwrap();
        match cli.command {
            Some(Commands::Check { subcommand, .. }) => match subcommand {
                CheckSubcommand::Login { url, username, .. } => {
                    assert_eq!(url, "http://bt");
                    assert_eq!(username, "qa");
                }
                other => panic!("unexpected check subcommand: {:?}", other),
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::try_parse_from([
            "buglink",
            "annotate",
            "text",
            "--config",
            "/etc/buglink.yaml",
        ])
        .unwrap();
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/etc/buglink.yaml"))
        );
    }
}
