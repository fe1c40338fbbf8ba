//! cli
//!
//! Command-line interface layer for mactl.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Route the parsed command to its feature module
//! - Render outcomes and errors, and choose the exit code
//!
//! # Architecture
//!
//! [`parse_from`] turns argv into a [`Cli`] without ever exiting the process,
//! so routing is testable. [`run_with`] is the full pipeline: parse, build a
//! [`Context`], dispatch, then classify any error into an exit code through
//! [`classify`]. It is the single place that writes errors to the terminal.
//!
//! # Example
//!
//! ```
//! use mactl::cli::{self, Invocation};
//! use mactl::cli::args::{Command, EnvVarAction};
//!
//! let Ok(Invocation::Run(cli)) = cli::parse_from(["mactl", "env-var", "add", "FOO", "bar"]) else {
//!     panic!("expected a command");
//! };
//! assert!(matches!(
//!     cli.command,
//!     Command::EnvVar { action: EnvVarAction::Add { ref name, ref value, .. } }
//!         if name == "FOO" && value == "bar"
//! ));
//! ```

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::error::ErrorKind;
use clap::Parser;
use thiserror::Error;

use crate::core::failure::{classify, Classify, FailureKind};
use crate::core::settings::{Settings, SettingsOverrides};
use crate::core::Context;
use crate::process::{interrupt, ProcessRunner, SystemRunner, TimeoutRunner};
use crate::ui::{output, telemetry};

/// Argument errors.
#[derive(Debug, Error)]
pub enum UsageError {
    /// No command matched.
    #[error("{}", summary(.rendered))]
    UnknownCommand { rendered: String },

    /// A command matched but its arguments did not parse.
    #[error("{}", summary(.rendered))]
    InvalidFlag { rendered: String },
}

impl UsageError {
    /// clap's full message, including usage and hints.
    pub fn rendered(&self) -> &str {
        match self {
            UsageError::UnknownCommand { rendered } | UsageError::InvalidFlag { rendered } => {
                rendered
            }
        }
    }
}

impl Classify for UsageError {
    fn kind(&self) -> FailureKind {
        FailureKind::Usage
    }
}

fn summary(rendered: &str) -> String {
    rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

/// Result of a successful parse.
#[derive(Debug)]
pub enum Invocation {
    /// Run this command.
    Run(Box<Cli>),
    /// Print this text and exit 0 (`--help`, `--version`).
    Display(String),
}

/// Parse `argv` (program name first) without exiting.
pub fn parse_from<I, T>(argv: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(argv) {
        Ok(cli) => Ok(Invocation::Run(Box::new(cli))),
        Err(err) => {
            let rendered = err.render().to_string();
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    Ok(Invocation::Display(rendered))
                }
                ErrorKind::InvalidSubcommand
                | ErrorKind::MissingSubcommand
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    Err(UsageError::UnknownCommand { rendered })
                }
                _ => Err(UsageError::InvalidFlag { rendered }),
            }
        }
    }
}

/// Run mactl with the process arguments and real external tools.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> i32 {
    run_with(std::env::args_os(), &SystemRunner::new())
}

/// Run mactl with `argv`, spawning tools through `runner`.
///
/// Returns the process exit code.
pub fn run_with<I, T>(argv: I, runner: &dyn ProcessRunner) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match parse_from(argv) {
        Ok(Invocation::Run(cli)) => *cli,
        Ok(Invocation::Display(text)) => {
            print!("{text}");
            return 0;
        }
        Err(err) => {
            eprint!("{}", err.rendered());
            return err.kind().exit_code();
        }
    };

    let debug = cli.debug || telemetry::debug_from_env();
    telemetry::init_tracing(output::Verbosity::from_flags(cli.quiet, cli.debug));

    let code = match execute(cli, runner) {
        Ok(()) => 0,
        Err(err) => {
            let kind = classify(&err);
            tracing::debug!(%kind, "command failed");
            output::error(output::render_error(&err, debug));
            kind.exit_code()
        }
    };

    if interrupt::requested() && code != interrupt::INTERRUPTED_EXIT_CODE {
        output::error("interrupted");
        return interrupt::INTERRUPTED_EXIT_CODE;
    }
    code
}

fn execute(cli: Cli, runner: &dyn ProcessRunner) -> Result<()> {
    let ctx = build_context(&cli)?;
    let runner = TimeoutRunner::new(runner, ctx.settings.timeout);
    commands::dispatch(cli.command, &ctx, &runner)
}

fn build_context(cli: &Cli) -> Result<Context> {
    let cwd = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    if !cwd.is_dir() {
        anyhow::bail!("--cwd {} is not a directory", cwd.display());
    }

    let overrides = SettingsOverrides {
        timeout_secs: cli.timeout,
        user_profile: profile_override(&cli.command),
    };
    let settings = Settings::resolve(&overrides)?;

    Ok(Context {
        cwd,
        debug: cli.debug,
        quiet: cli.quiet,
        settings,
    })
}

fn profile_override(command: &args::Command) -> Option<PathBuf> {
    use args::{Command, EnvVarAction};

    match command {
        Command::EnvVar {
            action: EnvVarAction::List { profile, .. } | EnvVarAction::Add { profile, .. },
        } => profile.profile.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::args::{Command, EnvVarAction, GitAction, OptimizeTarget, ScopeArg};
    use super::*;
    use crate::process::fake::FakeRunner;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("mactl").chain(args.iter().copied());
        match parse_from(argv) {
            Ok(Invocation::Run(cli)) => *cli,
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn routes_env_var_add() {
        let cli = parse(&["env-var", "add", "FOO", "bar"]);
        match cli.command {
            Command::EnvVar {
                action:
                    EnvVarAction::Add {
                        name,
                        value,
                        profile,
                        overwrite,
                    },
            } => {
                assert_eq!(name, "FOO");
                assert_eq!(value, "bar");
                assert_eq!(profile.scope, ScopeArg::User);
                assert!(!overwrite);
            }
            other => panic!("routed to {other:?}"),
        }
    }

    #[test]
    fn routes_nested_commands() {
        assert!(matches!(
            parse(&["optimize", "dock", "autohide"]).command,
            Command::Optimize {
                target: OptimizeTarget::Dock { value: None, .. }
            }
        ));
        assert!(matches!(
            parse(&["git", "config", "user.name", "me", "--local"]).command,
            Command::Git {
                action: GitAction::Config { local: true, .. }
            }
        ));
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = parse(&["setup", "kustomize", "--debug", "--timeout", "30"]);
        assert!(cli.debug);
        assert_eq!(cli.timeout, Some(30));
    }

    #[test]
    fn unknown_command_is_usage_error() {
        let err = parse_from(["mactl", "frobnicate"]).unwrap_err();
        assert!(matches!(err, UsageError::UnknownCommand { .. }));
        assert_eq!(err.kind().exit_code(), 2);
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn missing_command_is_unknown_command() {
        assert!(matches!(
            parse_from(["mactl"]),
            Err(UsageError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn bad_flag_is_invalid_flag() {
        assert!(matches!(
            parse_from(["mactl", "env-var", "list", "--bogus"]),
            Err(UsageError::InvalidFlag { .. })
        ));
        assert!(matches!(
            parse_from(["mactl", "git", "config", "a.b", "c", "--local", "--global"]),
            Err(UsageError::InvalidFlag { .. })
        ));
        assert!(matches!(
            parse_from(["mactl", "setup", "terraform"]),
            Err(UsageError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn profile_file_rejects_explicit_scope() {
        assert!(matches!(
            parse_from(["mactl", "env-var", "add", "A", "1", "--scope", "system", "--profile", "/tmp/p"]),
            Err(UsageError::InvalidFlag { .. })
        ));
        let cli = parse(&["env-var", "add", "A", "1", "--profile", "/tmp/p"]);
        assert_eq!(profile_override(&cli.command), Some(PathBuf::from("/tmp/p")));
    }

    #[test]
    fn help_and_version_are_display() {
        assert!(matches!(
            parse_from(["mactl", "--help"]),
            Ok(Invocation::Display(_))
        ));
        assert!(matches!(
            parse_from(["mactl", "--version"]),
            Ok(Invocation::Display(_))
        ));
    }

    #[test]
    fn run_with_maps_usage_to_exit_2() {
        let runner = FakeRunner::new();
        assert_eq!(run_with(["mactl", "nope"], &runner), 2);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn run_with_help_exits_0() {
        assert_eq!(run_with(["mactl", "--help"], &FakeRunner::new()), 0);
    }

    #[test]
    fn profile_flag_feeds_settings() {
        let cli = parse(&["env-var", "list", "--profile", "/tmp/p"]);
        assert_eq!(profile_override(&cli.command), Some(PathBuf::from("/tmp/p")));
        assert_eq!(profile_override(&parse(&["setup", "helm"]).command), None);
    }
}
