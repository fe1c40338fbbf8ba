//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! The whole command tree is declared here, in one place, so it can be
//! inspected and tested without running anything.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging and full error chains
//! - `--quiet` / `-q`: Minimal output
//! - `--timeout <secs>`: Kill external tools that run longer

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::features::env_var::Scope;
use crate::features::git_ssh::KeyType;
use crate::features::tools::Tool;

/// mactl - bootstrap and tune a macOS development machine
#[derive(Parser, Debug)]
#[command(name = "mactl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if mactl was started in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Timeout in seconds for external tools (0 disables) [env: MACTL_TIMEOUT_SECS]
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply recommended settings to macOS features
    #[command(
        after_help = "\
EXAMPLES:
    # Auto-hide the Dock
    mactl optimize dock autohide

    # Pick an icon size
    mactl optimize dock tilesize --value 48"
    )]
    Optimize {
        #[command(subcommand)]
        target: OptimizeTarget,
    },

    /// Manage environment variables exported from your shell profile
    #[command(
        name = "env-var",
        after_help = "\
EXAMPLES:
    mactl env-var add GOPATH '$HOME/go'
    mactl env-var add EDITOR nvim --overwrite
    mactl env-var list --json

The user profile defaults to ~/.zprofile (override with --profile or
MACTL_PROFILE). The system profile is /etc/zprofile (MACTL_SYSTEM_PROFILE)."
    )]
    EnvVar {
        #[command(subcommand)]
        action: EnvVarAction,
    },

    /// Configure git
    Git {
        #[command(subcommand)]
        action: GitAction,
    },

    /// Install a developer tool through Homebrew
    #[command(
        after_help = "\
EXAMPLES:
    mactl setup kustomize
    mactl setup kubectl

Nothing is installed when the tool is already present."
    )]
    Setup {
        /// Tool to install
        #[arg(value_enum)]
        tool: ToolArg,
    },

    /// Generate shell completion scripts
    #[command(
        after_help = "\
SETUP:
    # Zsh
    mactl completion zsh > \"${fpath[1]}/_mactl\"

    # Bash
    mactl completion bash > ~/.local/share/bash-completion/completions/mactl

    # Fish
    mactl completion fish > ~/.config/fish/completions/mactl.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Things `optimize` can tune.
#[derive(Subcommand, Debug)]
pub enum OptimizeTarget {
    /// Set a Dock preference and restart the Dock
    #[command(long_about = "Set a Dock preference and restart the Dock.\n\n\
        Without --value the recommended value is applied. Supported preferences: \
        autohide, magnification, tilesize, largesize, orientation, mineffect, \
        minimize-to-application, show-recents, show-process-indicators, \
        launchanim, static-only.")]
    Dock {
        /// Preference key under com.apple.dock
        preference: String,

        /// Value to set instead of the recommended one
        #[arg(long)]
        value: Option<String>,
    },
}

/// Profile selection shared by env-var subcommands.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Which profile to use
    #[arg(long, value_enum, default_value_t = ScopeArg::User)]
    pub scope: ScopeArg,

    /// Use this file as the user profile [env: MACTL_PROFILE]
    #[arg(long, value_name = "FILE", conflicts_with = "scope")]
    pub profile: Option<PathBuf>,
}

/// env-var subcommands.
#[derive(Subcommand, Debug)]
pub enum EnvVarAction {
    /// List exported variables
    List {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an exported variable
    Add {
        /// Variable name
        name: String,

        /// Variable value, stored literally
        value: String,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Replace an existing definition
        #[arg(long)]
        overwrite: bool,
    },
}

/// git subcommands.
#[derive(Subcommand, Debug)]
pub enum GitAction {
    /// Set a git config value
    Config {
        /// Key in section[.subsection].name form
        key: String,

        /// Value to set
        value: String,

        /// Write to the current repository's config
        #[arg(long, conflicts_with = "global")]
        local: bool,

        /// Write to the user's config (default)
        #[arg(long)]
        global: bool,
    },

    /// Manage the SSH key used for git
    Ssh {
        #[command(subcommand)]
        action: SshAction,
    },
}

/// Key selection shared by ssh subcommands.
#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// Key algorithm
    #[arg(long = "type", value_enum, default_value_t = KeyTypeArg::Ed25519)]
    pub key_type: KeyTypeArg,

    /// Private key path [default: ~/.ssh/id_<type>]
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,
}

/// git ssh subcommands.
#[derive(Subcommand, Debug)]
pub enum SshAction {
    /// Generate a key pair unless one already exists
    Ensure {
        #[command(flatten)]
        key: KeyArgs,

        /// Key comment [default: git user.email]
        #[arg(long)]
        comment: Option<String>,
    },

    /// Print the public key
    Show {
        #[command(flatten)]
        key: KeyArgs,
    },
}

/// Profile scope.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    User,
    System,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::User => Scope::User,
            ScopeArg::System => Scope::System,
        }
    }
}

/// SSH key algorithm.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTypeArg {
    Ed25519,
    Rsa,
}

impl From<KeyTypeArg> for KeyType {
    fn from(arg: KeyTypeArg) -> Self {
        match arg {
            KeyTypeArg::Ed25519 => KeyType::Ed25519,
            KeyTypeArg::Rsa => KeyType::Rsa,
        }
    }
}

/// Installable tool.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolArg {
    Kustomize,
    Kubectl,
    Helm,
}

impl From<ToolArg> for Tool {
    fn from(arg: ToolArg) -> Self {
        match arg {
            ToolArg::Kustomize => Tool::Kustomize,
            ToolArg::Kubectl => Tool::Kubectl,
            ToolArg::Helm => Tool::Helm,
        }
    }
}

/// Supported shells for completion
#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
