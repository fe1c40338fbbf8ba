//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Converts clap arguments into validated domain values
//! 2. Calls exactly one feature operation
//! 3. Formats and displays the outcome
//!
//! Handlers return errors untouched (or with added context); rendering and
//! exit codes are decided by [`crate::cli::run_with`].

mod completion;
mod env_var;
mod git;
mod optimize;
mod setup;

pub use completion::completion;

use crate::cli::args::{Command, EnvVarAction, GitAction, OptimizeTarget, SshAction};
use crate::core::Context;
use crate::process::ProcessRunner;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context, runner: &dyn ProcessRunner) -> Result<()> {
    match command {
        Command::Optimize { target } => match target {
            OptimizeTarget::Dock { preference, value } => {
                optimize::dock(ctx, runner, &preference, value.as_deref())
            }
        },
        Command::EnvVar { action } => match action {
            EnvVarAction::List { profile, json } => env_var::list(ctx, profile.scope.into(), json),
            EnvVarAction::Add {
                name,
                value,
                profile,
                overwrite,
            } => env_var::add(ctx, &name, &value, profile.scope.into(), overwrite),
        },
        Command::Git { action } => match action {
            GitAction::Config {
                key,
                value,
                local,
                global: _,
            } => git::config(ctx, runner, &key, &value, local),
            GitAction::Ssh { action } => match action {
                SshAction::Ensure { key, comment } => git::ssh_ensure(
                    ctx,
                    runner,
                    key.key_type.into(),
                    key.path,
                    comment,
                ),
                SshAction::Show { key } => git::ssh_show(ctx, key.key_type.into(), key.path),
            },
        },
        Command::Setup { tool } => setup::setup(ctx, runner, tool.into()),
        Command::Completion { shell } => completion::completion(shell),
    }
}
