//! git command - Config values and the git SSH key

use std::path::PathBuf;

use crate::core::types::GitConfigKey;
use crate::core::Context;
use crate::features::git_config::{ConfigScope, GitConfig};
use crate::features::git_ssh::{default_key_path, public_key, GitSsh, KeyOutcome, KeyType};
use crate::process::{ExecutionRequest, ProcessRunner};
use crate::ui::output;
use anyhow::Result;

/// Set a git config value.
pub fn config(
    ctx: &Context,
    runner: &dyn ProcessRunner,
    key: &str,
    value: &str,
    local: bool,
) -> Result<()> {
    let key = GitConfigKey::new(key)?;
    let scope = if local {
        ConfigScope::Local
    } else {
        ConfigScope::Global
    };

    GitConfig::new(runner).set_config(&key, value, scope, ctx.cwd())?;
    output::success(format!("git config ({scope}): {key} = {value}"), ctx.verbosity());
    Ok(())
}

/// Generate an SSH key unless one exists, then show the public half.
pub fn ssh_ensure(
    ctx: &Context,
    runner: &dyn ProcessRunner,
    key_type: KeyType,
    path: Option<PathBuf>,
    comment: Option<String>,
) -> Result<()> {
    let path = path.unwrap_or_else(|| default_key_path(&ctx.settings.ssh_dir, key_type));
    let comment = match comment {
        Some(comment) => comment,
        None if !path.exists() => git_user_email(runner).unwrap_or_default(),
        None => String::new(),
    };

    match GitSsh::new(runner).ensure_key(&path, key_type, &comment)? {
        KeyOutcome::AlreadyExists { path } => {
            output::print(format!("SSH key already exists at {}", path.display()), ctx.verbosity());
        }
        KeyOutcome::Generated { path } => {
            output::success(format!("generated {key_type} key at {}", path.display()), ctx.verbosity());
            if let Ok(public) = public_key(&path) {
                output::print("add this public key to your git host:", ctx.verbosity());
                output::data(public);
            }
        }
    }
    Ok(())
}

/// Print the public key.
pub fn ssh_show(ctx: &Context, key_type: KeyType, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| default_key_path(&ctx.settings.ssh_dir, key_type));
    output::data(public_key(&path)?);
    Ok(())
}

/// The global `user.email`, used as the default key comment.
fn git_user_email(runner: &dyn ProcessRunner) -> Option<String> {
    let result = runner
        .run(ExecutionRequest::new("git").args(["config", "--global", "--get", "user.email"]))
        .ok()?;
    let email = result.stdout_trimmed();
    (result.success() && !email.is_empty()).then(|| email.to_string())
}
