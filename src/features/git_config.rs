//! features::git_config
//!
//! `git config` pass-through.
//!
//! Config files are only ever changed by git itself. The one thing done
//! in-process is locating the repository for `--local`, through libgit2, so
//! that running outside a repository fails before anything is spawned.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::failure::{Classify, FailureKind};
use crate::core::types::GitConfigKey;
use crate::process::{ExecutionRequest, ProcessRunner, RunError};

/// Which config file a setting goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigScope {
    /// The repository's `.git/config`.
    Local,
    /// The user's `~/.gitconfig`.
    #[default]
    Global,
}

impl ConfigScope {
    fn flag(self) -> &'static str {
        match self {
            ConfigScope::Local => "--local",
            ConfigScope::Global => "--global",
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScope::Local => write!(f, "local"),
            ConfigScope::Global => write!(f, "global"),
        }
    }
}

/// Errors from git configuration.
#[derive(Debug, Error)]
pub enum GitError {
    /// `--local` was requested outside any repository.
    #[error("not a git repository (or any parent up to /): {}", .path.display())]
    NotARepository { path: PathBuf },

    /// `git config` exited nonzero.
    #[error("git config {key} failed: {detail}")]
    CommandFailed { key: String, detail: String },

    #[error(transparent)]
    Run(#[from] RunError),
}

impl Classify for GitError {
    fn kind(&self) -> FailureKind {
        match self {
            GitError::NotARepository { .. } => FailureKind::Precondition,
            GitError::CommandFailed { .. } => FailureKind::External,
            GitError::Run(e) => e.kind(),
        }
    }
}

/// Root of the repository containing `start`, searching upward.
///
/// Bare repositories resolve to their git directory.
pub fn discover_repository(start: &Path) -> Result<PathBuf, GitError> {
    let repo = git2::Repository::discover(start).map_err(|_| GitError::NotARepository {
        path: start.to_path_buf(),
    })?;
    let root = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
    debug!(root = %root.display(), "discovered repository");
    Ok(root)
}

/// Git config feature over a process runner.
pub struct GitConfig<'r> {
    runner: &'r dyn ProcessRunner,
}

impl<'r> GitConfig<'r> {
    pub fn new(runner: &'r dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Set `key` to `value` in `scope`.
    ///
    /// `cwd` is where repository discovery starts for [`ConfigScope::Local`].
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepository`] for local scope outside a repository;
    ///   nothing is run in that case
    /// - [`GitError::CommandFailed`] if git rejects the change
    pub fn set_config(
        &self,
        key: &GitConfigKey,
        value: &str,
        scope: ConfigScope,
        cwd: &Path,
    ) -> Result<(), GitError> {
        let mut request = ExecutionRequest::new("git").args(["config", scope.flag(), key.as_str(), value]);

        request = match scope {
            ConfigScope::Local => request.current_dir(discover_repository(cwd)?),
            ConfigScope::Global => request.current_dir(cwd),
        };

        let result = self.runner.run(request)?;
        if !result.success() {
            return Err(GitError::CommandFailed {
                key: key.to_string(),
                detail: result.failure_detail(),
            });
        }

        info!(%key, %scope, "git config set");
        Ok(())
    }
}
