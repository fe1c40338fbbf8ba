//! core::failure
//!
//! Failure categories and their process exit codes.
//!
//! Every typed error in the crate implements [`Classify`]. The dispatcher
//! walks an `anyhow` cause chain with [`classify`] and uses the first
//! category it finds to pick the exit code, so scripts can tell a usage
//! mistake from a missing dependency without parsing messages.

use std::fmt;

/// Broad category of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Anything not otherwise categorized.
    Generic,
    /// Unknown command, bad flag, unsupported key, malformed name.
    Usage,
    /// A required external tool is not installed.
    DependencyMissing,
    /// A module-specific precondition does not hold (duplicate key, no repository).
    Precondition,
    /// An external tool ran and reported failure (or timed out).
    External,
    /// The user interrupted the run.
    Interrupted,
}

impl FailureKind {
    /// The process exit code for this category.
    pub fn exit_code(self) -> i32 {
        match self {
            FailureKind::Generic => 1,
            FailureKind::Usage => 2,
            FailureKind::DependencyMissing => 3,
            FailureKind::Precondition => 4,
            FailureKind::External => 5,
            FailureKind::Interrupted => 130,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Generic => "failure",
            FailureKind::Usage => "usage error",
            FailureKind::DependencyMissing => "dependency missing",
            FailureKind::Precondition => "precondition failed",
            FailureKind::External => "external tool failed",
            FailureKind::Interrupted => "interrupted",
        };
        write!(f, "{}", s)
    }
}

/// Errors that know which [`FailureKind`] they belong to.
pub trait Classify {
    /// The category of this error.
    fn kind(&self) -> FailureKind;
}

impl Classify for crate::core::types::TypeError {
    fn kind(&self) -> FailureKind {
        FailureKind::Usage
    }
}

/// Find the category of an error by walking its cause chain.
///
/// Returns [`FailureKind::Generic`] when nothing in the chain is classified.
pub fn classify(err: &anyhow::Error) -> FailureKind {
    use crate::cli::UsageError;
    use crate::core::fs::FsError;
    use crate::core::settings::SettingsError;
    use crate::core::types::TypeError;
    use crate::features::dock::PreferenceError;
    use crate::features::env_var::EnvVarError;
    use crate::features::git_config::GitError;
    use crate::features::git_ssh::SshError;
    use crate::features::tools::SetupError;
    use crate::installer::InstallError;
    use crate::process::RunError;

    fn kind_of(cause: &(dyn std::error::Error + 'static)) -> Option<FailureKind> {
        macro_rules! try_kind {
            ($($ty:ty),* $(,)?) => {
                $(
                    if let Some(e) = cause.downcast_ref::<$ty>() {
                        return Some(e.kind());
                    }
                )*
            };
        }

        try_kind!(
            UsageError,
            SettingsError,
            TypeError,
            RunError,
            InstallError,
            SetupError,
            PreferenceError,
            EnvVarError,
            GitError,
            SshError,
            FsError,
        );
        None
    }

    err.chain()
        .find_map(kind_of)
        .unwrap_or(FailureKind::Generic)
}
