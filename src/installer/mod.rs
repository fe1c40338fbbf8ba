//! installer
//!
//! Idempotent "ensure package X is installed" over the system package manager.
//!
//! # Architecture
//!
//! [`Brew`] is the only installer. It borrows a
//! [`ProcessRunner`](crate::process::ProcessRunner) and never spawns
//! anything itself. Knowledge gathered during a run (is brew present, which
//! targets are known to be installed) lives in an [`InstallCache`] value that
//! the caller owns and passes in, so there is no process-wide state and tests
//! stay deterministic.
//!
//! # State machine
//!
//! A target is either `not-installed` or `installed`. `ensure_installed`
//! moves it to `installed` or fails; a target already installed is left
//! alone.
//!
//! # Example
//!
//! ```
//! use mactl::installer::{Brew, InstallCache, InstallOutcome, InstallTarget};
//! use mactl::process::fake::FakeRunner;
//!
//! let runner = FakeRunner::new();
//! let brew = Brew::new(&runner);
//! let mut cache = InstallCache::new();
//!
//! let target = InstallTarget::formula("kustomize").unwrap();
//! // The fake answers every query with exit 0, i.e. "installed".
//! let outcome = brew.ensure_installed(&target, &mut cache).unwrap();
//! assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
//! ```

mod brew;

pub use brew::{Brew, BENIGN_FAILURE_MARKERS};

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::core::failure::{Classify, FailureKind};
use crate::core::types::{PackageName, TypeError};
use crate::process::RunError;

/// Package category within Homebrew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// Command-line formula (`brew install <name>`).
    Formula,
    /// GUI application or binary bundle (`brew install --cask <name>`).
    Cask,
}

impl PackageKind {
    /// The `brew` flag selecting this category.
    pub fn flag(self) -> &'static str {
        match self {
            PackageKind::Formula => "--formula",
            PackageKind::Cask => "--cask",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageKind::Formula => write!(f, "formula"),
            PackageKind::Cask => write!(f, "cask"),
        }
    }
}

/// A package to install.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstallTarget {
    pub name: PackageName,
    pub kind: PackageKind,
}

impl InstallTarget {
    pub fn new(name: PackageName, kind: PackageKind) -> Self {
        Self { name, kind }
    }

    /// A formula target.
    pub fn formula(name: &str) -> Result<Self, TypeError> {
        Ok(Self::new(PackageName::new(name)?, PackageKind::Formula))
    }

    /// A cask target.
    pub fn cask(name: &str) -> Result<Self, TypeError> {
        Ok(Self::new(PackageName::new(name)?, PackageKind::Cask))
    }
}

impl fmt::Display for InstallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// What `ensure_installed` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The target was present; nothing was changed.
    AlreadyInstalled,
    /// The target was installed cleanly.
    Installed,
    /// The target was installed but brew reported warnings.
    InstalledWithWarnings { warnings: Vec<String> },
}

/// Why an install did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallFailure {
    /// The package manager itself is not installed.
    DependencyMissing,
    /// The install invocation failed.
    InstallFailed,
}

/// Errors from the installer.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Homebrew is not on PATH.
    #[error("{manager} is not installed; see https://brew.sh")]
    DependencyMissing { manager: &'static str },

    /// `brew install` reported a genuine failure.
    #[error("brew could not install {target}: {detail}")]
    InstallFailed { target: String, detail: String },

    /// brew could not be run to completion (timeout, interrupt, spawn failure).
    #[error("failed to run {manager}: {source}")]
    Run {
        manager: &'static str,
        #[source]
        source: RunError,
    },
}

impl InstallError {
    /// The reason category.
    pub fn reason(&self) -> Option<InstallFailure> {
        match self {
            InstallError::DependencyMissing { .. } => Some(InstallFailure::DependencyMissing),
            InstallError::InstallFailed { .. } => Some(InstallFailure::InstallFailed),
            InstallError::Run { .. } => None,
        }
    }
}

impl Classify for InstallError {
    fn kind(&self) -> FailureKind {
        match self {
            InstallError::DependencyMissing { .. } => FailureKind::DependencyMissing,
            InstallError::InstallFailed { .. } => FailureKind::External,
            InstallError::Run { source, .. } => source.kind(),
        }
    }
}

/// Facts learned about the package manager during one invocation.
///
/// Pass the same cache to several `ensure_installed` calls to avoid
/// re-checking brew's presence or re-querying known targets.
#[derive(Debug, Clone, Default)]
pub struct InstallCache {
    manager_version: Option<String>,
    installed: HashSet<InstallTarget>,
}

impl InstallCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The package manager version, once its presence has been checked.
    pub fn manager_version(&self) -> Option<&str> {
        self.manager_version.as_deref()
    }

    pub(crate) fn set_manager_version(&mut self, version: String) {
        self.manager_version = Some(version);
    }

    /// Whether `target` is known to be installed.
    pub fn is_known_installed(&self, target: &InstallTarget) -> bool {
        self.installed.contains(target)
    }

    pub(crate) fn mark_installed(&mut self, target: &InstallTarget) {
        self.installed.insert(target.clone());
    }
}
