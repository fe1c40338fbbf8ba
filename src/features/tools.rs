//! features::tools
//!
//! One-shot setup of developer tools through the installer.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::core::failure::{Classify, FailureKind};
use crate::core::types::PackageName;
use crate::installer::{Brew, InstallCache, InstallError, InstallOutcome, InstallTarget, PackageKind};

/// A tool `mactl setup` knows how to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Kustomize,
    Kubectl,
    Helm,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Kustomize => "kustomize",
            Tool::Kubectl => "kubectl",
            Tool::Helm => "helm",
        }
    }

    /// Homebrew formula providing the tool.
    pub fn formula(self) -> &'static str {
        match self {
            Tool::Kustomize => "kustomize",
            Tool::Kubectl => "kubernetes-cli",
            Tool::Helm => "helm",
        }
    }

    /// The fixed install target for this tool.
    pub fn target(self) -> InstallTarget {
        InstallTarget::new(PackageName::from_static(self.formula()), PackageKind::Formula)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from tool setup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to install {tool}")]
    Install {
        tool: Tool,
        #[source]
        source: InstallError,
    },
}

impl Classify for SetupError {
    fn kind(&self) -> FailureKind {
        match self {
            SetupError::Install { source, .. } => source.kind(),
        }
    }
}

/// Install `tool` unless it is already present.
pub fn setup(brew: &Brew<'_>, tool: Tool, cache: &mut InstallCache) -> Result<InstallOutcome, SetupError> {
    info!("installing {tool}");
    let outcome = brew
        .ensure_installed(&tool.target(), cache)
        .map_err(|source| SetupError::Install { tool, source })?;
    match &outcome {
        InstallOutcome::AlreadyInstalled => info!("{tool} already installed"),
        _ => info!("installed {tool}"),
    }
    Ok(outcome)
}
