//! installer::brew
//!
//! Homebrew-backed installer.
//!
//! # Exit-code conventions
//!
//! - `brew list --formula|--cask <name>` exits 0 iff the package is installed.
//! - `brew install` exits 0 on success and when the package is already
//!   present (it prints a `Warning:` line in that case).
//! - `brew install` exits 1 for every error, including a few states where
//!   the package did end up installed. Those are recognized by the markers
//!   in [`BENIGN_FAILURE_MARKERS`] and reported as warnings instead, but only
//!   when every `Error:` line carries one. `Warning:` lines never count: brew
//!   prints them for dependencies that are already present.

use tracing::{debug, info};

use super::{InstallCache, InstallError, InstallOutcome, InstallTarget};
use crate::process::{ExecutionRequest, ExecutionResult, ProcessRunner, RunError};

const BREW: &str = "brew";

/// Only benign when the error line names the package being installed.
const ALREADY_INSTALLED: &str = "is already installed";

/// `Error:` line fragments that mark a nonzero `brew install` as
/// "installed anyway".
pub const BENIGN_FAILURE_MARKERS: &[&str] = &[
    // Formula poured but could not be symlinked into the prefix.
    "The `brew link` step did not complete successfully",
    // Cask or formula present (older brew versions exit 1 here).
    ALREADY_INSTALLED,
    // Post-install hook failed after the files were in place.
    "post-install step did not complete successfully",
];

/// Idempotent installer over `brew`.
pub struct Brew<'r> {
    runner: &'r dyn ProcessRunner,
}

impl<'r> Brew<'r> {
    /// Create an installer that runs brew through `runner`.
    pub fn new(runner: &'r dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Make sure `target` is installed.
    ///
    /// Queries first; if the target is present nothing is installed. Never
    /// retries.
    ///
    /// # Errors
    ///
    /// - [`InstallError::DependencyMissing`] if brew is not on PATH
    /// - [`InstallError::InstallFailed`] if `brew install` fails for real
    /// - [`InstallError::Run`] on timeout or interrupt
    pub fn ensure_installed(
        &self,
        target: &InstallTarget,
        cache: &mut InstallCache,
    ) -> Result<InstallOutcome, InstallError> {
        self.ensure_manager(cache)?;

        if cache.is_known_installed(target) || self.is_installed(target)? {
            debug!(%target, "already installed");
            cache.mark_installed(target);
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        info!(%target, "installing");
        let result = self.run(
            ExecutionRequest::new(BREW)
                .args(install_args(target))
                .env("HOMEBREW_NO_ENV_HINTS", "1")
                .inherit_stdin(),
        )?;

        let outcome = interpret_install(target, &result)?;
        cache.mark_installed(target);
        if let InstallOutcome::InstalledWithWarnings { warnings } = &outcome {
            for warning in warnings {
                debug!(%target, "{}", warning);
            }
        }
        Ok(outcome)
    }

    /// Whether `target` is currently installed, per `brew list`.
    pub fn is_installed(&self, target: &InstallTarget) -> Result<bool, InstallError> {
        let result = self.run(
            ExecutionRequest::new(BREW).args(["list", target.kind.flag(), target.name.as_str()]),
        )?;
        Ok(result.success())
    }

    fn ensure_manager(&self, cache: &mut InstallCache) -> Result<(), InstallError> {
        if cache.manager_version().is_some() {
            return Ok(());
        }
        let result = self.run(ExecutionRequest::new(BREW).arg("--version"))?;
        let version = result
            .stdout_trimmed()
            .lines()
            .next()
            .unwrap_or("Homebrew")
            .to_string();
        debug!(%version, "found package manager");
        cache.set_manager_version(version);
        Ok(())
    }

    fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult, InstallError> {
        self.runner.run(request).map_err(|e| match e {
            RunError::NotFound { .. } => InstallError::DependencyMissing { manager: BREW },
            other => InstallError::Run {
                manager: BREW,
                source: other,
            },
        })
    }
}

fn install_args(target: &InstallTarget) -> Vec<String> {
    let mut args = vec!["install".to_string()];
    if target.kind == super::PackageKind::Cask {
        args.push("--cask".to_string());
    }
    args.push(target.name.as_str().to_string());
    args
}

fn warning_lines(result: &ExecutionResult) -> Vec<String> {
    result
        .stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("Warning:"))
        .map(|line| line.trim_start_matches("Warning:").trim().to_string())
        .collect()
}

/// The marker that makes a failed install benign, if every `Error:` line
/// carries one.
fn benign_marker(target: &InstallTarget, result: &ExecutionResult) -> Option<&'static str> {
    let mut found = None;
    for line in result.stderr.lines().map(str::trim) {
        let Some(error) = line.strip_prefix("Error:") else {
            continue;
        };
        let marker = BENIGN_FAILURE_MARKERS
            .iter()
            .copied()
            .find(|marker| error.contains(marker))?;
        if marker == ALREADY_INSTALLED && !names_package(error, target.name.as_str()) {
            return None;
        }
        found.get_or_insert(marker);
    }
    found
}

fn names_package(line: &str, name: &str) -> bool {
    line.split(|c: char| c.is_whitespace() || matches!(c, ':' | '"' | '\'' | '`'))
        .any(|word| word == name)
}

fn interpret_install(
    target: &InstallTarget,
    result: &ExecutionResult,
) -> Result<InstallOutcome, InstallError> {
    if result.success() {
        let warnings = warning_lines(result);
        return Ok(if warnings.is_empty() {
            InstallOutcome::Installed
        } else {
            InstallOutcome::InstalledWithWarnings { warnings }
        });
    }

    if let Some(marker) = benign_marker(target, result) {
        let mut warnings = warning_lines(result);
        warnings.push(format!(
            "brew exited {} but reported: {}",
            result.exit_code, marker
        ));
        return Ok(InstallOutcome::InstalledWithWarnings { warnings });
    }

    Err(InstallError::InstallFailed {
        target: target.to_string(),
        detail: result.failure_detail(),
    })
}
