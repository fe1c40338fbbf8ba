//! core::context
//!
//! Execution context shared by every command handler.

use std::path::{Path, PathBuf};

use super::settings::Settings;
use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags and the environment that
/// affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory commands run against (from `--cwd` or the process cwd).
    pub cwd: PathBuf,
    /// Debug output enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Resolved settings.
    pub settings: Settings,
}

impl Context {
    /// Working directory for repository discovery and relative paths.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Output verbosity implied by the flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
