//! setup command - Install a developer tool

use crate::core::Context;
use crate::features::tools::{self, Tool};
use crate::installer::{Brew, InstallCache, InstallOutcome};
use crate::process::ProcessRunner;
use crate::ui::output;
use anyhow::Result;

/// Install `tool` through brew unless it is already present.
pub fn setup(ctx: &Context, runner: &dyn ProcessRunner, tool: Tool) -> Result<()> {
    let brew = Brew::new(runner);
    let mut cache = InstallCache::new();

    match tools::setup(&brew, tool, &mut cache)? {
        InstallOutcome::AlreadyInstalled => {
            output::print(format!("{tool} is already installed"), ctx.verbosity())
        }
        InstallOutcome::Installed => output::success(format!("installed {tool}"), ctx.verbosity()),
        InstallOutcome::InstalledWithWarnings { warnings } => {
            for warning in &warnings {
                output::warn(warning, ctx.verbosity());
            }
            output::success(format!("installed {tool}"), ctx.verbosity());
        }
    }
    Ok(())
}
