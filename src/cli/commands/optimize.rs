//! optimize command - Apply a Dock preference

use crate::core::Context;
use crate::features::dock::{Dock, DockChange, PreferenceSetting};
use crate::process::ProcessRunner;
use crate::ui::output;
use anyhow::Result;

/// Set `preference` to `value`, or to its recommended value.
pub fn dock(
    ctx: &Context,
    runner: &dyn ProcessRunner,
    preference: &str,
    value: Option<&str>,
) -> Result<()> {
    let setting = PreferenceSetting::from_input(preference, value)?;

    match Dock::new(runner).apply_preference(&setting)? {
        DockChange::Applied => output::success(
            format!("dock: {} set to {}", setting.key, setting.value),
            ctx.verbosity(),
        ),
        DockChange::Unchanged => output::print(
            format!("dock: {} is already {}", setting.key, setting.value),
            ctx.verbosity(),
        ),
    }
    Ok(())
}
