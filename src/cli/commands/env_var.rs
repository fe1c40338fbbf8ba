//! env-var command - List and add exported variables

use crate::core::types::EnvVarName;
use crate::core::Context;
use crate::features::env_var::{AddOutcome, EnvVarEntry, ProfileFile, Scope};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Print the entries of the profile for `scope`.
pub fn list(ctx: &Context, scope: Scope, json: bool) -> Result<()> {
    let profile = ProfileFile::for_scope(scope, &ctx.settings);
    let entries = profile.list()?;

    if json {
        let entries = entries.collect::<Result<Vec<_>, _>>()?;
        let rendered =
            serde_json::to_string_pretty(&entries).context("failed to serialize entries")?;
        output::data(rendered);
        return Ok(());
    }

    for entry in entries {
        let entry = entry?;
        output::data(format!("{}={}", entry.name, entry.value));
    }
    Ok(())
}

/// Add `name=value` to the profile for `scope`.
pub fn add(ctx: &Context, name: &str, value: &str, scope: Scope, overwrite: bool) -> Result<()> {
    let entry = EnvVarEntry::new(EnvVarName::new(name)?, value);
    let profile = ProfileFile::for_scope(scope, &ctx.settings);

    let message = match profile.add(&entry, overwrite)? {
        AddOutcome::Added => format!("added {} to {}", entry.name, profile.path().display()),
        AddOutcome::Replaced { .. } => {
            format!("replaced {} in {}", entry.name, profile.path().display())
        }
    };
    output::success(message, ctx.verbosity());
    output::print(
        format!("run `source {}` to load it into this shell", profile.path().display()),
        ctx.verbosity(),
    );
    Ok(())
}
