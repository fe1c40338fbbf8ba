//! core::settings
//!
//! Runtime settings resolved from defaults, environment variables and flags.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Environment variables
//! 3. CLI flags
//!
//! There are no configuration files.
//!
//! # Environment Variables
//!
//! - `MACTL_TIMEOUT_SECS` - default timeout for external tools
//! - `MACTL_PROFILE` - user-scope profile file for env-var commands
//! - `MACTL_SYSTEM_PROFILE` - system-scope profile file
//! - `MACTL_SSH_DIR` - directory holding SSH keys
//! - `MACTL_LOG` - tracing filter (read by [`crate::ui::telemetry`])

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::failure::{Classify, FailureKind};
use super::paths;

/// Environment variable holding the default process timeout in seconds.
pub const ENV_TIMEOUT: &str = "MACTL_TIMEOUT_SECS";
/// Environment variable overriding the user profile path.
pub const ENV_PROFILE: &str = "MACTL_PROFILE";
/// Environment variable overriding the system profile path.
pub const ENV_SYSTEM_PROFILE: &str = "MACTL_SYSTEM_PROFILE";
/// Environment variable overriding the SSH key directory.
pub const ENV_SSH_DIR: &str = "MACTL_SSH_DIR";

/// Errors from settings resolution.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("home directory not found")]
    NoHomeDir,
}

impl Classify for SettingsError {
    fn kind(&self) -> FailureKind {
        match self {
            SettingsError::InvalidEnv { .. } => FailureKind::Usage,
            SettingsError::NoHomeDir => FailureKind::Generic,
        }
    }
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Default timeout for external tools; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Profile file for user-scope environment variables.
    pub user_profile: PathBuf,
    /// Profile file for system-scope environment variables.
    pub system_profile: PathBuf,
    /// Directory holding SSH keys.
    pub ssh_dir: PathBuf,
}

/// Flag values that override environment and defaults.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub timeout_secs: Option<u64>,
    pub user_profile: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from the process environment and flag overrides.
    pub fn resolve(overrides: &SettingsOverrides) -> Result<Self, SettingsError> {
        Self::resolve_with(overrides, |var| std::env::var(var).ok())
    }

    /// Resolve settings using `lookup` in place of the process environment.
    pub fn resolve_with<F>(overrides: &SettingsOverrides, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_path = |var: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };

        let timeout = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => match lookup(ENV_TIMEOUT) {
                Some(raw) => Some(parse_timeout(&raw)?),
                None => None,
            },
        }
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

        let user_profile = match overrides
            .user_profile
            .clone()
            .or_else(|| env_path(ENV_PROFILE))
        {
            Some(path) => path,
            None => paths::default_user_profile().ok_or(SettingsError::NoHomeDir)?,
        };

        let system_profile =
            env_path(ENV_SYSTEM_PROFILE).unwrap_or_else(paths::default_system_profile);

        let ssh_dir = match env_path(ENV_SSH_DIR) {
            Some(path) => path,
            None => paths::default_ssh_dir().ok_or(SettingsError::NoHomeDir)?,
        };

        Ok(Self {
            timeout,
            user_profile,
            system_profile,
            ssh_dir,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<u64, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| SettingsError::InvalidEnv {
            var: ENV_TIMEOUT,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_PROFILE, "/tmp/profile"),
            (ENV_SSH_DIR, "/tmp/ssh"),
        ]
    }

    #[test]
    fn defaults_have_no_timeout() {
        let settings = Settings::resolve_with(&SettingsOverrides::default(), env(&base_env()))
            .unwrap();
        assert_eq!(settings.timeout, None);
        assert_eq!(settings.system_profile, PathBuf::from("/etc/zprofile"));
    }

    #[test]
    fn env_sets_timeout() {
        let mut vars = base_env();
        vars.push((ENV_TIMEOUT, "30"));
        let settings = Settings::resolve_with(&SettingsOverrides::default(), env(&vars)).unwrap();
        assert_eq!(settings.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn flag_overrides_env() {
        let mut vars = base_env();
        vars.push((ENV_TIMEOUT, "30"));
        let overrides = SettingsOverrides {
            timeout_secs: Some(5),
            user_profile: Some(PathBuf::from("/flag/profile")),
        };
        let settings = Settings::resolve_with(&overrides, env(&vars)).unwrap();
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
        assert_eq!(settings.user_profile, PathBuf::from("/flag/profile"));
    }

    #[test]
    fn zero_timeout_disables() {
        let mut vars = base_env();
        vars.push((ENV_TIMEOUT, "0"));
        let settings = Settings::resolve_with(&SettingsOverrides::default(), env(&vars)).unwrap();
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn bad_timeout_is_usage_error() {
        let mut vars = base_env();
        vars.push((ENV_TIMEOUT, "soon"));
        let err = Settings::resolve_with(&SettingsOverrides::default(), env(&vars)).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidEnv { var: ENV_TIMEOUT, .. }));
        assert_eq!(err.kind(), FailureKind::Usage);
    }

    #[test]
    fn env_paths_are_used() {
        let mut vars = base_env();
        vars.push((ENV_SYSTEM_PROFILE, "/opt/profile"));
        let settings = Settings::resolve_with(&SettingsOverrides::default(), env(&vars)).unwrap();
        assert_eq!(settings.user_profile, PathBuf::from("/tmp/profile"));
        assert_eq!(settings.system_profile, PathBuf::from("/opt/profile"));
        assert_eq!(settings.ssh_dir, PathBuf::from("/tmp/ssh"));
    }
}
