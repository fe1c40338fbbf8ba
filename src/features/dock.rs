//! features::dock
//!
//! Dock preferences through `defaults`.
//!
//! Only keys in [`DOCK_PREFERENCES`] can be written; each carries its value
//! type, a validation rule and the recommended ("optimized") value used when
//! the caller does not supply one. Applying a value the Dock already has is a
//! no-op: nothing is written and the Dock is not restarted.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::failure::{Classify, FailureKind};
use crate::process::{ExecutionRequest, ProcessRunner, RunError};

/// `defaults` domain of the Dock.
pub const DOCK_DOMAIN: &str = "com.apple.dock";

/// Value type of a preference, as `defaults write` understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    String,
}

impl ValueType {
    fn flag(self) -> &'static str {
        match self {
            ValueType::Bool => "-bool",
            ValueType::Int => "-int",
            ValueType::String => "-string",
        }
    }
}

/// A typed preference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl PreferenceValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            PreferenceValue::Bool(_) => ValueType::Bool,
            PreferenceValue::Int(_) => ValueType::Int,
            PreferenceValue::String(_) => ValueType::String,
        }
    }

    /// The argument passed after the type flag to `defaults write`.
    fn write_arg(&self) -> String {
        match self {
            PreferenceValue::Bool(b) => b.to_string(),
            PreferenceValue::Int(i) => i.to_string(),
            PreferenceValue::String(s) => s.clone(),
        }
    }

    /// Whether `defaults read` output represents this value.
    ///
    /// Booleans are printed as `1`/`0`.
    fn matches_read(&self, raw: &str) -> bool {
        let raw = raw.trim();
        match self {
            PreferenceValue::Bool(b) => match raw {
                "1" | "true" | "YES" => *b,
                "0" | "false" | "NO" => !*b,
                _ => false,
            },
            PreferenceValue::Int(i) => raw.parse::<i64>().is_ok_and(|v| v == *i),
            PreferenceValue::String(s) => raw == s,
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.write_arg())
    }
}

/// Validation rule for a preference.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// Any boolean.
    Bool,
    /// An integer within an inclusive range.
    IntRange(i64, i64),
    /// One of a fixed set of strings.
    OneOf(&'static [&'static str]),
}

/// An allow-listed Dock preference.
#[derive(Debug, Clone, Copy)]
pub struct DockPreference {
    /// Key under `com.apple.dock`.
    pub key: &'static str,
    /// Accepted values.
    pub constraint: Constraint,
    /// Value applied when none is given.
    pub recommended: &'static str,
    /// One-line description for help output.
    pub summary: &'static str,
}

/// Every Dock preference mactl will write.
pub const DOCK_PREFERENCES: &[DockPreference] = &[
    DockPreference {
        key: "autohide",
        constraint: Constraint::Bool,
        recommended: "true",
        summary: "hide the Dock until the pointer reaches the screen edge",
    },
    DockPreference {
        key: "magnification",
        constraint: Constraint::Bool,
        recommended: "false",
        summary: "magnify icons under the pointer",
    },
    DockPreference {
        key: "tilesize",
        constraint: Constraint::IntRange(16, 128),
        recommended: "36",
        summary: "icon size in points",
    },
    DockPreference {
        key: "largesize",
        constraint: Constraint::IntRange(16, 128),
        recommended: "64",
        summary: "magnified icon size in points",
    },
    DockPreference {
        key: "orientation",
        constraint: Constraint::OneOf(&["left", "bottom", "right"]),
        recommended: "bottom",
        summary: "screen edge the Dock sits on",
    },
    DockPreference {
        key: "mineffect",
        constraint: Constraint::OneOf(&["genie", "scale", "suck"]),
        recommended: "scale",
        summary: "minimize animation",
    },
    DockPreference {
        key: "minimize-to-application",
        constraint: Constraint::Bool,
        recommended: "true",
        summary: "minimize windows into their application icon",
    },
    DockPreference {
        key: "show-recents",
        constraint: Constraint::Bool,
        recommended: "false",
        summary: "show recent applications",
    },
    DockPreference {
        key: "show-process-indicators",
        constraint: Constraint::Bool,
        recommended: "true",
        summary: "show dots under running applications",
    },
    DockPreference {
        key: "launchanim",
        constraint: Constraint::Bool,
        recommended: "false",
        summary: "animate opening applications",
    },
    DockPreference {
        key: "static-only",
        constraint: Constraint::Bool,
        recommended: "false",
        summary: "show only running applications",
    },
];

impl DockPreference {
    /// Find an allow-listed preference by key.
    pub fn lookup(key: &str) -> Result<&'static DockPreference, PreferenceError> {
        DOCK_PREFERENCES
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| PreferenceError::UnsupportedKey {
                key: key.to_string(),
            })
    }

    /// Parse and validate `raw` for this preference.
    pub fn parse_value(&self, raw: &str) -> Result<PreferenceValue, PreferenceError> {
        let invalid = |expected: String| PreferenceError::InvalidValue {
            key: self.key.to_string(),
            value: raw.to_string(),
            expected,
        };
        let trimmed = raw.trim();

        match self.constraint {
            Constraint::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(PreferenceValue::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(PreferenceValue::Bool(false)),
                _ => Err(invalid("true or false".into())),
            },
            Constraint::IntRange(min, max) => match trimmed.parse::<i64>() {
                Ok(v) if (min..=max).contains(&v) => Ok(PreferenceValue::Int(v)),
                _ => Err(invalid(format!("an integer from {min} to {max}"))),
            },
            Constraint::OneOf(options) => options
                .iter()
                .find(|o| **o == trimmed)
                .map(|o| PreferenceValue::String(o.to_string()))
                .ok_or_else(|| invalid(format!("one of {}", options.join(", ")))),
        }
    }

    /// Build the setting for `value`, or the recommended value if `None`.
    pub fn setting(&self, value: Option<&str>) -> Result<PreferenceSetting, PreferenceError> {
        let value = self.parse_value(value.unwrap_or(self.recommended))?;
        Ok(PreferenceSetting {
            key: self.key.to_string(),
            value,
        })
    }
}

/// A single Dock preference change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSetting {
    pub key: String,
    pub value: PreferenceValue,
}

impl PreferenceSetting {
    /// Build a setting from a user-supplied key and optional value.
    ///
    /// # Errors
    ///
    /// [`PreferenceError::UnsupportedKey`] for keys outside the allow-list,
    /// [`PreferenceError::InvalidValue`] for values the key does not accept.
    pub fn from_input(key: &str, value: Option<&str>) -> Result<Self, PreferenceError> {
        DockPreference::lookup(key)?.setting(value)
    }
}

/// What `apply_preference` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockChange {
    /// The value was written and the Dock restarted.
    Applied,
    /// The Dock already had this value.
    Unchanged,
}

/// Errors from Dock preference changes.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("unsupported dock preference '{key}' (supported: {})", supported_keys().join(", "))]
    UnsupportedKey { key: String },

    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("failed to write dock preference {key}: {detail}")]
    WriteFailed { key: String, detail: String },

    #[error(transparent)]
    Run(#[from] RunError),
}

impl Classify for PreferenceError {
    fn kind(&self) -> FailureKind {
        match self {
            PreferenceError::UnsupportedKey { .. } | PreferenceError::InvalidValue { .. } => {
                FailureKind::Usage
            }
            PreferenceError::WriteFailed { .. } => FailureKind::External,
            PreferenceError::Run(e) => e.kind(),
        }
    }
}

/// Keys accepted by [`DockPreference::lookup`].
pub fn supported_keys() -> Vec<&'static str> {
    DOCK_PREFERENCES.iter().map(|p| p.key).collect()
}

/// Dock feature over a process runner.
pub struct Dock<'r> {
    runner: &'r dyn ProcessRunner,
}

impl<'r> Dock<'r> {
    pub fn new(runner: &'r dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Current raw value of `key`, or `None` if it has never been set.
    pub fn read(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let result = self
            .runner
            .run(ExecutionRequest::new("defaults").args(["read", DOCK_DOMAIN, key]))?;
        Ok(result.success().then(|| result.stdout_trimmed().to_string()))
    }

    /// Write `setting` and restart the Dock, unless it already holds that value.
    pub fn apply_preference(&self, setting: &PreferenceSetting) -> Result<DockChange, PreferenceError> {
        if let Some(current) = self.read(&setting.key)? {
            if setting.value.matches_read(&current) {
                debug!(key = %setting.key, %current, "dock preference already set");
                return Ok(DockChange::Unchanged);
            }
        }

        info!(key = %setting.key, value = %setting.value, "writing dock preference");
        let result = self.runner.run(
            ExecutionRequest::new("defaults").args([
                "write".to_string(),
                DOCK_DOMAIN.to_string(),
                setting.key.clone(),
                setting.value.value_type().flag().to_string(),
                setting.value.write_arg(),
            ]),
        )?;
        if !result.success() {
            return Err(PreferenceError::WriteFailed {
                key: setting.key.clone(),
                detail: result.failure_detail(),
            });
        }

        // The Dock reads preferences at launch; launchd restarts it.
        match self
            .runner
            .run(ExecutionRequest::new("killall").arg("Dock"))
        {
            Ok(result) if !result.success() => {
                warn!(detail = %result.failure_detail(), "Dock was not restarted");
            }
            Err(e) => warn!(error = %e, "Dock was not restarted"),
            Ok(_) => {}
        }

        Ok(DockChange::Applied)
    }
}
