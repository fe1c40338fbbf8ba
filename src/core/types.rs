//! core::types
//!
//! Strong types for the names users pass on the command line.
//!
//! # Types
//!
//! - [`EnvVarName`] - Validated shell environment variable name
//! - [`PackageName`] - Validated Homebrew formula or cask name
//! - [`GitConfigKey`] - Validated `section[.subsection].name` git config key
//!
//! # Validation
//!
//! These types enforce validity at construction time, so a value that reaches
//! a profile file or an external tool's argv has already been checked.
//!
//! # Examples
//!
//! ```
//! use mactl::core::types::{EnvVarName, GitConfigKey, PackageName};
//!
//! let name = EnvVarName::new("GOPATH").unwrap();
//! let pkg = PackageName::new("kubernetes-cli").unwrap();
//! let key = GitConfigKey::new("user.email").unwrap();
//!
//! assert!(EnvVarName::new("1BAD").is_err());
//! assert!(PackageName::new("--force").is_err());
//! assert!(GitConfigKey::new("nodot").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid environment variable name: {0}")]
    InvalidEnvVarName(String),

    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("invalid git config key: {0}")]
    InvalidGitConfigKey(String),
}

/// A validated environment variable name.
///
/// Names follow the POSIX shell rule: an ASCII letter or underscore followed
/// by ASCII letters, digits, or underscores.
///
/// # Example
///
/// ```
/// use mactl::core::types::EnvVarName;
///
/// assert_eq!(EnvVarName::new("JAVA_HOME").unwrap().as_str(), "JAVA_HOME");
/// assert!(EnvVarName::new("").is_err());
/// assert!(EnvVarName::new("WITH-DASH").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvVarName(String);

impl EnvVarName {
    /// Create a new validated variable name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidEnvVarName` if the name is not a valid shell identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(TypeError::InvalidEnvVarName(
                "variable name cannot be empty".into(),
            ));
        };

        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(TypeError::InvalidEnvVarName(format!(
                "'{name}' must start with a letter or '_'"
            )));
        }

        if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(TypeError::InvalidEnvVarName(format!(
                "'{name}' contains invalid character '{bad}'"
            )));
        }

        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EnvVarName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EnvVarName> for String {
    fn from(name: EnvVarName) -> Self {
        name.0
    }
}

impl AsRef<str> for EnvVarName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EnvVarName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated Homebrew package name.
///
/// Formula and cask names are lowercase-ish tokens, optionally qualified by a
/// tap (`owner/tap/name`) and a version suffix (`python@3.12`). A name can
/// never start with `-`, so it cannot be mistaken for a flag by `brew`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    /// Create a new validated package name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPackageName` if the name is empty, starts
    /// with `-`, or contains characters brew never uses.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();

        if name.is_empty() {
            return Err(TypeError::InvalidPackageName(
                "package name cannot be empty".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidPackageName(format!(
                "'{name}' cannot start with '-'"
            )));
        }
        if name.split('/').any(str::is_empty) {
            return Err(TypeError::InvalidPackageName(format!(
                "'{name}' has an empty path component"
            )));
        }

        const ALLOWED_PUNCT: [char; 6] = ['-', '_', '.', '@', '+', '/'];
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || ALLOWED_PUNCT.contains(c)))
        {
            return Err(TypeError::InvalidPackageName(format!(
                "'{name}' contains invalid character '{bad}'"
            )));
        }

        Ok(Self(name))
    }

    /// Wrap a compile-time constant name.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(Self::new(name).is_ok(), "invalid built-in package name {name}");
        Self(name.to_string())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated git configuration key.
///
/// Keys have the shape `section.name` or `section.subsection.name`. The
/// section and the final name are alphanumeric with `-`; the subsection may
/// contain anything except newlines and NUL (git quotes it on disk).
///
/// # Example
///
/// ```
/// use mactl::core::types::GitConfigKey;
///
/// let key = GitConfigKey::new("url.git@github.com:.insteadOf").unwrap();
/// assert_eq!(key.section(), "url");
/// assert_eq!(key.name(), "insteadOf");
///
/// assert!(GitConfigKey::new("user.").is_err());
/// assert!(GitConfigKey::new(".name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitConfigKey(String);

impl GitConfigKey {
    /// Create a new validated config key.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidGitConfigKey` if the key is malformed.
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();

        let (section, rest) = key.split_once('.').ok_or_else(|| {
            TypeError::InvalidGitConfigKey(format!("'{key}' must look like section.name"))
        })?;
        let name = rest.rsplit_once('.').map_or(rest, |(_, name)| name);

        let is_token = |s: &str| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        };

        if !is_token(section) {
            return Err(TypeError::InvalidGitConfigKey(format!(
                "'{key}' has an invalid section"
            )));
        }
        if !is_token(name) || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(TypeError::InvalidGitConfigKey(format!(
                "'{key}' has an invalid variable name"
            )));
        }
        if key.contains(&['\n', '\0'][..]) {
            return Err(TypeError::InvalidGitConfigKey(format!(
                "'{}' contains a newline or NUL",
                key.escape_debug()
            )));
        }

        Ok(Self(key))
    }

    /// The leading section, e.g. `user` in `user.email`.
    pub fn section(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(section, _)| section)
    }

    /// The trailing variable name, e.g. `email` in `user.email`.
    pub fn name(&self) -> &str {
        self.0.rsplit_once('.').map_or(&self.0, |(_, name)| name)
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GitConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
