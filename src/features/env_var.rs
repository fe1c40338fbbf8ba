//! features::env_var
//!
//! Environment variables exported from a shell profile file.
//!
//! # Format
//!
//! Entries are written as
//!
//! ```text
//! export NAME="VALUE"
//! ```
//!
//! with `\`, `"`, `$` and `` ` `` escaped, so the value reaches the shell
//! literally. When reading, single-quoted and unquoted values are understood
//! as well; any line that is not an `export` is left alone and skipped.
//!
//! # Writes
//!
//! The profile is never edited in place. [`ProfileFile::add`] builds the new
//! content in memory and hands it to [`write_atomic`], so the previous file
//! survives a crash at any point.
//!
//! # Example
//!
//! ```
//! use mactl::core::types::EnvVarName;
//! use mactl::features::env_var::{EnvVarEntry, ProfileFile};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let profile = ProfileFile::new(dir.path().join(".zprofile"));
//!
//! let entry = EnvVarEntry::new(EnvVarName::new("EDITOR").unwrap(), "vim");
//! profile.add(&entry, false).unwrap();
//!
//! let names: Vec<String> = profile
//!     .list()
//!     .unwrap()
//!     .map(|e| e.unwrap().name.to_string())
//!     .collect();
//! assert_eq!(names, vec!["EDITOR"]);
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::failure::{Classify, FailureKind};
use crate::core::fs::{write_atomic, FsError};
use crate::core::settings::Settings;
use crate::core::types::{EnvVarName, TypeError};

const EXPORT: &str = "export";

/// A name/value pair exported from a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarEntry {
    pub name: EnvVarName,
    pub value: String,
}

impl EnvVarEntry {
    pub fn new(name: EnvVarName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// The profile line for this entry.
    pub fn to_line(&self) -> String {
        format!("{EXPORT} {}={}", self.name, quote_value(&self.value))
    }
}

/// Which profile an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// The user's own profile (`~/.zprofile`).
    #[default]
    User,
    /// The machine-wide profile (`/etc/zprofile`).
    System,
}

impl Scope {
    /// The profile path for this scope.
    pub fn profile_path(self, settings: &Settings) -> &Path {
        match self {
            Scope::User => &settings.user_profile,
            Scope::System => &settings.system_profile,
        }
    }
}

/// What `add` did to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Added,
    /// Existing lines for the name were replaced; `previous` is how many.
    Replaced { previous: usize },
}

/// Errors from environment variable operations.
#[derive(Debug, Error)]
pub enum EnvVarError {
    #[error("{name} is already set in {}; pass --overwrite to replace it", .path.display())]
    DuplicateKey { name: String, path: PathBuf },

    #[error("value for {name} must be a single line")]
    InvalidValue { name: String },

    #[error("failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Write(#[from] FsError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl Classify for EnvVarError {
    fn kind(&self) -> FailureKind {
        match self {
            EnvVarError::DuplicateKey { .. } => FailureKind::Precondition,
            EnvVarError::InvalidValue { .. } | EnvVarError::Type(_) => FailureKind::Usage,
            EnvVarError::Read { .. } => FailureKind::Generic,
            EnvVarError::Write(e) => e.kind(),
        }
    }
}

/// A shell profile holding `export` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFile {
    path: PathBuf,
}

impl ProfileFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The profile for `scope` under `settings`.
    pub fn for_scope(scope: Scope, settings: &Settings) -> Self {
        Self::new(scope.profile_path(settings))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in file order.
    ///
    /// The file is opened fresh on every call and read lazily. A profile that
    /// does not exist yet has no entries.
    pub fn list(&self) -> Result<Entries, EnvVarError> {
        match File::open(&self.path) {
            Ok(file) => Ok(Entries {
                path: self.path.clone(),
                lines: Some(BufReader::new(file).lines()),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries {
                path: self.path.clone(),
                lines: None,
            }),
            Err(e) => Err(EnvVarError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Add `entry` to the profile.
    ///
    /// A name that is already exported fails with
    /// [`EnvVarError::DuplicateKey`] unless `overwrite` is set. With
    /// `overwrite`, every line for the name is dropped and a single new line
    /// takes the place of the first one.
    pub fn add(&self, entry: &EnvVarEntry, overwrite: bool) -> Result<AddOutcome, EnvVarError> {
        if entry.value.contains(['\n', '\r', '\0']) {
            return Err(EnvVarError::InvalidValue {
                name: entry.name.to_string(),
            });
        }

        let content = self.read_content()?;
        let (updated, outcome) = splice(&content, entry, overwrite).ok_or_else(|| {
            EnvVarError::DuplicateKey {
                name: entry.name.to_string(),
                path: self.path.clone(),
            }
        })?;

        write_atomic(&self.path, updated.as_bytes())?;

        match outcome {
            AddOutcome::Added => info!(name = %entry.name, path = %self.path.display(), "added"),
            AddOutcome::Replaced { previous } => {
                info!(name = %entry.name, previous, path = %self.path.display(), "replaced")
            }
        }
        Ok(outcome)
    }

    fn read_content(&self) -> Result<String, EnvVarError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "profile does not exist yet");
                Ok(String::new())
            }
            Err(e) => Err(EnvVarError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

/// Lazy iterator over the entries of one profile read.
#[derive(Debug)]
pub struct Entries {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
}

impl Iterator for Entries {
    type Item = Result<EnvVarEntry, EnvVarError>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        loop {
            match lines.next()? {
                Ok(line) => {
                    if let Some(entry) = parse_line(&line) {
                        return Some(Ok(entry));
                    }
                }
                Err(e) => {
                    self.lines = None;
                    return Some(Err(EnvVarError::Read {
                        path: self.path.clone(),
                        source: e,
                    }));
                }
            }
        }
    }
}

/// New file content with `entry` added, or `None` for a refused duplicate.
fn splice(content: &str, entry: &EnvVarEntry, overwrite: bool) -> Option<(String, AddOutcome)> {
    let lines: Vec<&str> = content.lines().collect();
    let matching: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| parse_line(line).is_some_and(|e| e.name == entry.name))
        .map(|(i, _)| i)
        .collect();

    let new_line = entry.to_line();
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };

    if matching.is_empty() {
        let mut out = content.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push_str(newline);
        }
        out.push_str(&new_line);
        out.push_str(newline);
        return Some((out, AddOutcome::Added));
    }

    if !overwrite {
        return None;
    }

    let first = matching[0];
    let mut out = String::with_capacity(content.len() + new_line.len());
    for (i, line) in lines.iter().enumerate() {
        if i == first {
            out.push_str(&new_line);
        } else if matching.contains(&i) {
            continue;
        } else {
            out.push_str(line);
        }
        out.push_str(newline);
    }
    Some((
        out,
        AddOutcome::Replaced {
            previous: matching.len(),
        },
    ))
}

/// Double-quote `value` for a POSIX shell.
pub fn quote_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Parse one profile line into an entry, if it is an `export NAME=VALUE`.
pub fn parse_line(line: &str) -> Option<EnvVarEntry> {
    let rest = line.trim_start().strip_prefix(EXPORT)?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let (name, raw_value) = rest.trim_start().split_once('=')?;
    let name = EnvVarName::new(name).ok()?;
    let value = parse_value(raw_value)?;
    Some(EnvVarEntry { name, value })
}

fn parse_value(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    match chars.next() {
        None => Some(String::new()),
        Some('"') => {
            let mut value = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '"' => return Some(value),
                    '\\' => match chars.next() {
                        Some(next @ ('\\' | '"' | '$' | '`')) => value.push(next),
                        Some(other) => {
                            value.push('\\');
                            value.push(other);
                        }
                        None => value.push('\\'),
                    },
                    _ => value.push(c),
                }
            }
            // Unterminated quote.
            None
        }
        Some('\'') => {
            let rest = chars.as_str();
            rest.find('\'').map(|end| rest[..end].to_string())
        }
        Some(_) => Some(
            raw.split(|c: char| c.is_whitespace() || c == '#' || c == ';')
                .next()
                .unwrap_or_default()
                .to_string(),
        ),
    }
}
