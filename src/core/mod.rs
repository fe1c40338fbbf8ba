//! core
//!
//! Shared building blocks for mactl.
//!
//! # Modules
//!
//! - [`types`] - Strong types: EnvVarName, PackageName, GitConfigKey
//! - [`failure`] - Failure categories and exit codes
//! - [`settings`] - Settings resolved from environment and flags
//! - [`paths`] - Default locations of edited files
//! - [`fs`] - Atomic file replacement
//! - [`context`] - Execution context passed to handlers

pub mod context;
pub mod failure;
pub mod fs;
pub mod paths;
pub mod settings;
pub mod types;

pub use context::Context;
pub use failure::{classify, Classify, FailureKind};
