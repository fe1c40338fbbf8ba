//! features
//!
//! One module per area of machine configuration.
//!
//! # Architecture
//!
//! Every feature follows the same linear shape: validate input, delegate to
//! the installer or the process runner, return a typed outcome or error.
//! Features never print; the CLI layer renders outcomes and turns errors into
//! exit codes. None of them keeps state between invocations.
//!
//! - [`dock`] - Dock preferences via `defaults`
//! - [`env_var`] - `export` lines in shell profiles
//! - [`git_config`] - `git config` in local or global scope
//! - [`git_ssh`] - SSH key pair for git hosting
//! - [`tools`] - developer tools installed through brew

pub mod dock;
pub mod env_var;
pub mod git_config;
pub mod git_ssh;
pub mod tools;
