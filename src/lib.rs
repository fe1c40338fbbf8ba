//! mactl - bootstrap and tune a macOS development machine
//!
//! mactl is a single-binary tool that installs developer tools through
//! Homebrew, applies Dock preferences, manages environment variables in shell
//! profiles, and configures git and its SSH key.
//!
//! # Architecture
//!
//! The codebase is layered, leaves first:
//!
//! - [`process`] - The only place external tools are spawned
//! - [`installer`] - Idempotent "ensure package is installed" over brew
//! - [`features`] - One module per area of machine configuration
//! - [`cli`] - Argument parsing, routing, rendering and exit codes
//! - [`core`] - Validated types, settings, atomic writes, failure classes
//! - [`ui`] - Terminal output and logging setup
//!
//! # Invariants
//!
//! 1. External tools get their arguments verbatim; nothing goes through a shell
//! 2. Profile files are replaced atomically, never rewritten in place
//! 3. Features never print; only the CLI layer talks to the user
//! 4. Every failure maps to one exit code class

pub mod cli;
pub mod core;
pub mod features;
pub mod installer;
pub mod process;
pub mod ui;
