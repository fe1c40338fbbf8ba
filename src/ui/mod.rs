//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//! - [`telemetry`] - Diagnostic logging setup
//!
//! # Design
//!
//! Only the CLI layer calls into this module. Feature modules return values
//! and errors; how they are shown is decided here.

pub mod output;
pub mod telemetry;
