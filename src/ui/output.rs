//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout, everything else to stderr. Quiet mode drops all
//! output except errors and data the user explicitly asked for (such as
//! `env-var list`). Error rendering is a single line unless debug output is
//! enabled, in which case the full cause chain follows.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default tracing filter directive for this verbosity.
    pub fn log_level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Debug => "debug",
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print requested data (always shown).
pub fn data(message: impl Display) {
    println!("{}", message);
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Render an error for the user.
///
/// Normally the top-level message and its immediate cause on one line; with
/// `debug`, every cause on its own line.
pub fn render_error(err: &anyhow::Error, debug: bool) -> String {
    if debug {
        let mut out = err.to_string();
        for cause in err.chain().skip(1) {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
        }
        return out;
    }
    match err.chain().nth(1) {
        Some(cause) if !err.to_string().contains(&cause.to_string()) => {
            format!("{err}: {cause}")
        }
        _ => err.to_string(),
    }
}
