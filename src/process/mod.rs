//! process
//!
//! The single doorway to external tools.
//!
//! # Architecture
//!
//! This module is the **only** place mactl spawns processes. Feature modules
//! and the installer describe what to run with an [`ExecutionRequest`] and
//! hand it to a [`ProcessRunner`]; they never touch `std::process` directly.
//! That keeps them testable with [`fake::FakeRunner`], which returns canned
//! results and records every request.
//!
//! # Contract
//!
//! - Arguments are passed verbatim, never through a shell.
//! - A child that exits nonzero is still an `Ok(ExecutionResult)`. What a
//!   nonzero code means is the caller's business.
//! - `Err(RunError)` means the tool could not be run to completion: it is not
//!   installed, could not be started, timed out, or was interrupted.
//!
//! # Example
//!
//! ```no_run
//! use mactl::process::{ExecutionRequest, ProcessRunner, SystemRunner};
//!
//! let runner = SystemRunner::new();
//! let result = runner.run(ExecutionRequest::new("git").args(["--version"]))?;
//! if result.success() {
//!     println!("{}", result.stdout_trimmed());
//! }
//! # Ok::<(), mactl::process::RunError>(())
//! ```

pub mod fake;
pub mod interrupt;
mod system;

pub use system::SystemRunner;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::failure::{Classify, FailureKind};

/// Errors from running an external tool.
#[derive(Debug, Error)]
pub enum RunError {
    /// The program could not be found on the search path.
    #[error("'{program}' not found on PATH")]
    NotFound { program: String },

    /// The OS refused to start the program.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Waiting for the program or reading its output failed.
    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    /// The program did not finish within its timeout and was killed.
    #[error("'{program}' timed out after {}s", .timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    /// The run was cut short by SIGINT/SIGTERM.
    #[error("'{program}' was interrupted")]
    Interrupted { program: String },
}

impl RunError {
    /// The program this error is about.
    pub fn program(&self) -> &str {
        match self {
            RunError::NotFound { program }
            | RunError::Spawn { program, .. }
            | RunError::Io { program, .. }
            | RunError::Timeout { program, .. }
            | RunError::Interrupted { program } => program,
        }
    }

    /// Whether the program is missing from the system.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RunError::NotFound { .. })
    }
}

impl Classify for RunError {
    fn kind(&self) -> FailureKind {
        match self {
            RunError::NotFound { .. } => FailureKind::DependencyMissing,
            RunError::Spawn { .. } | RunError::Io { .. } => FailureKind::Generic,
            RunError::Timeout { .. } => FailureKind::External,
            RunError::Interrupted { .. } => FailureKind::Interrupted,
        }
    }
}

/// How the child's stdin is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdinMode {
    /// `/dev/null`; the child can never block on a prompt.
    #[default]
    Null,
    /// Inherit the terminal, for tools that may ask for a password.
    Inherit,
}

/// Description of one external tool invocation.
///
/// Built per call by a feature module and consumed by [`ProcessRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    program: String,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(String, OsString)>,
    timeout: Option<Duration>,
    stdin: StdinMode,
}

impl ExecutionRequest {
    /// Start a request for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            timeout: None,
            stdin: StdinMode::Null,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Kill the child if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Let the child read from the terminal.
    pub fn inherit_stdin(mut self) -> Self {
        self.stdin = StdinMode::Inherit;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as lossy strings, for matching and display.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn get_env(&self) -> &[(String, OsString)] {
        &self.env
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn stdin_mode(&self) -> StdinMode {
        self.stdin
    }
}

impl fmt::Display for ExecutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Outcome of a completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code; a child killed by signal N reports `128 + N`.
    pub exit_code: i32,
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
    /// Wall-clock time from spawn to exit.
    pub duration: Option<Duration>,
}

impl ExecutionResult {
    /// A result with the given code and output, without timing.
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration: None,
        }
    }

    /// Exit code 0 with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    /// The given nonzero code with the given stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::new(exit_code, "", stderr)
    }

    /// Whether the tool exited 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }

    /// The most useful one-paragraph description of a failure.
    ///
    /// Prefers stderr, falls back to stdout, then to the bare exit code.
    pub fn failure_detail(&self) -> String {
        let text = if !self.stderr_trimmed().is_empty() {
            self.stderr_trimmed()
        } else {
            self.stdout_trimmed()
        };
        if text.is_empty() {
            format!("exited with status {}", self.exit_code)
        } else {
            text.to_string()
        }
    }
}

/// Something that can run an [`ExecutionRequest`].
pub trait ProcessRunner {
    /// Run the request to completion.
    ///
    /// # Errors
    ///
    /// Returns `RunError` only when the tool could not be run; a nonzero
    /// exit is reported through [`ExecutionResult::exit_code`].
    fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult, RunError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult, RunError> {
        (**self).run(request)
    }
}

/// Applies a default timeout to requests that do not set their own.
#[derive(Debug, Clone)]
pub struct TimeoutRunner<R> {
    inner: R,
    timeout: Option<Duration>,
}

impl<R: ProcessRunner> TimeoutRunner<R> {
    /// Wrap `inner`; `None` leaves requests unchanged.
    pub fn new(inner: R, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }
}

impl<R: ProcessRunner> ProcessRunner for TimeoutRunner<R> {
    fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult, RunError> {
        let request = match (request.get_timeout(), self.timeout) {
            (None, Some(limit)) => request.timeout(limit),
            _ => request,
        };
        self.inner.run(request)
    }
}
