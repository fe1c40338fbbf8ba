//! process::fake
//!
//! In-memory [`ProcessRunner`] for deterministic tests.
//!
//! # Design
//!
//! The fake never spawns anything. It answers each request from a table of
//! canned results and records the request so tests can assert exactly which
//! invocations happened (or did not).
//!
//! Matching order:
//! 1. a response registered for the exact program and argv
//! 2. a response registered for the program alone
//! 3. the default response (exit 0, empty output)
//!
//! Programs marked missing fail with [`RunError::NotFound`], like a tool that
//! is not on `PATH`.
//!
//! # Example
//!
//! ```
//! use mactl::process::fake::FakeRunner;
//! use mactl::process::{ExecutionRequest, ExecutionResult, ProcessRunner};
//!
//! let runner = FakeRunner::new();
//! runner.respond(["brew", "list", "--formula", "jq"], ExecutionResult::failed(1, ""));
//!
//! let result = runner
//!     .run(ExecutionRequest::new("brew").args(["list", "--formula", "jq"]))
//!     .unwrap();
//! assert_eq!(result.exit_code, 1);
//! assert_eq!(runner.calls().len(), 1);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{ExecutionRequest, ExecutionResult, ProcessRunner, RunError};

/// Fake runner for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    inner: Arc<Mutex<FakeRunnerInner>>,
}

#[derive(Debug, Default)]
struct FakeRunnerInner {
    /// Responses keyed by full argv (program first). Queued responses are
    /// consumed in order; the last one sticks.
    exact: HashMap<Vec<String>, VecDeque<Outcome>>,
    /// Responses keyed by program only.
    by_program: HashMap<String, Outcome>,
    /// Programs that behave as if not installed.
    missing: HashSet<String>,
    /// Recorded requests.
    calls: Vec<ExecutionRequest>,
}

#[derive(Debug, Clone)]
enum Outcome {
    Result(ExecutionResult),
    Timeout,
}

impl FakeRunner {
    /// Create a fake where every program succeeds silently.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeRunnerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answer the exact argv with `result`.
    ///
    /// Registering the same argv again queues another answer; answers are
    /// handed out in order and the last one repeats.
    pub fn respond<I, S>(&self, argv: I, result: ExecutionResult) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_exact(argv, Outcome::Result(result));
        self
    }

    /// Make the exact argv time out.
    pub fn time_out<I, S>(&self, argv: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_exact(argv, Outcome::Timeout);
        self
    }

    /// Answer every invocation of `program` (without an exact match) with `result`.
    pub fn respond_program(&self, program: &str, result: ExecutionResult) -> &Self {
        self.lock()
            .by_program
            .insert(program.to_string(), Outcome::Result(result));
        self
    }

    /// Behave as if `program` is not installed.
    pub fn missing(&self, program: &str) -> &Self {
        self.lock().missing.insert(program.to_string());
        self
    }

    /// All requests seen so far, in order.
    pub fn calls(&self) -> Vec<ExecutionRequest> {
        self.lock().calls.clone()
    }

    /// All requests as `program arg arg ...` strings.
    pub fn call_lines(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .map(|req| {
                std::iter::once(req.program().to_string())
                    .chain(req.args_lossy())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Whether any recorded request's argv starts with `prefix`.
    pub fn was_called_with(&self, prefix: &[&str]) -> bool {
        self.lock().calls.iter().any(|req| {
            let argv: Vec<String> = std::iter::once(req.program().to_string())
                .chain(req.args_lossy())
                .collect();
            argv.len() >= prefix.len() && argv.iter().zip(prefix).all(|(a, p)| a == p)
        })
    }

    fn push_exact<I, S>(&self, argv: I, outcome: Outcome)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key: Vec<String> = argv.into_iter().map(Into::into).collect();
        self.lock().exact.entry(key).or_default().push_back(outcome);
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult, RunError> {
        let mut inner = self.lock();
        let program = request.program().to_string();
        let key: Vec<String> = std::iter::once(program.clone())
            .chain(request.args_lossy())
            .collect();
        let timeout = request.get_timeout();

        inner.calls.push(request);

        if inner.missing.contains(&program) {
            return Err(RunError::NotFound { program });
        }

        let exact = match inner.exact.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        let outcome = exact
            .or_else(|| inner.by_program.get(&program).cloned())
            .unwrap_or_else(|| Outcome::Result(ExecutionResult::ok("")));

        match outcome {
            Outcome::Result(result) => Ok(result),
            Outcome::Timeout => Err(RunError::Timeout {
                program,
                timeout: timeout.unwrap_or(Duration::from_secs(1)),
            }),
        }
    }
}
