//! process::system
//!
//! [`ProcessRunner`] backed by real child processes.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::interrupt;
use super::{ExecutionRequest, ExecutionResult, ProcessRunner, RunError, StdinMode};

/// How often a child with a deadline is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs requests as child processes.
///
/// Each child gets its own process group so an interrupt can take down the
/// whole tree (brew spawns curl, git spawns ssh). The exception is a child
/// that inherits a terminal on stdin: it stays in the foreground group, since
/// a background group reading the terminal is stopped with SIGTTIN. Terminal
/// signals then reach the whole tree directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn resolve(&self, request: &ExecutionRequest) -> Result<PathBuf, RunError> {
        let program = request.program();
        let path_override = request
            .get_env()
            .iter()
            .rev()
            .find(|(key, _)| key == "PATH")
            .map(|(_, value)| value.clone());

        let found = match path_override {
            Some(paths) => {
                let cwd = request
                    .get_current_dir()
                    .map(PathBuf::from)
                    .or_else(|| std::env::current_dir().ok())
                    .unwrap_or_else(|| PathBuf::from("."));
                which::which_in(program, Some(paths), cwd)
            }
            None => which::which(program),
        };

        found.map_err(|_| RunError::NotFound {
            program: program.to_string(),
        })
    }

    fn build_command(&self, path: PathBuf, request: &ExecutionRequest, own_group: bool) -> Command {
        let mut cmd = Command::new(path);
        cmd.args(request.get_args())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match request.stdin_mode() {
            StdinMode::Null => cmd.stdin(Stdio::null()),
            StdinMode::Inherit => cmd.stdin(Stdio::inherit()),
        };

        if let Some(dir) = request.get_current_dir() {
            cmd.current_dir(dir);
        }
        for (key, value) in request.get_env() {
            cmd.env(key, value);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if own_group {
                cmd.process_group(0);
            }
        }
        #[cfg(not(unix))]
        let _ = own_group;

        cmd
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult, RunError> {
        let program = request.program().to_string();
        if interrupt::requested() {
            return Err(RunError::Interrupted { program });
        }
        let path = self.resolve(&request)?;
        let timeout = request.get_timeout();
        let own_group = runs_in_own_group(&request);

        debug!(command = %request, path = %path.display(), own_group, "spawning");

        let started = Instant::now();
        let mut child = self
            .build_command(path, &request, own_group)
            .spawn()
            .map_err(|e| RunError::Spawn {
                program: program.clone(),
                source: e,
            })?;

        let tracked = interrupt::Tracked::new(child.id(), own_group);
        let _active = interrupt::track(tracked);
        if interrupt::requested() {
            tracked.terminate();
            let _ = child.wait();
            return Err(RunError::Interrupted { program });
        }

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match timeout {
            Some(limit) => wait_with_deadline(&mut child, limit),
            None => child.wait().map(Some),
        }
        .map_err(|e| RunError::Io {
            program: program.clone(),
            source: e,
        })?;

        let Some(status) = status else {
            tracked.terminate();
            let _ = child.kill();
            let _ = child.wait();
            warn!(command = %request, "timed out");
            return Err(RunError::Timeout {
                program,
                timeout: timeout.unwrap_or_default(),
            });
        };

        if interrupt::requested() {
            return Err(RunError::Interrupted { program });
        }

        let stdout = collect(stdout, &program)?;
        let stderr = collect(stderr, &program)?;
        let duration = started.elapsed();
        let exit_code = exit_code(status);

        debug!(
            command = %request,
            exit_code,
            elapsed_ms = duration.as_millis() as u64,
            "finished"
        );

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            duration: Some(duration),
        })
    }
}

/// Whether `request` gets a process group of its own.
fn runs_in_own_group(request: &ExecutionRequest) -> bool {
    !(request.stdin_mode() == StdinMode::Inherit && std::io::stdin().is_terminal())
}

type Drain = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

/// Read a pipe to the end on its own thread so a chatty child cannot fill
/// one pipe while we block on the other.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(handle: Drain, program: &str) -> Result<String, RunError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .unwrap_or_else(|_| Err(std::io::Error::other("output reader panicked")))
        .map_err(|e| RunError::Io {
            program: program.to_string(),
            source: e,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Wait for `child`, giving up after `limit`.
///
/// Returns `Ok(None)` on timeout; the child is still running then.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
