//! Integration tests for the mactl binary.
//!
//! Every test runs the real binary with a cleared environment: profiles and
//! the SSH directory point into a temp dir, and `PATH` holds only the fake
//! tools a test installs. Nothing on the host machine is touched.

use std::path::Path;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

// =============================================================================
// Test Fixtures
// =============================================================================

/// Sandbox with its own profiles, SSH directory and tool directory.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        dir.child("bin").create_dir_all().unwrap();
        dir.child("work").create_dir_all().unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn profile(&self) -> assert_fs::fixture::ChildPath {
        self.dir.child("home/.zprofile")
    }

    fn ssh_dir(&self) -> assert_fs::fixture::ChildPath {
        self.dir.child("home/.ssh")
    }

    fn log(&self) -> assert_fs::fixture::ChildPath {
        self.dir.child("calls.log")
    }

    /// mactl with an environment that only sees the sandbox.
    fn mactl(&self) -> Command {
        Command::from_std(self.mactl_std())
    }

    /// Same as [`Sandbox::mactl`], as a plain command that can be spawned
    /// and signalled.
    fn mactl_std(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("mactl"));
        cmd.env_clear()
            .env("PATH", self.path().join("bin"))
            .env("MACTL_PROFILE", self.profile().path())
            .env("MACTL_SYSTEM_PROFILE", self.path().join("etc/zprofile"))
            .env("MACTL_SSH_DIR", self.ssh_dir().path())
            .env("LOG", self.log().path())
            .arg("--cwd")
            .arg(self.path().join("work"));
        cmd
    }

    /// Install an executable shell script named `name` on the sandbox PATH.
    #[cfg(unix)]
    fn fake_tool(&self, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let tool = self.dir.child("bin").child(name);
        tool.write_str(&format!("#!/bin/sh\necho \"{name} $*\" >> \"$LOG\"\n{body}\n"))
            .unwrap();
        std::fs::set_permissions(tool.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn calls(&self) -> String {
        std::fs::read_to_string(self.log().path()).unwrap_or_default()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

#[test]
fn help_and_version_exit_zero() {
    let sandbox = Sandbox::new();
    sandbox
        .mactl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("env-var"));
    sandbox
        .mactl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mactl"));
}

#[test]
fn unknown_command_exits_2() {
    Sandbox::new()
        .mactl()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn bad_flag_exits_2() {
    Sandbox::new()
        .mactl()
        .args(["env-var", "list", "--bogus"])
        .assert()
        .code(2);
}

#[test]
fn invalid_timeout_env_is_usage_error() {
    Sandbox::new()
        .mactl()
        .env("MACTL_TIMEOUT_SECS", "soon")
        .args(["env-var", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MACTL_TIMEOUT_SECS"));
}

#[test]
fn completion_script_is_printed() {
    Sandbox::new()
        .mactl()
        .args(["completion", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef mactl"));
}

// =============================================================================
// env-var
// =============================================================================

#[test]
fn env_var_add_then_list() {
    let sandbox = Sandbox::new();

    sandbox
        .mactl()
        .args(["env-var", "add", "FOO", "bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added FOO"));

    sandbox
        .profile()
        .assert(predicate::str::contains("export FOO=\"bar\"\n"));

    sandbox
        .mactl()
        .args(["env-var", "list"])
        .assert()
        .success()
        .stdout(predicate::eq("FOO=bar\n"));
}

#[test]
fn env_var_duplicate_exits_4_and_keeps_file() {
    let sandbox = Sandbox::new();
    sandbox.profile().write_str("export FOO=\"old\"\n").unwrap();

    sandbox
        .mactl()
        .args(["env-var", "add", "FOO", "new"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("--overwrite"));
    sandbox.profile().assert("export FOO=\"old\"\n");

    sandbox
        .mactl()
        .args(["env-var", "add", "FOO", "new", "--overwrite"])
        .assert()
        .success();
    sandbox.profile().assert("export FOO=\"new\"\n");
}

#[test]
fn env_var_list_json() {
    let sandbox = Sandbox::new();
    sandbox
        .profile()
        .write_str("export A=1\nexport B='two words'\n")
        .unwrap();

    let output = sandbox
        .mactl()
        .args(["env-var", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        entries,
        serde_json::json!([
            {"name": "A", "value": "1"},
            {"name": "B", "value": "two words"},
        ])
    );
}

#[test]
fn env_var_profile_flag_and_system_scope() {
    let sandbox = Sandbox::new();
    let custom = sandbox.dir.child("custom.sh");

    sandbox
        .mactl()
        .args(["env-var", "add", "X", "1", "--profile"])
        .arg(custom.path())
        .assert()
        .success();
    custom.assert(predicate::str::contains("export X="));
    sandbox.profile().assert(predicate::path::missing());

    sandbox
        .mactl()
        .args(["env-var", "add", "Y", "2", "--scope", "system"])
        .assert()
        .success();
    sandbox
        .dir
        .child("etc/zprofile")
        .assert(predicate::str::contains("export Y="));
}

#[test]
fn env_var_profile_with_scope_exits_2() {
    let sandbox = Sandbox::new();
    let custom = sandbox.dir.child("custom.sh");

    sandbox
        .mactl()
        .args(["env-var", "add", "X", "1", "--scope", "system", "--profile"])
        .arg(custom.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--profile"));
    custom.assert(predicate::path::missing());
    sandbox.dir.child("etc/zprofile").assert(predicate::path::missing());
}

#[test]
fn env_var_invalid_name_exits_2() {
    let sandbox = Sandbox::new();
    sandbox
        .mactl()
        .args(["env-var", "add", "1BAD", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid environment variable name"));
    sandbox.profile().assert(predicate::path::missing());
}

#[test]
fn env_var_list_missing_profile_is_empty() {
    Sandbox::new()
        .mactl()
        .args(["env-var", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// =============================================================================
// setup
// =============================================================================

#[test]
fn setup_without_brew_exits_3() {
    Sandbox::new()
        .mactl()
        .args(["setup", "kustomize"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("brew is not installed"));
}

#[cfg(unix)]
#[test]
fn setup_installs_through_brew() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool(
        "brew",
        r#"case "$1" in
  --version) echo "Homebrew 4.3.0" ;;
  list) exit 1 ;;
esac
exit 0"#,
    );

    sandbox
        .mactl()
        .args(["setup", "kubectl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("installed kubectl"));

    let calls = sandbox.calls();
    assert!(calls.contains("brew list --formula kubernetes-cli"), "{calls}");
    assert!(calls.contains("brew install kubernetes-cli"), "{calls}");
}

#[cfg(unix)]
#[test]
fn setup_skips_installed_tool() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool("brew", "exit 0");

    sandbox
        .mactl()
        .args(["setup", "kustomize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));

    assert!(!sandbox.calls().contains("brew install"));
}

#[cfg(unix)]
#[test]
fn setup_failure_exits_5_with_brew_output() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool(
        "brew",
        r#"case "$1" in
  list) exit 1 ;;
  install) echo "Error: Download failed" >&2; exit 1 ;;
esac
exit 0"#,
    );

    sandbox
        .mactl()
        .args(["setup", "helm"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("failed to install helm"))
        .stderr(predicate::str::contains("Download failed"));
}

#[cfg(unix)]
#[test]
fn debug_log_level_shows_full_cause_chain() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool(
        "brew",
        r#"case "$1" in
  list) exit 1 ;;
  install) echo "Error: Download failed" >&2; exit 1 ;;
esac
exit 0"#,
    );

    sandbox
        .mactl()
        .args(["setup", "helm"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("caused by:").not());

    sandbox
        .mactl()
        .env("MACTL_LOG", "debug")
        .args(["setup", "helm"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("failed to install helm\n  caused by: brew could not install"));
}

#[cfg(unix)]
#[test]
fn timeout_kills_hung_tool() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool(
        "brew",
        r#"case "$1" in
  list) /bin/sleep 30 ;;
esac
exit 0"#,
    );

    let started = Instant::now();
    sandbox
        .mactl()
        .args(["--timeout", "1", "setup", "kustomize"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(20));
}

// =============================================================================
// optimize dock
// =============================================================================

#[cfg(unix)]
#[test]
fn dock_writes_and_restarts() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool("defaults", r#"[ "$1" = read ] && exit 1; exit 0"#);
    sandbox.fake_tool("killall", "exit 0");

    sandbox
        .mactl()
        .args(["optimize", "dock", "tilesize", "--value", "48"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tilesize set to 48"));

    let calls = sandbox.calls();
    assert!(
        calls.contains("defaults write com.apple.dock tilesize -int 48"),
        "{calls}"
    );
    assert!(calls.contains("killall Dock"), "{calls}");
}

#[cfg(unix)]
#[test]
fn dock_unchanged_value_is_not_rewritten() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool("defaults", r#"[ "$1" = read ] && echo 1; exit 0"#);
    sandbox.fake_tool("killall", "exit 0");

    sandbox
        .mactl()
        .args(["optimize", "dock", "autohide"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already"));

    let calls = sandbox.calls();
    assert!(!calls.contains("defaults write"), "{calls}");
    assert!(!calls.contains("killall"), "{calls}");
}

#[test]
fn dock_unsupported_key_exits_2_without_invocation() {
    let sandbox = Sandbox::new();
    sandbox
        .mactl()
        .args(["optimize", "dock", "persistent-apps"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported dock preference"));
    assert!(sandbox.calls().is_empty());
}

#[test]
fn dock_without_defaults_exits_3() {
    Sandbox::new()
        .mactl()
        .args(["optimize", "dock", "autohide"])
        .assert()
        .code(3);
}

// =============================================================================
// git
// =============================================================================

#[test]
fn git_config_local_outside_repository_exits_4() {
    let sandbox = Sandbox::new();
    sandbox
        .mactl()
        .args(["git", "config", "user.email", "me@example.com", "--local"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not a git repository"));
    assert!(sandbox.calls().is_empty());
}

#[test]
fn git_config_invalid_key_exits_2() {
    Sandbox::new()
        .mactl()
        .args(["git", "config", "nodot", "value"])
        .assert()
        .code(2);
}

#[cfg(unix)]
#[test]
fn git_config_global_passes_through() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool("git", "exit 0");

    sandbox
        .mactl()
        .args(["git", "config", "pull.rebase", "true"])
        .assert()
        .success();

    assert!(sandbox
        .calls()
        .contains("git config --global pull.rebase true"));
}

#[test]
fn ssh_existing_key_is_reported() {
    let sandbox = Sandbox::new();
    sandbox
        .ssh_dir()
        .child("id_ed25519")
        .write_str("PRIVATE")
        .unwrap();

    sandbox
        .mactl()
        .args(["git", "ssh", "ensure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    sandbox.ssh_dir().child("id_ed25519").assert("PRIVATE");
    assert!(sandbox.calls().is_empty());
}

#[cfg(unix)]
#[test]
fn ssh_generates_key_and_prints_public_half() {
    let sandbox = Sandbox::new();
    sandbox.fake_tool(
        "ssh-keygen",
        r#"out=""
while [ $# -gt 0 ]; do
  case "$1" in -f) shift; out="$1" ;; esac
  shift
done
echo PRIVATE > "$out"
echo "ssh-ed25519 AAAAC3Nza test@example.com" > "$out.pub""#,
    );

    sandbox
        .mactl()
        .args(["git", "ssh", "ensure", "--comment", "test@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ssh-ed25519 AAAAC3Nza"));

    sandbox
        .ssh_dir()
        .child("id_ed25519")
        .assert(predicate::path::exists());
    assert!(sandbox
        .calls()
        .contains("ssh-keygen -q -t ed25519 -N  -C test@example.com -f"));
}

#[test]
fn ssh_show_without_key_exits_4() {
    Sandbox::new()
        .mactl()
        .args(["git", "ssh", "show"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("no public key"));
}

// =============================================================================
// Interrupts
// =============================================================================

/// Pid written by a fake tool, once the file is complete.
#[cfg(unix)]
fn read_pid(path: &Path, limit: Duration) -> libc::pid_t {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(pid) = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| text.trim().parse().ok())
        {
            return pid;
        }
        assert!(Instant::now() < deadline, "{} never appeared", path.display());
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Whether `pid` still runs. A zombie waiting for its reaper counts as gone.
#[cfg(unix)]
fn running(pid: libc::pid_t) -> bool {
    // SAFETY: signal 0 only checks that the process exists.
    if unsafe { libc::kill(pid, 0) } != 0 {
        return false;
    }
    let zombie = std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| {
            stat.rsplit_once(')')
                .map(|(_, rest)| rest.trim_start().starts_with('Z'))
        })
        .unwrap_or(false);
    !zombie
}

#[cfg(unix)]
fn wait_for_exit(child: &mut std::process::Child, limit: Duration) -> std::process::ExitStatus {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("mactl did not exit after the signal");
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Run `setup` against a brew that leaves a grandchild behind, signal mactl
/// mid-install, and check that the whole tool tree went down with it.
#[cfg(unix)]
fn assert_signal_stops_tool_tree(signal: libc::c_int) {
    use std::process::Stdio;

    let sandbox = Sandbox::new();
    let pid_file = sandbox.dir.child("sleeper.pid");
    sandbox.fake_tool(
        "brew",
        &format!(
            r#"case "$1" in
  list) exit 1 ;;
  install) /bin/sleep 300 & echo $! > "{}"; wait ;;
esac
exit 0"#,
            pid_file.path().display()
        ),
    );

    let mut mactl = sandbox
        .mactl_std()
        .args(["setup", "kustomize"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let sleeper = read_pid(pid_file.path(), Duration::from_secs(20));
    let mactl_pid = libc::pid_t::try_from(mactl.id()).unwrap();
    // SAFETY: plain signal delivery to a child we own.
    unsafe {
        libc::kill(mactl_pid, signal);
    }

    let status = wait_for_exit(&mut mactl, Duration::from_secs(20));
    assert_eq!(status.code(), Some(130));

    let deadline = Instant::now() + Duration::from_secs(10);
    while running(sleeper) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(!running(sleeper), "grandchild {sleeper} outlived mactl");
}

#[cfg(unix)]
#[test]
fn sigint_stops_tool_tree_and_exits_130() {
    assert_signal_stops_tool_tree(libc::SIGINT);
}

#[cfg(unix)]
#[test]
fn sigterm_stops_tool_tree_and_exits_130() {
    assert_signal_stops_tool_tree(libc::SIGTERM);
}
