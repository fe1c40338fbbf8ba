//! features::git_ssh
//!
//! SSH key pair for git hosting.
//!
//! An existing private key is never touched. Generation is delegated to
//! `ssh-keygen` with an empty passphrase and stdin closed, so it can never
//! stop on a prompt.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::failure::{Classify, FailureKind};
use crate::core::paths::public_key_path;
use crate::process::{ExecutionRequest, ProcessRunner, RunError};

/// RSA keys are generated at this size.
pub const RSA_BITS: u32 = 4096;

/// Key algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    #[default]
    Ed25519,
    Rsa,
}

impl KeyType {
    /// Name as `ssh-keygen -t` expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Rsa => "rsa",
        }
    }

    /// Conventional file name for this key type (`id_ed25519`, `id_rsa`).
    pub fn default_file_name(self) -> String {
        format!("id_{}", self.as_str())
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `ensure_key` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A private key was already at the path.
    AlreadyExists { path: PathBuf },
    /// A new key pair was written.
    Generated { path: PathBuf },
}

impl KeyOutcome {
    pub fn path(&self) -> &Path {
        match self {
            KeyOutcome::AlreadyExists { path } | KeyOutcome::Generated { path } => path,
        }
    }
}

/// Errors from SSH key handling.
#[derive(Debug, Error)]
pub enum SshError {
    #[error("failed to generate SSH key at {}: {detail}", .path.display())]
    KeyGenerationError { path: PathBuf, detail: String },

    #[error("no public key at {}; run `mactl git ssh ensure` first", .path.display())]
    NoPublicKey { path: PathBuf },

    #[error("failed to access '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Run(#[from] RunError),
}

impl Classify for SshError {
    fn kind(&self) -> FailureKind {
        match self {
            SshError::KeyGenerationError { .. } => FailureKind::External,
            SshError::NoPublicKey { .. } => FailureKind::Precondition,
            SshError::Io { .. } => FailureKind::Generic,
            SshError::Run(e) => e.kind(),
        }
    }
}

/// Default private key path for `key_type` inside `ssh_dir`.
pub fn default_key_path(ssh_dir: &Path, key_type: KeyType) -> PathBuf {
    ssh_dir.join(key_type.default_file_name())
}

/// SSH key feature over a process runner.
pub struct GitSsh<'r> {
    runner: &'r dyn ProcessRunner,
}

impl<'r> GitSsh<'r> {
    pub fn new(runner: &'r dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Make sure a private key exists at `key_path`.
    ///
    /// # Errors
    ///
    /// [`SshError::KeyGenerationError`] if `ssh-keygen` fails, for example
    /// because the directory is not writable.
    pub fn ensure_key(
        &self,
        key_path: &Path,
        key_type: KeyType,
        comment: &str,
    ) -> Result<KeyOutcome, SshError> {
        if key_path.exists() {
            debug!(path = %key_path.display(), "ssh key already present");
            return Ok(KeyOutcome::AlreadyExists {
                path: key_path.to_path_buf(),
            });
        }

        if let Some(parent) = key_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(parent).map_err(|e| SshError::KeyGenerationError {
                path: key_path.to_path_buf(),
                detail: format!("cannot create {}: {e}", parent.display()),
            })?;
        }

        let mut request = ExecutionRequest::new("ssh-keygen").args(["-q", "-t", key_type.as_str()]);
        if key_type == KeyType::Rsa {
            request = request.args(["-b".to_string(), RSA_BITS.to_string()]);
        }
        let request = request
            .args(["-N", "", "-C", comment, "-f"])
            .arg(key_path);

        info!(path = %key_path.display(), %key_type, "generating ssh key");
        let result = self.runner.run(request)?;
        if !result.success() {
            return Err(SshError::KeyGenerationError {
                path: key_path.to_path_buf(),
                detail: result.failure_detail(),
            });
        }

        Ok(KeyOutcome::Generated {
            path: key_path.to_path_buf(),
        })
    }
}

/// The public half of the key at `key_path`.
pub fn public_key(key_path: &Path) -> Result<String, SshError> {
    let path = public_key_path(key_path);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(content.trim_end().to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SshError::NoPublicKey { path }),
        Err(e) => Err(SshError::Io { path, source: e }),
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

    if dir.is_dir() {
        return Ok(());
    }
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)?;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}
