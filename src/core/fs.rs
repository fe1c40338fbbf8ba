//! core::fs
//!
//! Atomic file replacement.
//!
//! Profile files are never rewritten in place. New content goes to a sibling
//! temp file which is synced and then renamed over the target, so a crash
//! or a failed write leaves the original untouched.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::failure::{Classify, FailureKind};

/// Errors from atomic writes.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("failed to prepare '{path}': {source}")]
    Prepare { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to replace '{path}': {source}")]
    Replace { path: PathBuf, source: io::Error },
}

impl Classify for FsError {
    fn kind(&self) -> FailureKind {
        FailureKind::Generic
    }
}

/// Temp file path used while replacing `target`.
///
/// The temp file lives in the same directory so the final rename never
/// crosses a filesystem boundary.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    target.with_file_name(format!(".{}.mactl.tmp", name.trim_start_matches('.')))
}

/// Replace `target` with `contents` atomically.
pub fn write_atomic(target: &Path, contents: &[u8]) -> Result<(), FsError> {
    write_atomic_with(target, |file| file.write_all(contents))
}

/// Replace `target` with whatever `fill` writes, atomically.
///
/// If `fill` fails, the temp file is removed and `target` is left exactly as
/// it was. Symlinked targets are resolved so the link itself survives.
/// Existing permissions are carried over to the new file.
pub fn write_atomic_with<F>(target: &Path, fill: F) -> Result<(), FsError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let target = resolve_symlink(target)?;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FsError::Prepare {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let existing_permissions = fs::metadata(&target).ok().map(|m| m.permissions());
    let temp_path = temp_path_for(&target);

    let result = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        if let Some(permissions) = existing_permissions {
            file.set_permissions(permissions)?;
        }

        fill(&mut file)?;
        file.sync_all()
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(FsError::Write {
            path: target,
            source: e,
        });
    }

    fs::rename(&temp_path, &target).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        FsError::Replace {
            path: target.clone(),
            source: e,
        }
    })?;

    Ok(())
}

fn resolve_symlink(target: &Path) -> Result<PathBuf, FsError> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(target).map_err(|e| FsError::Prepare {
                path: target.to_path_buf(),
                source: e,
            })
        }
        _ => Ok(target.to_path_buf()),
    }
}
