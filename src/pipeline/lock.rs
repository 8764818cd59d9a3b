use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::foundation::error::{FacecastError, FacecastResult};

/// Lock file name inside a frames directory.
pub const LOCK_FILE_NAME: &str = ".facecast.lock";

/// Exclusive claim on a frames directory for one render and mux.
///
/// Released when dropped.
#[derive(Debug)]
pub struct FramesDirLock {
    path: PathBuf,
}

impl FramesDirLock {
    /// Claim `dir`, creating it if needed. A held claim is a [`FacecastError::Configuration`].
    pub fn acquire(dir: &Path) -> FacecastResult<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            FacecastError::configuration(format!("create frames dir '{}': {e}", dir.display()))
        })?;
        let path = dir.join(LOCK_FILE_NAME);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(FacecastError::configuration(format!(
                    "frames directory '{}' is in use by another run (remove '{}' if it is stale)",
                    dir.display(),
                    path.display()
                )));
            }
            Err(e) => {
                return Err(FacecastError::configuration(format!(
                    "create lock '{}': {e}",
                    path.display()
                )));
            }
        };
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            tracing::debug!(error = %e, "could not record pid in lock file");
        }
        tracing::debug!(path = %path.display(), "frames dir locked");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FramesDirLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not release frames dir lock");
        }
    }
}

/// Remove `<prefix>*.png` files left in `dir` by an earlier run. Returns how many were removed.
pub fn clear_stale_frames(dir: &Path, prefix: &str) -> FacecastResult<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(FacecastError::configuration(format!(
                "read frames dir '{}': {e}",
                dir.display()
            )));
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !(name.starts_with(prefix) && name.ends_with(".png")) {
            continue;
        }
        std::fs::remove_file(entry.path()).map_err(|e| {
            FacecastError::configuration(format!("remove stale frame '{name}': {e}"))
        })?;
        removed += 1;
    }
    if removed > 0 {
        tracing::info!(removed, dir = %dir.display(), "cleared stale frames");
    }
    Ok(removed)
}

/// Number of `<prefix>*.png` files in `dir`.
pub fn count_frames(dir: &Path, prefix: &str) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| {
                    e.file_name()
                        .to_str()
                        .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".png"))
                })
                .count()
        })
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/lock.rs"]
mod tests;
