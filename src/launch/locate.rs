use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::foundation::error::{FacecastError, FacecastResult};

/// Resolve an external executable.
///
/// An explicit path must exist. Otherwise each candidate name is looked up in the directory of
/// the running program, then on `PATH`, and the first hit wins.
pub fn find_executable(
    what: &str,
    explicit: Option<&Path>,
    candidates: &[String],
) -> FacecastResult<PathBuf> {
    let path = std::env::var_os("PATH");
    let own_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let search = match own_dir {
        Some(dir) => {
            let dirs = std::iter::once(dir)
                .chain(path.iter().flat_map(|p| std::env::split_paths(p).collect::<Vec<_>>()));
            std::env::join_paths(dirs).ok().or(path)
        }
        None => path,
    };
    find_executable_in(what, explicit, candidates, search.as_deref())
}

/// [`find_executable`] against an explicit search path value.
pub fn find_executable_in(
    what: &str,
    explicit: Option<&Path>,
    candidates: &[String],
    search_path: Option<&OsStr>,
) -> FacecastResult<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(FacecastError::executable_not_found(format!(
            "{what} executable '{}' does not exist",
            path.display()
        )));
    }

    let dirs: Vec<PathBuf> = search_path
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();
    for name in candidates {
        for dir in &dirs {
            let candidate = dir.join(name);
            if is_executable(&candidate) {
                tracing::debug!(path = %candidate.display(), "{what} found on PATH");
                return Ok(candidate);
            }
        }
    }
    Err(FacecastError::executable_not_found(format!(
        "{what} not found on PATH (tried {})",
        candidates.join(", ")
    )))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
#[path = "../../tests/unit/launch/locate.rs"]
mod tests;
