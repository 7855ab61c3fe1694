//! Directory level walk
//!
//! Computes the ordered chain of directories between a base directory and a
//! working directory, and probes each level for a named file. Both the
//! config-fragment walk (job.toml) and the input-fragment walk (job.input)
//! go through this module.

use std::fs;
use std::path::{Path, PathBuf};

/// Errors for path and level computation
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Path is not absolute: {0}")]
    NotAbsolute(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Working directory {work_dir} is not under base directory {base_dir}")]
    OutsideBase {
        /// The offending working directory
        work_dir: PathBuf,
        /// The base directory it must descend from
        base_dir: PathBuf,
    },
}

/// Canonicalize a user-supplied directory path.
///
/// Resolves relative paths and symlinks to an absolute directory path so the
/// level computation can rely on structured prefix comparison. Fails with
/// `NotADirectory` when the path does not exist or is not a directory.
pub fn canonicalize_dir(path: &Path) -> Result<PathBuf, PathError> {
    let canonical =
        fs::canonicalize(path).map_err(|_| PathError::NotADirectory(path.to_path_buf()))?;
    if !canonical.is_dir() {
        return Err(PathError::NotADirectory(path.to_path_buf()));
    }
    Ok(canonical)
}

/// Compute the ordered directory levels from `base_dir` down to `work_dir`.
///
/// Returns every directory on the path, inclusive of both endpoints, ordered
/// top-down (base first). When `work_dir == base_dir` the result is a single
/// level. The suffix below the base is derived with `Path::strip_prefix`, a
/// per-segment comparison, so repeated segment names along the path do not
/// truncate the chain early.
pub fn levels(base_dir: &Path, work_dir: &Path) -> Result<Vec<PathBuf>, PathError> {
    for dir in [base_dir, work_dir] {
        if !dir.is_absolute() {
            return Err(PathError::NotAbsolute(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(PathError::NotADirectory(dir.to_path_buf()));
        }
    }

    let suffix = work_dir
        .strip_prefix(base_dir)
        .map_err(|_| PathError::OutsideBase {
            work_dir: work_dir.to_path_buf(),
            base_dir: base_dir.to_path_buf(),
        })?;

    let mut chain = Vec::with_capacity(suffix.components().count() + 1);
    let mut current = base_dir.to_path_buf();
    chain.push(current.clone());
    for component in suffix.components() {
        current.push(component);
        if !current.is_dir() {
            return Err(PathError::NotADirectory(current.clone()));
        }
        chain.push(current.clone());
    }
    Ok(chain)
}

/// Probe every level for `file_name` and return the paths that exist as
/// files, in level order (base first). An empty result is not an error.
pub fn find_files(
    base_dir: &Path,
    work_dir: &Path,
    file_name: &str,
) -> Result<Vec<PathBuf>, PathError> {
    let found = levels(base_dir, work_dir)?
        .into_iter()
        .map(|level| level.join(file_name))
        .filter(|candidate| candidate.is_file())
        .collect();
    Ok(found)
}
