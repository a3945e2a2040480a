//! Repository root resolution.

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{debug, info};

use crate::error::{RepoError, RepoResult};
use crate::handle::normalize;

/// Find the working directory of the repository enclosing `path`.
///
/// Walks upward from `path` (a file or directory) until a repository is
/// found.
pub fn discover_root(path: &Path) -> RepoResult<PathBuf> {
    let repo = Repository::discover(path).map_err(|e| {
        debug!(path = %path.display(), error = %e, "repository discovery failed");
        RepoError::NotFound(path.to_path_buf())
    })?;
    let root = repo
        .workdir()
        .map(normalize)
        .ok_or_else(|| RepoError::Bare(repo.path().to_path_buf()))?;
    debug!(path = %path.display(), root = %root.display(), "repository discovered");
    Ok(root)
}

/// Resolve the repository root for a project directory.
///
/// Tries [`discover_root`] first. When the directory is not inside a
/// repository, each immediate subdirectory is checked in name order and the
/// first one that is itself a repository wins.
pub fn find_repository_root(project_dir: &Path) -> RepoResult<PathBuf> {
    match discover_root(project_dir) {
        Ok(root) => return Ok(root),
        Err(RepoError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(project_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    for subdir in subdirs {
        if let Ok(repo) = Repository::open(&subdir) {
            if let Some(workdir) = repo.workdir() {
                let root = normalize(workdir);
                info!(root = %root.display(), "repository found in project subdirectory");
                return Ok(root);
            }
        }
    }

    Err(RepoError::NotFound(project_dir.to_path_buf()))
}
