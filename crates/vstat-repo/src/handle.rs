//! Scoped handle to an opened git repository.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use git2::{Commit, ErrorCode, Repository, Status};
use tracing::debug;

use crate::error::{RepoError, RepoResult};
use crate::options::ScanOptions;
use crate::source::StatusSource;

/// An opened repository rooted at its working directory.
///
/// Handles are short-lived: every operation opens its own and drops it at
/// the end of scope, which releases the underlying library resources. They
/// are never cached across calls or shared between threads.
pub struct RepositoryHandle {
    repo: Repository,
    root: PathBuf,
}

impl std::fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("root", &self.root)
            .finish()
    }
}

impl RepositoryHandle {
    /// Open the repository whose working directory is `root`.
    pub fn open(root: &Path) -> RepoResult<Self> {
        let repo = Repository::open(root)?;
        let root = repo
            .workdir()
            .map(normalize)
            .ok_or_else(|| RepoError::Bare(root.to_path_buf()))?;
        debug!(root = %root.display(), "repository opened");
        Ok(Self { repo, root })
    }

    /// The working directory, without a trailing separator.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The underlying `git2` repository.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// The short name of the checked-out branch.
    ///
    /// Returns `None` on an unborn branch (no commits yet) or a detached
    /// HEAD.
    pub fn current_branch(&self) -> RepoResult<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The commit HEAD points at, or `None` on an unborn branch.
    pub fn head_commit(&self) -> RepoResult<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl StatusSource for RepositoryHandle {
    fn for_each_status(
        &self,
        options: &ScanOptions,
        visit: &mut dyn FnMut(&str, Status) -> ControlFlow<()>,
    ) -> RepoResult<()> {
        let mut opts = options.to_status_options();
        let statuses = self.repo.statuses(Some(&mut opts))?;
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                debug!("skipping non-UTF-8 status entry");
                continue;
            };
            if visit(path, entry.status()).is_break() {
                debug!(path, "status enumeration stopped early");
                break;
            }
        }
        Ok(())
    }

    fn status_file(&self, path: &str) -> RepoResult<Status> {
        Ok(self.repo.status_file(Path::new(path))?)
    }
}

fn is_unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

/// Drop trailing separators and `.` components from a library path.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
