//! The seam between the synchronization engine and a repository.

use std::ops::ControlFlow;
use std::path::Path;

use git2::Status;

use crate::error::RepoResult;
use crate::handle::RepositoryHandle;
use crate::options::ScanOptions;

/// An opened repository that can report status.
///
/// Implementations are used from a single thread for the duration of one
/// operation and then dropped.
pub trait StatusSource {
    /// Visit every entry the repository reports under `options`, in the
    /// repository's order. Stops as soon as `visit` returns
    /// [`ControlFlow::Break`]; no further calls are made after that.
    fn for_each_status(
        &self,
        options: &ScanOptions,
        visit: &mut dyn FnMut(&str, Status) -> ControlFlow<()>,
    ) -> RepoResult<()>;

    /// Query the status of one root-relative path.
    fn status_file(&self, path: &str) -> RepoResult<Status>;
}

/// Opens a [`StatusSource`] for a repository root.
///
/// Shared across threads; every call produces an independent source that
/// is never shared.
pub trait RepositoryOpener: Send + Sync {
    fn open(&self, root: &Path) -> RepoResult<Box<dyn StatusSource>>;
}

/// Opens real git repositories through [`RepositoryHandle`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GitOpener;

impl RepositoryOpener for GitOpener {
    fn open(&self, root: &Path) -> RepoResult<Box<dyn StatusSource>> {
        Ok(Box::new(RepositoryHandle::open(root)?))
    }
}
