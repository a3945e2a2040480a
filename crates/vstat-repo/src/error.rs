//! Error types for the repository crate.

use std::path::PathBuf;

/// Errors produced by repository access.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The underlying git library reported a failure.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error while probing the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No repository encloses the given path.
    #[error("no repository found at or above {0}")]
    NotFound(PathBuf),

    /// The repository has no working directory to track.
    #[error("repository at {0} is bare")]
    Bare(PathBuf),

    /// The repository could not be opened (used by non-git sources).
    #[error("repository unavailable at {0}")]
    Unavailable(PathBuf),

    /// A single-path query named a path the source does not know.
    #[error("unknown path: {0}")]
    UnknownPath(String),
}

/// Convenience alias for repository results.
pub type RepoResult<T> = Result<T, RepoError>;
