use std::io;

use vstat_repo::RepoError;
use vstat_types::CollectionId;

/// Errors produced by the synchronization engine.
///
/// Scans and small updates never return these for repository trouble; that
/// is logged and degraded. They surface from collection bookkeeping,
/// configuration loading, and explicit one-shot operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No collection is open under this identity.
    #[error("unknown collection: {0}")]
    UnknownCollection(CollectionId),

    /// A collection is already open under this identity.
    #[error("collection already open: {0}")]
    DuplicateCollection(CollectionId),

    /// A one-shot repository operation failed.
    #[error("repository error: {0}")]
    Repo(#[from] RepoError),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error while reading configuration or spawning a worker.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the engine crate.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
