//! Repository layer for vstat.
//!
//! Wraps `git2` behind short-lived, scoped handles and exposes the small
//! surface the synchronization engine needs: enumerate every status entry,
//! query one path, and resolve a repository root. Also hosts the one-shot
//! mutating operations (stage, remove, commit, revert, diff).
//!
//! # Key Types
//!
//! - [`RepositoryHandle`] -- An opened repository, released at end of scope
//! - [`classify`] -- Raw status bit-set to [`vstat_types::ItemState`]
//! - [`StatusSource`] / [`RepositoryOpener`] -- The seam the engine scans through
//! - [`InMemoryRepository`] -- Fixed status table for tests and embedding
//! - [`RepoOp`] -- The one-shot operation family

pub mod classify;
pub mod discover;
pub mod error;
pub mod handle;
pub mod memory;
pub mod ops;
pub mod options;
pub mod source;

#[cfg(test)]
mod fixture;

pub use classify::classify;
pub use discover::{discover_root, find_repository_root};
pub use error::{RepoError, RepoResult};
pub use handle::RepositoryHandle;
pub use memory::InMemoryRepository;
pub use ops::{OpOutcome, RepoOp, RepoOpKind};
pub use options::ScanOptions;
pub use source::{GitOpener, RepositoryOpener, StatusSource};

pub use git2::Status;
