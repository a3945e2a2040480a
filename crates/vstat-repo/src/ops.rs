//! One-shot repository operations.
//!
//! Each [`RepoOp`] variant is one synchronous call into the repository
//! through a caller-supplied [`RepositoryHandle`]. Items whose relative path
//! cannot be derived are skipped; per-path failures while staging or
//! removing are logged and do not abort the rest of the batch.

use std::fmt;
use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{DiffFormat, DiffOptions};
use tracing::{debug, info, warn};
use vstat_types::{ItemState, TrackedItem};

use crate::error::RepoResult;
use crate::handle::RepositoryHandle;

// ---------------------------------------------------------------------------
// RepoOpKind
// ---------------------------------------------------------------------------

/// The kind of a [`RepoOp`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepoOpKind {
    Stage,
    Remove,
    Commit,
    Revert,
    Diff,
}

impl RepoOpKind {
    pub const ALL: [RepoOpKind; 5] = [
        RepoOpKind::Stage,
        RepoOpKind::Remove,
        RepoOpKind::Commit,
        RepoOpKind::Revert,
        RepoOpKind::Diff,
    ];

    /// Whether this operation makes sense for an item in `state`.
    pub fn applicable_to(&self, state: ItemState) -> bool {
        use ItemState::*;
        match self {
            RepoOpKind::Stage => matches!(state, Untracked),
            RepoOpKind::Remove => matches!(state, UpToDate | Modified | Missing),
            RepoOpKind::Commit => matches!(state, Added | Removed | Modified),
            RepoOpKind::Revert => matches!(state, Added | Removed | Modified | Missing),
            RepoOpKind::Diff => matches!(state, Modified),
        }
    }

    /// Every operation applicable to `state`, in declaration order.
    pub fn applicable(state: ItemState) -> Vec<RepoOpKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| kind.applicable_to(state))
            .collect()
    }
}

impl fmt::Display for RepoOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepoOpKind::Stage => "stage",
            RepoOpKind::Remove => "remove",
            RepoOpKind::Commit => "commit",
            RepoOpKind::Revert => "revert",
            RepoOpKind::Diff => "diff",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// RepoOp
// ---------------------------------------------------------------------------

/// A mutating (or rendering) operation over a set of items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepoOp {
    /// Add the items to the index.
    Stage,
    /// Remove the items from the index; the files stay on disk.
    Remove,
    /// Stage the items and record a commit on HEAD.
    Commit { message: String },
    /// Overwrite the items in the working tree from HEAD.
    Revert,
    /// Render an index-to-worktree patch for the items.
    Diff,
}

/// What an operation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpOutcome {
    /// The operation ran over this many paths.
    Applied { paths: usize },
    /// A commit was created.
    Committed { id: String },
    /// The rendered patch (possibly empty).
    Diff(String),
    /// Nothing to do: no resolvable paths, or nothing committable.
    Skipped,
}

impl RepoOp {
    pub fn kind(&self) -> RepoOpKind {
        match self {
            RepoOp::Stage => RepoOpKind::Stage,
            RepoOp::Remove => RepoOpKind::Remove,
            RepoOp::Commit { .. } => RepoOpKind::Commit,
            RepoOp::Revert => RepoOpKind::Revert,
            RepoOp::Diff => RepoOpKind::Diff,
        }
    }

    /// Run the operation over `items`.
    pub fn execute(
        &self,
        handle: &RepositoryHandle,
        items: &[TrackedItem],
    ) -> RepoResult<OpOutcome> {
        let paths = relative_paths(handle.root(), items);
        if paths.is_empty() {
            debug!(op = %self.kind(), "no resolvable paths");
            return Ok(OpOutcome::Skipped);
        }

        match self {
            RepoOp::Stage => stage(handle, &paths),
            RepoOp::Remove => remove(handle, &paths),
            RepoOp::Commit { message } => commit(handle, &paths, items, message),
            RepoOp::Revert => revert(handle, &paths),
            RepoOp::Diff => diff(handle, &paths),
        }
    }
}

fn relative_paths(root: &Path, items: &[TrackedItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| {
            let rel = item.relative_path(root);
            if rel.is_none() {
                debug!(path = %item.path().display(), "skipping item outside repository");
            }
            rel
        })
        .collect()
}

fn stage(handle: &RepositoryHandle, paths: &[String]) -> RepoResult<OpOutcome> {
    let mut index = handle.repository().index()?;
    let mut staged = 0;
    for path in paths {
        match index.add_path(Path::new(path)) {
            Ok(()) => staged += 1,
            Err(e) => warn!(path = %path, error = %e, "failed to stage path"),
        }
    }
    index.write()?;
    Ok(OpOutcome::Applied { paths: staged })
}

fn remove(handle: &RepositoryHandle, paths: &[String]) -> RepoResult<OpOutcome> {
    let mut index = handle.repository().index()?;
    let mut removed = 0;
    for path in paths {
        match index.remove_path(Path::new(path)) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path, error = %e, "failed to remove path from index"),
        }
    }
    index.write()?;
    Ok(OpOutcome::Applied { paths: removed })
}

fn commit(
    handle: &RepositoryHandle,
    paths: &[String],
    items: &[TrackedItem],
    message: &str,
) -> RepoResult<OpOutcome> {
    stage(handle, paths)?;

    if !items.iter().any(|item| item.state().is_committable()) {
        info!("nothing committable among selected items");
        return Ok(OpOutcome::Skipped);
    }

    let repo = handle.repository();
    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let signature = repo.signature()?;
    let parent = handle.head_commit()?;
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let id = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
    info!(id = %id, files = paths.len(), "commit created");
    Ok(OpOutcome::Committed { id: id.to_string() })
}

fn revert(handle: &RepositoryHandle, paths: &[String]) -> RepoResult<OpOutcome> {
    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    for path in paths {
        checkout.path(path);
    }
    handle.repository().checkout_head(Some(&mut checkout))?;
    Ok(OpOutcome::Applied { paths: paths.len() })
}

fn diff(handle: &RepositoryHandle, paths: &[String]) -> RepoResult<OpOutcome> {
    let mut opts = DiffOptions::new();
    for path in paths {
        opts.pathspec(path);
    }
    let diff = handle
        .repository()
        .diff_index_to_workdir(None, Some(&mut opts))?;

    let mut patch = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            patch.push(line.origin());
        }
        patch.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(OpOutcome::Diff(patch))
}
