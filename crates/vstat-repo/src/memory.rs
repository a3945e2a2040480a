//! In-memory status source for testing and embedding.
//!
//! [`InMemoryRepository`] reports a fixed table of `(path, Status)` entries
//! in path order. It implements both [`StatusSource`] and
//! [`RepositoryOpener`]; opening returns a handle onto the same shared
//! table, so entries can be changed between scans.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use git2::Status;

use crate::error::{RepoError, RepoResult};
use crate::options::ScanOptions;
use crate::source::{RepositoryOpener, StatusSource};

#[derive(Debug, Default)]
struct Shared {
    entries: RwLock<BTreeMap<String, Status>>,
    failing_paths: RwLock<BTreeSet<String>>,
    unavailable: RwLock<bool>,
    visits: AtomicUsize,
    opens: AtomicUsize,
}

/// A status table that behaves like a repository.
///
/// `status_file` on a path not in the table fails with
/// [`RepoError::UnknownPath`], matching how git rejects paths it cannot
/// see.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    shared: Arc<Shared>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry insertion.
    pub fn with_entry(self, path: impl Into<String>, status: Status) -> Self {
        self.set_status(path, status);
        self
    }

    /// Insert or replace the status reported for `path`.
    pub fn set_status(&self, path: impl Into<String>, status: Status) {
        if let Ok(mut entries) = self.shared.entries.write() {
            entries.insert(path.into(), status);
        }
    }

    /// Stop reporting `path` at all.
    pub fn remove(&self, path: &str) {
        if let Ok(mut entries) = self.shared.entries.write() {
            entries.remove(path);
        }
    }

    /// Make single-path queries for `path` fail.
    pub fn fail_queries_for(&self, path: impl Into<String>) {
        if let Ok(mut failing) = self.shared.failing_paths.write() {
            failing.insert(path.into());
        }
    }

    /// Make every subsequent `open` fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.shared.unavailable.write() {
            *flag = unavailable;
        }
    }

    /// Total enumeration callbacks made so far, across all opens.
    pub fn visits(&self) -> usize {
        self.shared.visits.load(Ordering::SeqCst)
    }

    /// Number of successful opens so far.
    pub fn opens(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Vec<(String, Status)> {
        self.shared
            .entries
            .read()
            .map(|entries| entries.iter().map(|(p, s)| (p.clone(), *s)).collect())
            .unwrap_or_default()
    }
}

impl StatusSource for InMemoryRepository {
    fn for_each_status(
        &self,
        options: &ScanOptions,
        visit: &mut dyn FnMut(&str, Status) -> ControlFlow<()>,
    ) -> RepoResult<()> {
        for (path, status) in self.snapshot() {
            if !reported(options, status) {
                continue;
            }
            self.shared.visits.fetch_add(1, Ordering::SeqCst);
            if visit(&path, status).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn status_file(&self, path: &str) -> RepoResult<Status> {
        let failing = self
            .shared
            .failing_paths
            .read()
            .map(|f| f.contains(path))
            .unwrap_or(false);
        if failing {
            return Err(RepoError::UnknownPath(path.to_string()));
        }
        self.shared
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(path).copied())
            .ok_or_else(|| RepoError::UnknownPath(path.to_string()))
    }
}

impl RepositoryOpener for InMemoryRepository {
    fn open(&self, root: &Path) -> RepoResult<Box<dyn StatusSource>> {
        let unavailable = self.shared.unavailable.read().map(|f| *f).unwrap_or(true);
        if unavailable {
            return Err(RepoError::Unavailable(PathBuf::from(root)));
        }
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

/// Apply the subset of [`ScanOptions`] that a flat table can honor.
fn reported(options: &ScanOptions, status: Status) -> bool {
    if status.is_ignored() {
        return options.include_ignored;
    }
    if status == Status::WT_NEW {
        return options.include_untracked;
    }
    if status.is_empty() {
        return options.include_unmodified;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(repo: &InMemoryRepository, options: &ScanOptions) -> Vec<String> {
        let mut seen = Vec::new();
        repo.for_each_status(options, &mut |path, _| {
            seen.push(path.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        seen
    }

    #[test]
    fn enumerates_in_path_order() {
        let repo = InMemoryRepository::new()
            .with_entry("b.txt", Status::CURRENT)
            .with_entry("a.txt", Status::WT_MODIFIED);
        assert_eq!(collect(&repo, &ScanOptions::default()), vec!["a.txt", "b.txt"]);
        assert_eq!(repo.visits(), 2);
    }

    #[test]
    fn options_filter_entries() {
        let repo = InMemoryRepository::new()
            .with_entry("clean.txt", Status::CURRENT)
            .with_entry("ignored.log", Status::IGNORED)
            .with_entry("new.txt", Status::WT_NEW);
        let options = ScanOptions {
            include_ignored: false,
            include_untracked: false,
            include_unmodified: false,
            recurse_untracked_dirs: false,
        };
        assert!(collect(&repo, &options).is_empty());
    }

    #[test]
    fn break_stops_enumeration() {
        let repo = InMemoryRepository::new()
            .with_entry("a", Status::CURRENT)
            .with_entry("b", Status::CURRENT);
        repo.for_each_status(&ScanOptions::default(), &mut |_, _| ControlFlow::Break(()))
            .unwrap();
        assert_eq!(repo.visits(), 1);
    }

    #[test]
    fn status_file_lookups() {
        let repo = InMemoryRepository::new().with_entry("known.txt", Status::INDEX_NEW);
        assert_eq!(repo.status_file("known.txt").unwrap(), Status::INDEX_NEW);
        assert!(matches!(
            repo.status_file("unknown.txt"),
            Err(RepoError::UnknownPath(_))
        ));

        repo.fail_queries_for("known.txt");
        assert!(repo.status_file("known.txt").is_err());
    }

    #[test]
    fn opened_sources_share_the_table() {
        let repo = InMemoryRepository::new();
        let source = repo.open(Path::new("/repo")).unwrap();
        repo.set_status("late.txt", Status::WT_DELETED);
        assert_eq!(source.status_file("late.txt").unwrap(), Status::WT_DELETED);
        assert_eq!(repo.opens(), 1);
    }

    #[test]
    fn unavailable_repository_fails_to_open() {
        let repo = InMemoryRepository::new();
        repo.set_unavailable(true);
        assert!(matches!(
            repo.open(Path::new("/repo")),
            Err(RepoError::Unavailable(_))
        ));
        assert_eq!(repo.opens(), 0);
    }
}
