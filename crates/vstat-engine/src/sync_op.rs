//! Synchronous status refresh for a small set of items.

use std::path::Path;

use tracing::{debug, warn};
use vstat_repo::{classify, RepositoryOpener};
use vstat_types::{ItemState, TrackedItem};

use crate::observer::StateObserver;

/// Queries each item's status individually and applies it in place.
///
/// Intended for single saves and small selections where blocking the
/// caller for one repository query per item is acceptable.
pub struct SyncStatusOp<'a> {
    opener: &'a dyn RepositoryOpener,
    root: &'a Path,
}

impl<'a> SyncStatusOp<'a> {
    pub fn new(opener: &'a dyn RepositoryOpener, root: &'a Path) -> Self {
        Self { opener, root }
    }

    /// Refresh `items` in input order, notifying `observer` after each one.
    ///
    /// Returns the number of items refreshed. Items whose relative path
    /// cannot be derived are skipped. A failed query falls back to checking
    /// whether the file exists. If the repository cannot be opened nothing
    /// is refreshed.
    pub fn execute(&self, items: &mut [TrackedItem], observer: &mut dyn StateObserver) -> usize {
        let source = match self.opener.open(self.root) {
            Ok(source) => source,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "repository unavailable, update skipped");
                return 0;
            }
        };

        let mut refreshed = 0;
        for item in items.iter_mut() {
            let Some(rel) = item.relative_path(self.root) else {
                debug!(path = %item.path().display(), "path outside repository, skipped");
                continue;
            };

            let state = match source.status_file(&rel) {
                Ok(status) => classify(status),
                Err(e) => {
                    let exists = item.resolve(self.root).exists();
                    warn!(path = %rel, error = %e, exists, "status query failed, using existence check");
                    if exists {
                        ItemState::UpToDate
                    } else {
                        ItemState::UntrackedMissing
                    }
                }
            };

            debug!(path = %rel, state = %state, "item refreshed");
            item.set_state(state);
            observer.state_changed(item);
            refreshed += 1;
        }
        refreshed
    }
}
