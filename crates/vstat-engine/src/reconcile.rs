//! Matching a full status enumeration against a tracked-item snapshot.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};
use vstat_repo::{classify, ScanOptions, StatusSource};
use vstat_types::{CollectionId, ItemState, TrackedItem};

use crate::abort::AbortFlag;

/// The outcome of one full scan, handed from the worker to the dispatcher.
#[derive(Debug)]
pub struct ScanResult {
    pub collection: CollectionId,
    /// Launch sequence number of the job within its controller.
    pub generation: u64,
    /// `(item, new state)` in match order, then existence-resolved leftovers.
    pub entries: Vec<(TrackedItem, ItemState)>,
    /// Items returned without a new state because the repository could not
    /// be opened.
    pub untouched: Vec<TrackedItem>,
    /// The job's abort flag; checked again while applying.
    pub abort: AbortFlag,
    pub elapsed: Duration,
}

impl ScanResult {
    /// Total number of items carried, assigned or not.
    pub fn len(&self) -> usize {
        self.entries.len() + self.untouched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Enumerate `source` and assign every item in `snapshot` exactly one state.
///
/// Each enumerated path claims at most one remaining item with an equal
/// relative path. Items never claimed are resolved by a filesystem
/// existence check against `root`, in snapshot order. The abort flag is
/// checked before the enumeration starts and at the top of every callback;
/// once set, the enumeration stops and only the existence pass runs.
pub(crate) fn reconcile(
    source: &dyn StatusSource,
    root: &Path,
    options: &ScanOptions,
    snapshot: Vec<TrackedItem>,
    abort: &AbortFlag,
) -> Vec<(TrackedItem, ItemState)> {
    // Slot indices per relative path; the earliest snapshot slot pops first.
    let mut index: HashMap<String, Vec<usize>> = HashMap::with_capacity(snapshot.len());
    for (slot, item) in snapshot.iter().enumerate().rev() {
        if let Some(key) = item.relative_path(root) {
            index.entry(key).or_default().push(slot);
        }
    }
    let mut slots: Vec<Option<TrackedItem>> = snapshot.into_iter().map(Some).collect();
    let mut entries = Vec::with_capacity(slots.len());

    if abort.is_set() {
        debug!("scan aborted before enumeration");
    } else {
        let enumerated = source.for_each_status(options, &mut |path, status| {
            if abort.is_set() {
                debug!(path, "scan aborted during enumeration");
                return ControlFlow::Break(());
            }
            let claimed = index
                .get_mut(path)
                .and_then(Vec::pop)
                .and_then(|slot| slots[slot].take());
            if let Some(item) = claimed {
                let state = classify(status);
                debug!(path, state = %state, "item matched");
                entries.push((item, state));
            }
            ControlFlow::Continue(())
        });
        if let Err(e) = enumerated {
            warn!(root = %root.display(), error = %e, "status enumeration failed");
        }
    }

    for item in slots.into_iter().flatten() {
        let state = if item.resolve(root).exists() {
            ItemState::Untracked
        } else {
            ItemState::UntrackedMissing
        };
        debug!(path = %item.path().display(), state = %state, "item not reported");
        entries.push((item, state));
    }

    entries
}
