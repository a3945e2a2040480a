//! Delivering scan results back to the controlling context.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::debug;
use vstat_types::{CollectionId, TrackedItem};

use crate::observer::StateObserver;
use crate::reconcile::ScanResult;

/// The items of one scan, handed back after application.
///
/// Every item of the original snapshot is returned, whether or not its new
/// state was applied.
#[derive(Debug)]
pub struct Dispatched {
    pub collection: CollectionId,
    pub generation: u64,
    pub items: Vec<TrackedItem>,
    /// How many items received their new state.
    pub applied: usize,
    /// Whether application stopped early because the job was superseded.
    pub aborted: bool,
}

/// Channel from scan workers to the single controlling context.
///
/// Workers post through [`ResultDispatcher::sender`]; the owner drains on
/// its own thread and applies one result set at a time.
#[derive(Debug)]
pub struct ResultDispatcher {
    tx: Sender<ScanResult>,
    rx: Receiver<ScanResult>,
}

impl Default for ResultDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A sender for a worker to post its result through.
    pub fn sender(&self) -> Sender<ScanResult> {
        self.tx.clone()
    }

    /// The next queued result, if one is ready.
    pub fn try_recv(&self) -> Option<ScanResult> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ScanResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Apply `result` in result order, notifying `observer` per item.
    ///
    /// The job's abort flag is checked before each item; once it is set the
    /// remaining items are handed back with their previous state.
    pub fn apply(result: ScanResult, observer: &mut dyn StateObserver) -> Dispatched {
        let ScanResult {
            collection,
            generation,
            entries,
            untouched,
            abort,
            ..
        } = result;

        let mut items = Vec::with_capacity(entries.len() + untouched.len());
        let mut applied = 0;
        let mut aborted = false;

        for (mut item, state) in entries {
            if !aborted && abort.is_set() {
                debug!(collection = %collection, generation, applied, "application stopped, scan superseded");
                aborted = true;
            }
            if !aborted {
                item.set_state(state);
                observer.state_changed(&item);
                applied += 1;
            }
            items.push(item);
        }
        items.extend(untouched);

        Dispatched {
            collection,
            generation,
            items,
            applied,
            aborted,
        }
    }
}
