//! The background full-scan worker.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use vstat_repo::{RepositoryOpener, ScanOptions};
use vstat_types::{CollectionId, TrackedItem};

use crate::abort::AbortFlag;
use crate::error::EngineResult;
use crate::reconcile::{reconcile, ScanResult};

/// Everything a worker needs besides its snapshot.
#[derive(Clone)]
pub struct ScanContext {
    pub collection: CollectionId,
    pub root: PathBuf,
    pub opener: Arc<dyn RepositoryOpener>,
    pub options: ScanOptions,
    pub slow_scan_warn: Duration,
    pub results: Sender<ScanResult>,
}

impl std::fmt::Debug for ScanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("collection", &self.collection)
            .field("root", &self.root)
            .field("options", &self.options)
            .finish()
    }
}

/// One full-repository scan running on its own thread.
///
/// The snapshot is moved into the worker and comes back, with new states,
/// through the context's result channel. The worker opens its own
/// repository handle and drops it before posting.
#[derive(Debug)]
pub struct FullScanJob {
    generation: u64,
    abort: AbortFlag,
    handle: Option<JoinHandle<()>>,
}

impl FullScanJob {
    /// Spawn a worker for `snapshot` with a fresh abort flag.
    pub fn launch(ctx: ScanContext, generation: u64, snapshot: Vec<TrackedItem>) -> EngineResult<Self> {
        let abort = AbortFlag::new();
        let worker_abort = abort.clone();
        let handle = thread::Builder::new()
            .name(format!("vstat-scan-{generation}"))
            .spawn(move || run(ctx, generation, snapshot, worker_abort))?;
        Ok(Self {
            generation,
            abort,
            handle: Some(handle),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn abort_flag(&self) -> &AbortFlag {
        &self.abort
    }

    /// Signal the worker to stop. Does not block.
    pub fn cancel(&self) {
        self.abort.signal();
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Block until the worker thread has exited.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(generation = self.generation, "scan worker panicked");
            }
        }
    }
}

fn run(ctx: ScanContext, generation: u64, snapshot: Vec<TrackedItem>, abort: AbortFlag) {
    let started = Instant::now();
    info!(
        collection = %ctx.collection,
        generation,
        items = snapshot.len(),
        "full scan started"
    );

    let (entries, untouched) = match ctx.opener.open(&ctx.root) {
        Ok(source) => (
            reconcile(source.as_ref(), &ctx.root, &ctx.options, snapshot, &abort),
            Vec::new(),
        ),
        Err(e) => {
            warn!(
                collection = %ctx.collection,
                root = %ctx.root.display(),
                error = %e,
                "repository unavailable, scan skipped"
            );
            (Vec::new(), snapshot)
        }
    };

    let elapsed = started.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;
    let aborted = abort.is_set();
    if elapsed > ctx.slow_scan_warn {
        warn!(collection = %ctx.collection, generation, elapsed_ms, "slow full scan");
    }
    info!(
        collection = %ctx.collection,
        generation,
        matched = entries.len(),
        aborted,
        elapsed_ms,
        "full scan finished"
    );

    let result = ScanResult {
        collection: ctx.collection,
        generation,
        entries,
        untouched,
        abort,
        elapsed,
    };
    if ctx.results.send(result).is_err() {
        debug!(generation, "result receiver dropped, scan result discarded");
    }
}
