//! The engine facade driven by the controlling context.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use vstat_repo::{GitOpener, OpOutcome, RepoOp, RepositoryHandle, RepositoryOpener};
use vstat_types::{CollectionId, ItemKind, TrackedItem};

use crate::config::EngineConfig;
use crate::controller::JobController;
use crate::dispatch::{Dispatched, ResultDispatcher};
use crate::error::{EngineError, EngineResult};
use crate::job::ScanContext;
use crate::observer::StateObserver;
use crate::reconcile::ScanResult;
use crate::sync_op::SyncStatusOp;
use crate::table::{Collection, CollectionTable};

/// Status synchronization for any number of collections.
///
/// Not `Sync`: every method is meant to be called from one controlling
/// thread. Background work happens on scan workers owned by each
/// collection's [`JobController`]; their results queue up until the owner
/// calls [`SyncEngine::dispatch_pending`] or [`SyncEngine::wait_and_dispatch`].
pub struct SyncEngine {
    opener: Arc<dyn RepositoryOpener>,
    config: EngineConfig,
    table: CollectionTable,
    dispatcher: ResultDispatcher,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("collections", &self.table.len())
            .finish()
    }
}

impl SyncEngine {
    pub fn new(opener: Arc<dyn RepositoryOpener>, config: EngineConfig) -> Self {
        Self {
            opener,
            config,
            table: CollectionTable::new(),
            dispatcher: ResultDispatcher::new(),
        }
    }

    /// An engine over real git repositories.
    pub fn with_git(config: EngineConfig) -> Self {
        Self::new(Arc::new(GitOpener), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn collections(&self) -> &CollectionTable {
        &self.table
    }

    pub fn collection(&self, id: &CollectionId) -> Option<&Collection> {
        self.table.get(id)
    }

    /// Start tracking a collection whose items live under `root`.
    pub fn open_collection(&mut self, id: CollectionId, root: impl Into<PathBuf>) -> EngineResult<()> {
        let root = root.into();
        let ctx = ScanContext {
            collection: id.clone(),
            root: root.clone(),
            opener: self.opener.clone(),
            options: self.config.scan.clone(),
            slow_scan_warn: self.config.slow_scan_warn(),
            results: self.dispatcher.sender(),
        };
        self.table
            .create(id, Collection::new(root, JobController::new(ctx)))?;
        Ok(())
    }

    /// Stop tracking a collection. Blocks until its scan worker has exited.
    ///
    /// Results it already posted are discarded at the next dispatch.
    pub fn close_collection(&mut self, id: &CollectionId) -> EngineResult<()> {
        self.table.remove(id)?;
        Ok(())
    }

    /// Supersede any running scan of `id` with a new one over `snapshot`.
    ///
    /// The items travel to the worker and come back through dispatch.
    pub fn request_full_scan(&mut self, id: &CollectionId, snapshot: Vec<TrackedItem>) -> EngineResult<()> {
        let collection = self.lookup_mut(id)?;
        collection.controller_mut().request_full_scan(snapshot)?;
        Ok(())
    }

    /// Refresh a few items synchronously. Returns how many were refreshed.
    pub fn request_small_update(
        &mut self,
        id: &CollectionId,
        items: &mut [TrackedItem],
        observer: &mut dyn StateObserver,
    ) -> EngineResult<usize> {
        let opener = self.opener.clone();
        let collection = self.lookup_mut(id)?;
        let refreshed = SyncStatusOp::new(opener.as_ref(), collection.root()).execute(items, observer);
        note_project_state(collection, items.iter());
        Ok(refreshed)
    }

    /// Cancel the running scan of `id`, if any, and wait for it to stop.
    pub fn cancel_and_wait(&mut self, id: &CollectionId) -> EngineResult<()> {
        self.lookup_mut(id)?.controller_mut().cancel_and_wait();
        Ok(())
    }

    /// Run a one-shot repository operation, then refresh the same items.
    pub fn perform(
        &mut self,
        id: &CollectionId,
        op: &RepoOp,
        items: &mut [TrackedItem],
        observer: &mut dyn StateObserver,
    ) -> EngineResult<OpOutcome> {
        let root = self.lookup_mut(id)?.root().to_path_buf();
        let outcome = {
            let handle = RepositoryHandle::open(&root)?;
            op.execute(&handle, items)?
        };
        info!(collection = %id, op = %op.kind(), items = items.len(), "operation performed");
        self.request_small_update(id, items, observer)?;
        Ok(outcome)
    }

    /// Apply every queued scan result, one at a time, in arrival order.
    pub fn dispatch_pending(&mut self, observer: &mut dyn StateObserver) -> Vec<Dispatched> {
        let mut dispatched = Vec::new();
        while let Some(result) = self.dispatcher.try_recv() {
            if let Some(done) = self.apply(result, observer) {
                dispatched.push(done);
            }
        }
        dispatched
    }

    /// Block up to `timeout` for the next result of an open collection and
    /// apply it.
    pub fn wait_and_dispatch(
        &mut self,
        timeout: Duration,
        observer: &mut dyn StateObserver,
    ) -> Option<Dispatched> {
        // No deadline past the clock's range; such a wait blocks until a result.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let remaining = deadline.map_or(timeout, |d| d.saturating_duration_since(Instant::now()));
            let result = self.dispatcher.recv_timeout(remaining)?;
            if let Some(done) = self.apply(result, observer) {
                return Some(done);
            }
        }
    }

    fn apply(&mut self, result: ScanResult, observer: &mut dyn StateObserver) -> Option<Dispatched> {
        let Some(collection) = self.table.get_mut(&result.collection) else {
            debug!(
                collection = %result.collection,
                generation = result.generation,
                items = result.len(),
                "result for closed collection discarded"
            );
            return None;
        };
        let done = ResultDispatcher::apply(result, observer);
        note_project_state(collection, done.items.iter());
        debug!(
            collection = %done.collection,
            generation = done.generation,
            applied = done.applied,
            aborted = done.aborted,
            "scan result dispatched"
        );
        Some(done)
    }

    fn lookup_mut(&mut self, id: &CollectionId) -> EngineResult<&mut Collection> {
        self.table
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownCollection(id.clone()))
    }
}

fn note_project_state<'a>(collection: &mut Collection, items: impl Iterator<Item = &'a TrackedItem>) {
    for item in items.filter(|item| item.kind() == ItemKind::Project) {
        collection.set_project_state(item.state());
    }
}
