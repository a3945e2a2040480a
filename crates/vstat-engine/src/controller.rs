//! At most one full scan in flight per collection.

use tracing::debug;
use vstat_types::TrackedItem;

use crate::error::EngineResult;
use crate::job::{FullScanJob, ScanContext};

/// Owns the single active [`FullScanJob`] of one collection.
///
/// A new request always supersedes the previous one: the old worker is
/// signalled and joined before the new one is spawned, so two scans of the
/// same collection never overlap. Dropping the controller cancels and
/// joins any running worker.
#[derive(Debug)]
pub struct JobController {
    ctx: ScanContext,
    active: Option<FullScanJob>,
    generation: u64,
}

impl JobController {
    pub fn new(ctx: ScanContext) -> Self {
        Self {
            ctx,
            active: None,
            generation: 0,
        }
    }

    pub fn context(&self) -> &ScanContext {
        &self.ctx
    }

    /// Cancel and join any running scan, then start one over `snapshot`.
    ///
    /// Blocks only for as long as the previous worker takes to stop.
    /// Returns the new job's generation.
    pub fn request_full_scan(&mut self, snapshot: Vec<TrackedItem>) -> EngineResult<u64> {
        self.cancel_and_wait();
        self.generation += 1;
        let job = FullScanJob::launch(self.ctx.clone(), self.generation, snapshot)?;
        debug!(collection = %self.ctx.collection, generation = self.generation, "full scan requested");
        self.active = Some(job);
        Ok(self.generation)
    }

    /// Signal the running scan, if any, to stop. Does not block.
    pub fn cancel(&self) {
        if let Some(job) = &self.active {
            job.cancel();
        }
    }

    /// Signal the running scan, if any, and block until its worker exits.
    pub fn cancel_and_wait(&mut self) {
        if let Some(mut job) = self.active.take() {
            job.cancel();
            job.join();
            debug!(collection = %self.ctx.collection, generation = job.generation(), "full scan joined");
        }
    }

    /// Whether a worker is currently alive.
    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Generation of the most recently launched scan, 0 if none.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for JobController {
    fn drop(&mut self) {
        self.cancel_and_wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ResultDispatcher;
    use std::ops::ControlFlow;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use vstat_repo::{
        InMemoryRepository, RepoResult, RepositoryOpener, ScanOptions, Status, StatusSource,
    };
    use vstat_types::{CollectionId, ItemState};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn context(opener: Arc<dyn RepositoryOpener>, results: Sender<crate::ScanResult>) -> ScanContext {
        ScanContext {
            collection: CollectionId::new("demo"),
            root: PathBuf::from("/nonexistent-vstat-root"),
            opener,
            options: ScanOptions::default(),
            slow_scan_warn: Duration::from_secs(60),
            results,
        }
    }

    fn snapshot(count: usize) -> Vec<TrackedItem> {
        (0..count).map(|i| TrackedItem::file(format!("f{i}.txt"))).collect()
    }

    /// Reports ten entries and parks after the first until released.
    struct Gate {
        visits: AtomicUsize,
        reached: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    struct GatedOpener(Arc<Gate>);

    struct GatedSource(Arc<Gate>);

    impl RepositoryOpener for GatedOpener {
        fn open(&self, _root: &Path) -> RepoResult<Box<dyn StatusSource>> {
            Ok(Box::new(GatedSource(self.0.clone())))
        }
    }

    impl StatusSource for GatedSource {
        fn for_each_status(
            &self,
            _options: &ScanOptions,
            visit: &mut dyn FnMut(&str, Status) -> ControlFlow<()>,
        ) -> RepoResult<()> {
            for i in 0..10 {
                self.0.visits.fetch_add(1, Ordering::SeqCst);
                if visit(&format!("f{i}.txt"), Status::WT_MODIFIED).is_break() {
                    break;
                }
                if i == 0 {
                    let _ = self.0.reached.lock().unwrap().send(());
                    let _ = self.0.release.lock().unwrap().recv();
                }
            }
            Ok(())
        }

        fn status_file(&self, _path: &str) -> RepoResult<Status> {
            Ok(Status::CURRENT)
        }
    }

    /// Tracks how many opened sources are alive at once.
    #[derive(Default)]
    struct Gauge {
        alive: AtomicUsize,
        peak: AtomicUsize,
    }

    struct GaugedOpener {
        gauge: Arc<Gauge>,
        inner: InMemoryRepository,
    }

    struct GaugedSource {
        gauge: Arc<Gauge>,
        inner: Box<dyn StatusSource>,
    }

    impl RepositoryOpener for GaugedOpener {
        fn open(&self, root: &Path) -> RepoResult<Box<dyn StatusSource>> {
            let now = self.gauge.alive.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);
            Ok(Box::new(GaugedSource {
                gauge: self.gauge.clone(),
                inner: self.inner.open(root)?,
            }))
        }
    }

    impl StatusSource for GaugedSource {
        fn for_each_status(
            &self,
            options: &ScanOptions,
            visit: &mut dyn FnMut(&str, Status) -> ControlFlow<()>,
        ) -> RepoResult<()> {
            self.inner.for_each_status(options, &mut |path, status| {
                std::thread::sleep(Duration::from_millis(5));
                visit(path, status)
            })
        }

        fn status_file(&self, path: &str) -> RepoResult<Status> {
            self.inner.status_file(path)
        }
    }

    impl Drop for GaugedSource {
        fn drop(&mut self) {
            self.gauge.alive.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn abort_mid_enumeration_stops_callbacks() {
        let (reached_tx, reached_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gate = Arc::new(Gate {
            visits: AtomicUsize::new(0),
            reached: Mutex::new(reached_tx),
            release: Mutex::new(release_rx),
        });
        let dispatcher = ResultDispatcher::new();
        let mut controller = JobController::new(context(
            Arc::new(GatedOpener(gate.clone())),
            dispatcher.sender(),
        ));

        controller.request_full_scan(snapshot(10)).unwrap();
        reached_rx.recv_timeout(TIMEOUT).unwrap();
        assert!(controller.is_running());

        controller.cancel();
        release_tx.send(()).unwrap();
        controller.cancel_and_wait();
        assert!(!controller.is_running());

        // One visit before the gate, one that observes the abort.
        assert_eq!(gate.visits.load(Ordering::SeqCst), 2);

        let result = dispatcher.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(result.len(), 10);
        assert_eq!(result.entries[0].1, ItemState::Modified);
        assert!(result.entries[1..]
            .iter()
            .all(|(_, state)| *state == ItemState::UntrackedMissing));

        let dispatched = ResultDispatcher::apply(result, &mut |_: &TrackedItem| {});
        assert!(dispatched.aborted);
        assert_eq!(dispatched.applied, 0);
        assert_eq!(dispatched.items.len(), 10);
    }

    #[test]
    fn back_to_back_requests_never_overlap() {
        let inner = InMemoryRepository::new();
        for i in 0..20 {
            inner.set_status(format!("f{i}.txt"), Status::WT_NEW);
        }
        let gauge = Arc::new(Gauge::default());
        let dispatcher = ResultDispatcher::new();
        let mut controller = JobController::new(context(
            Arc::new(GaugedOpener {
                gauge: gauge.clone(),
                inner,
            }),
            dispatcher.sender(),
        ));

        assert_eq!(controller.request_full_scan(snapshot(20)).unwrap(), 1);
        assert_eq!(controller.request_full_scan(snapshot(20)).unwrap(), 2);

        let first = dispatcher.recv_timeout(TIMEOUT).unwrap();
        let second = dispatcher.recv_timeout(TIMEOUT).unwrap();
        assert_eq!((first.generation, second.generation), (1, 2));
        assert!(first.abort.is_set());
        assert!(!second.abort.is_set());

        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
        assert_eq!(gauge.alive.load(Ordering::SeqCst), 0);

        let latest = ResultDispatcher::apply(second, &mut |_: &TrackedItem| {});
        assert!(!latest.aborted);
        assert_eq!(latest.applied, 20);
        assert!(latest
            .items
            .iter()
            .all(|item| item.state() == ItemState::Untracked));

        controller.cancel_and_wait();
        assert!(!controller.is_running());
    }

    #[test]
    fn drop_joins_the_worker() {
        let repo = InMemoryRepository::new().with_entry("f0.txt", Status::INDEX_NEW);
        let dispatcher = ResultDispatcher::new();
        let mut controller = JobController::new(context(Arc::new(repo), dispatcher.sender()));
        controller.request_full_scan(snapshot(1)).unwrap();
        drop(controller);

        let result = dispatcher.try_recv().unwrap();
        assert_eq!(result.generation, 1);
    }

    #[test]
    fn cancel_without_job_is_a_no_op() {
        let dispatcher = ResultDispatcher::new();
        let mut controller =
            JobController::new(context(Arc::new(InMemoryRepository::new()), dispatcher.sender()));
        controller.cancel();
        controller.cancel_and_wait();
        assert!(!controller.is_running());
        assert_eq!(controller.generation(), 0);
    }
}
