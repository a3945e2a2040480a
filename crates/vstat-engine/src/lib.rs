//! Asynchronous status-synchronization engine for vstat.
//!
//! Keeps the version-control state of tracked items current without
//! blocking the controlling context. A full scan moves a snapshot of items
//! onto a background worker, matches every repository-reported path against
//! it, resolves the rest by existence, and posts the items back. Small
//! updates query a few items synchronously.
//!
//! # Key Types
//!
//! - [`SyncEngine`] -- Facade over every open collection
//! - [`JobController`] -- At most one scan in flight per collection
//! - [`FullScanJob`] -- One background scan with its own abort flag
//! - [`ResultDispatcher`] -- Worker-to-owner channel and result application
//! - [`SyncStatusOp`] -- Synchronous per-item refresh
//! - [`CollectionTable`] -- Explicit table of open collections
//! - [`StateObserver`] -- Per-item "state changed" notification

pub mod abort;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod job;
pub mod observer;
pub mod reconcile;
pub mod sync_op;
pub mod table;

pub use abort::AbortFlag;
pub use config::EngineConfig;
pub use controller::JobController;
pub use dispatch::{Dispatched, ResultDispatcher};
pub use engine::SyncEngine;
pub use error::{EngineError, EngineResult};
pub use job::{FullScanJob, ScanContext};
pub use observer::StateObserver;
pub use reconcile::ScanResult;
pub use sync_op::SyncStatusOp;
pub use table::{Collection, CollectionTable};
